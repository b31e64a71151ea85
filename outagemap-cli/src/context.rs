use std::path::PathBuf;

use outagemap::config::{OutageMapConfig, StorageEngine, load_config};
use outagemap::prelude::*;

/// Everything a command needs: the service, this device's guard and who is
/// signed in
pub struct OutageMapCliContext {
    pub service: ReportService,
    pub guard: AnonymousGuard,
    pub identity: Option<Identity>,
    pub config: OutageMapConfig,
}

impl OutageMapCliContext {
    pub async fn new(
        data_dir: Option<PathBuf>,
        memory: bool,
        identity: Option<Identity>,
    ) -> outagemap::Result<Self> {
        let mut config = load_config()?;
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir;
        }
        if memory {
            config.storage.engine = StorageEngine::Memory;
        }

        Self::from_config(config, identity).await
    }

    pub async fn from_config(
        config: OutageMapConfig,
        identity: Option<Identity>,
    ) -> outagemap::Result<Self> {
        let service = ReportService::from_config(&config).await?;

        let guard = match config.storage.engine {
            StorageEngine::Memory => AnonymousGuard::in_memory(),
            StorageEngine::RocksDb => {
                AnonymousGuard::file(config.storage.data_dir.join(&config.guard.file_name))
            }
        };

        Ok(Self {
            service,
            guard,
            identity,
            config,
        })
    }

    /// The signed-in identity, or an error telling the user to sign in
    pub fn require_identity(&self) -> outagemap::Result<&Identity> {
        self.identity.as_ref().ok_or_else(|| {
            OutageMapError::Validation(outagemap::models::ValidationError::Invalid(
                "Sign in to create reports (pass --user or set OUTAGEMAP_USER)".to_string(),
            ))
        })
    }

    /// Guard for anonymous confirmations; signed-in users are tracked by the store
    pub fn anonymous_guard(&self) -> Option<&AnonymousGuard> {
        match self.identity {
            Some(_) => None,
            None => Some(&self.guard),
        }
    }
}
