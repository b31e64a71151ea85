#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigLoader, FeedConfig, GeocoderKind, LogLevel, OutageMapConfig,
        StorageEngine, validation,
    };
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = OutageMapConfig::default();
        assert_eq!(config.storage.engine, StorageEngine::RocksDb);
        assert_eq!(config.storage.namespace, "outagemap");
        assert_eq!(config.feeds.status_window_hours, 24);
        assert_eq!(config.feeds.nearby_window_hours, 48);
        assert_eq!(config.feeds.nearby_radius_m, 5_000.0);
        assert_eq!(config.feeds.nearby_limit, 3);
        assert_eq!(
            config.geocoding.providers,
            vec![GeocoderKind::BigDataCloud, GeocoderKind::Nominatim]
        );
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(validation::validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_builder_development() {
        let config = ConfigBuilder::development()
            .with_data_dir("/tmp/test_data")
            .build()
            .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/test_data"));
        assert_eq!(config.storage.engine, StorageEngine::Memory);
        assert!(!config.geocoding.enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_validation_rejects_bad_feeds() {
        let result = ConfigBuilder::new()
            .with_feeds(FeedConfig {
                nearby_limit: 0,
                ..FeedConfig::default()
            })
            .build();
        assert!(result.is_err());

        let result = ConfigBuilder::new()
            .with_feeds(FeedConfig {
                status_window_hours: 0,
                ..FeedConfig::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_empty_namespace() {
        let result = ConfigBuilder::new().with_database("", "reports").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let result = ConfigBuilder::new().with_geocoding_timeout_ms(0).build();
        assert!(result.is_err());

        // A disabled geocoder does not care about its timeout
        let result = ConfigBuilder::new()
            .with_geocoding_timeout_ms(0)
            .without_geocoding()
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outagemap.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[storage]
engine = "memory"
namespace = "test_ns"

[feeds]
nearby_limit = 5

[geocoding]
enabled = false
"#
        )
        .unwrap();

        let config = ConfigLoader::new().load_file(&path).unwrap().extract().unwrap();
        assert_eq!(config.storage.engine, StorageEngine::Memory);
        assert_eq!(config.storage.namespace, "test_ns");
        assert_eq!(config.storage.database, "reports");
        assert_eq!(config.feeds.nearby_limit, 5);
        assert!(!config.geocoding.enabled);
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let mut loader = ConfigLoader::new();
        assert!(loader.load_file("/definitely/not/here.toml").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(loader.load_file(&path).is_err());
    }
}
