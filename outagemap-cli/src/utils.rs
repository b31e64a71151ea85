use crate::context::OutageMapCliContext;
use outagemap::OutageMapError;
use outagemap::models::{Identity, ServiceType, ValidationError};

fn invalid(msg: String) -> OutageMapError {
    OutageMapError::Validation(ValidationError::Invalid(msg))
}

pub fn parse_service_type(type_str: &str) -> outagemap::Result<ServiceType> {
    type_str.parse().map_err(|_| {
        invalid(format!(
            "Invalid service type: {} (expected electricity, water, internet or other)",
            type_str
        ))
    })
}

/// Identity from `--user`/`--name`, falling back to `OUTAGEMAP_USER`/`OUTAGEMAP_USER_NAME`
pub fn identity_from(user: Option<String>, name: Option<String>) -> Option<Identity> {
    let id = user
        .or_else(|| std::env::var("OUTAGEMAP_USER").ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())?;
    let name = name.or_else(|| std::env::var("OUTAGEMAP_USER_NAME").ok());

    let identity = Identity::new(id);
    Some(match name {
        Some(name) if !name.trim().is_empty() => identity.with_display_name(name.trim()),
        _ => identity,
    })
}

/// Resolve a full report id from an id or a unique prefix
pub async fn resolve_report_id(ctx: &OutageMapCliContext, id: &str) -> outagemap::Result<String> {
    if ctx.service.store().get_report(id).await?.is_some() {
        return Ok(id.to_string());
    }

    if id.len() >= 36 {
        return Err(invalid(format!("Report '{}' not found", id)));
    }

    let all_reports = ctx.service.list_reports().await?;
    let matches: Vec<_> = all_reports.iter().filter(|r| r.id.starts_with(id)).collect();

    match matches.len() {
        0 => Err(invalid(format!("No report found with ID prefix '{}'", id))),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let suggestions: Vec<String> = matches
                .iter()
                .take(5)
                .map(|r| format!("  - {} ({})", r.id, r.display_title()))
                .collect();
            Err(invalid(format!(
                "Ambiguous ID prefix '{}': {} matches found.\nSuggestions:\n{}",
                id,
                matches.len(),
                suggestions.join("\n")
            )))
        }
    }
}
