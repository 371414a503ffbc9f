use super::{types::Config, ConfigError};

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Retry and pagination bounds are at least 1
/// - Site and file-host URLs are http(s)
/// - File host domain marker is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.fetcher.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.walker.max_pages == 0 {
        return Err(ConfigError::ValidationError(
            "walker.max_pages must be at least 1".to_string(),
        ));
    }

    if !is_http_url(&config.site.base_url) {
        return Err(ConfigError::ValidationError(format!(
            "site.base_url must be an http(s) URL, got '{}'",
            config.site.base_url
        )));
    }

    if !is_http_url(&config.file_host.api_url) {
        return Err(ConfigError::ValidationError(format!(
            "file_host.api_url must be an http(s) URL, got '{}'",
            config.file_host.api_url
        )));
    }

    if config.file_host.domain_marker.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "file_host.domain_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}
