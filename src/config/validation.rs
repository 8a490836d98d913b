use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Upper bound on the concurrency gate width
const MAX_CONCURRENCY: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_concurrency(config.concurrency)?;
    validate_topics_file(config)?;
    validate_endpoint("wiki_api_url", &config.wiki_api_url)?;
    validate_endpoint("telegram_api_url", &config.telegram_api_url)?;
    Ok(())
}

fn validate_concurrency(concurrency: usize) -> Result<(), ConfigError> {
    if concurrency < 1 || concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, concurrency
        )));
    }
    Ok(())
}

fn validate_topics_file(config: &Config) -> Result<(), ConfigError> {
    if config.topics_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "topics_file cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates that an endpoint is an absolute http(s) URL
fn validate_endpoint(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}
