use crate::config::types::{ChecksConfig, Config, HttpConfig, LinkPolicyConfig};
use crate::url::normalize_page;
use crate::{ConfigError, UrlError};
use reqwest::header::HeaderValue;

/// Validates the entire configuration
///
/// Runs once before any network activity; a failure here aborts the run.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pages(&config.pages)?;
    validate_checks_config(&config.checks)?;
    validate_link_policy(&config.links)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the page list
fn validate_pages(pages: &[String]) -> Result<(), ConfigError> {
    for page in pages {
        if page.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page entries cannot be empty".to_string(),
            ));
        }

        normalize_page(page).map_err(|e| match e {
            UrlError::InvalidScheme(scheme) => ConfigError::Validation(format!(
                "page '{}' uses unsupported scheme '{}'",
                page, scheme
            )),
            other => ConfigError::InvalidUrl(format!("Invalid page '{}': {}", page, other)),
        })?;
    }

    Ok(())
}

fn validate_checks_config(config: &ChecksConfig) -> Result<(), ConfigError> {
    if config.max_response_time == Some(0) {
        return Err(ConfigError::Validation(
            "max-response-time must be a positive number of milliseconds".to_string(),
        ));
    }

    Ok(())
}

fn validate_link_policy(config: &LinkPolicyConfig) -> Result<(), ConfigError> {
    if config.ignore.iter().any(|link| link.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "links to ignore cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1 second".to_string(),
        ));
    }

    if !config.user_agent.is_empty() && HeaderValue::from_str(&config.user_agent).is_err() {
        return Err(ConfigError::Validation(format!(
            "user-agent is not a valid header value: {:?}",
            config.user_agent
        )));
    }

    Ok(())
}
