use crate::config::types::{AnalysisConfig, Config, CrawlerConfig, LoggingConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_logging_config(&config.logging)?;
    validate_analysis_config(&config.analysis)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // page_limit >= 0 is always true for usize, so no check needed

    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    for host in &config.allowed_hosts {
        validate_host(host)?;
    }

    for pattern in &config.blocked_hosts {
        validate_host_pattern(pattern)?;
    }

    Ok(())
}

/// Validates logging configuration
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    config.log_level().map(|_| ())
}

/// Validates the faceted-search marker set
fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    for class in &config.facet_classes {
        if class.is_empty() || class.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "facet class '{}' must be a single non-empty class name",
                class
            )));
        }
    }

    if config.facet_test_id_attribute.trim().is_empty() {
        return Err(ConfigError::Validation(
            "facet_test_id_attribute cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host pattern (supports a leading "*." wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    match pattern.strip_prefix("*.") {
        Some(base) => validate_host(base),
        None => validate_host(pattern),
    }
}

/// Validates a host string as it appears in a parsed URL
///
/// Hosts are compared exactly against `Url::host_str`, which is always
/// lowercase, so uppercase entries could never match.
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    // Bracketed IPv6 literal, e.g. "[::1]"
    if host.starts_with('[') && host.ends_with(']') {
        return Ok(());
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' must be lowercase",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
