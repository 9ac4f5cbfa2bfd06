use crate::config::types::{Config, CrawlerConfig, FetcherConfig, OutputConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl engine configuration
///
/// `max_tries` and `max_depth` accept any value, including zero.
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            config.workers
        )));
    }

    if config.filter_capacity() < 1 {
        return Err(ConfigError::Validation(
            "filter_capacity must be >= 1".to_string(),
        ));
    }

    let rate = config.false_positive_rate;
    if !(rate > 0.0 && rate < 1.0) {
        return Err(ConfigError::Validation(format!(
            "false_positive_rate must be strictly between 0 and 1, got {}",
            rate
        )));
    }

    Ok(())
}

/// Validates HTTP fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty (use \"-\" for stdout)".to_string(),
        ));
    }

    if config.progress_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "progress_interval_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
