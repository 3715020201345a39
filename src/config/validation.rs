use crate::config::types::{CacheConfig, Config, CrawlerConfig, RetryConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on `max-nodes`
const MAX_NODES_LIMIT: usize = 10_000;

/// Upper bound on `request-timeout-secs`
const MAX_TIMEOUT_SECS: u64 = 300;

/// Upper bound on `ttl-minutes` (one year)
const MAX_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retries)?;
    validate_cache_config(&config.cache)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates frontier traversal bounds
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_nodes < 1 || config.max_nodes > MAX_NODES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_nodes must be between 1 and {}, got {}",
            MAX_NODES_LIMIT, config.max_nodes
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates per-tier retry budgets
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.standard < 1 {
        return Err(ConfigError::Validation(format!(
            "standard retries must be >= 1, got {}",
            config.standard
        )));
    }

    // Paying customers never get a smaller budget than standard ones
    if config.priority < config.standard {
        return Err(ConfigError::Validation(format!(
            "priority retries ({}) must be >= standard retries ({})",
            config.priority, config.standard
        )));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "cache directory cannot be empty".to_string(),
        ));
    }

    if config.ttl_minutes < 1 || config.ttl_minutes > MAX_TTL_MINUTES {
        return Err(ConfigError::Validation(format!(
            "ttl_minutes must be between 1 and {}, got {}",
            MAX_TTL_MINUTES, config.ttl_minutes
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain a single @ with text on both sides
    let (local, domain) = match email.split_once('@') {
        Some(parts) if !parts.1.contains('@') => parts,
        _ => {
            return Err(ConfigError::Validation(format!(
                "Invalid email format: '{}'",
                email
            )))
        }
    };

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_max_nodes_bounds() {
        let mut config = Config::default();
        config.crawler.max_nodes = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.max_nodes = MAX_NODES_LIMIT + 1;
        assert!(validate(&config).is_err());

        config.crawler.max_nodes = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_retry_budgets() {
        let mut config = Config::default();
        config.retries.standard = 0;
        assert!(validate(&config).is_err());

        config.retries.standard = 4;
        config.retries.priority = 3;
        assert!(validate(&config).is_err());

        config.retries.priority = 4;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_cache_config() {
        let mut config = Config::default();
        config.cache.ttl_minutes = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.cache.directory = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        let mut config = Config::default();
        config.cache.ttl_minutes = MAX_TTL_MINUTES;
        assert!(validate(&config).is_ok());

        config.cache.ttl_minutes = MAX_TTL_MINUTES + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }
}
