use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upload limit, timeouts and queue capacity are non-zero
/// - Backend program is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    if config.backend.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.program cannot be empty".to_string(),
        ));
    }

    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.lane.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "lane.queue_capacity cannot be 0".to_string(),
        ));
    }

    if config.bridge.enabled && config.bridge.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "bridge.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_program_fails() {
        let mut config = Config::default();
        config.backend.program = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_queue_capacity_fails() {
        let mut config = Config::default();
        config.lane.queue_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bridge_timeout_ignored_when_disabled() {
        let mut config = Config::default();
        config.bridge.enabled = false;
        config.bridge.timeout_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}
