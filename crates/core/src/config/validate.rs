use super::{types::Config, ConfigError};

/// Highest mode accepted for scratch directories.
const MAX_PERMISSIONS: u32 = 0o777;

/// Rejects values that would make every job fail at run time.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.encoder.timeout_secs == 0 {
        return Err(ConfigError::invalid("encoder.timeout_secs", "cannot be 0"));
    }

    if config.encoder.threads == Some(0) {
        return Err(ConfigError::invalid(
            "encoder.threads",
            "cannot be 0, leave it unset to let ffmpeg decide",
        ));
    }

    if config.encoder.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::invalid("encoder.ffmpeg_path", "cannot be empty"));
    }

    if config.workspace.max_attempts == 0 {
        return Err(ConfigError::invalid("workspace.max_attempts", "cannot be 0"));
    }

    if config.workspace.permissions > MAX_PERMISSIONS {
        return Err(ConfigError::invalid(
            "workspace.permissions",
            format!("{:o} is not a valid mode", config.workspace.permissions),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderConfig;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let config = Config {
            encoder: EncoderConfig::default().with_timeout(0),
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "encoder.timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_zero_threads_fails() {
        let config = Config {
            encoder: EncoderConfig::default().with_threads(0),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("encoder.threads"));
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = Config::default();
        config.workspace.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_permissions_out_of_range() {
        let mut config = Config::default();
        config.workspace.permissions = 0o1777;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for workspace.permissions: 1777 is not a valid mode"
        );
    }
}
