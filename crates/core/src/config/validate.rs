use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - pipeline.max_concurrency is not 0
/// - pipeline.default_timeout_ms is not 0
/// - every filter has a non-empty path and a non-zero timeout
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.pipeline.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_concurrency cannot be 0".to_string(),
        ));
    }

    if config.pipeline.default_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.default_timeout_ms cannot be 0".to_string(),
        ));
    }

    if let Some(path) = &config.filter_script {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "filter_script cannot be empty".to_string(),
            ));
        }
    }

    for (index, filter) in config.filters.iter().enumerate() {
        if filter.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "filters[{}].path cannot be empty",
                index
            )));
        }
        if filter.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "filters[{}].timeout_ms cannot be 0",
                index
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::pipeline::PipelineConfig;
    use crate::protocol::ProtocolVersion;
    use std::path::PathBuf;

    fn filter(path: &str, timeout_ms: Option<u64>) -> FilterConfig {
        FilterConfig {
            name: None,
            path: PathBuf::from(path),
            args: Vec::new(),
            protocol: ProtocolVersion::Legacy3,
            timeout_ms,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            filter_script: None,
            pipeline: PipelineConfig::default(),
            filters: vec![filter("/bin/cat", Some(100))],
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let config = Config {
            pipeline: PipelineConfig::default().with_max_concurrency(0),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_filter_timeout_fails() {
        let config = Config {
            filters: vec![filter("/bin/cat", None), filter("/bin/cat", Some(0))],
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("filters[1].timeout_ms"));
    }

    #[test]
    fn test_validate_empty_path_fails() {
        let config = Config {
            filters: vec![filter("", None)],
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
