//! # Settings
//!
//! Settings loaded from environment variables.

/// Process-level settings
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Values that end up in generated shell text (CLI names, service user, bucket) are
/// part of the boot contract, so change them together with the host images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    /// Used when `RUST_LOG` is not set
    pub log_level: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
    /// Register Prometheus metrics on startup
    pub enable_metrics: bool,
    /// AWS CLI executable invoked on the host
    pub aws_cli: String,
    /// Interpreter used by the inline JSON field helper
    pub json_interpreter: String,
    /// User the render manager command runs as when storing credentials
    pub deadline_service_user: String,
    /// Bucket that script assets are staged in
    pub asset_bucket: String,
    /// Directory on the host that script assets are downloaded to
    pub script_staging_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            log_enable_color: false,
            enable_metrics: true,
            aws_cli: "aws".to_string(),
            json_interpreter: "python3".to_string(),
            deadline_service_user: "ec2-user".to_string(),
            asset_bucket: "render-db-connection-assets".to_string(),
            script_staging_dir: "/tmp".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env_var_or_default_str("LOG_LEVEL", &defaults.log_level),
            log_enable_color: env_var_or_default_bool(
                "LOG_ENABLE_COLOR",
                defaults.log_enable_color,
            ),
            enable_metrics: env_var_or_default_bool("ENABLE_METRICS", defaults.enable_metrics),
            aws_cli: env_var_or_default_str("AWS_CLI", &defaults.aws_cli),
            json_interpreter: env_var_or_default_str(
                "JSON_INTERPRETER",
                &defaults.json_interpreter,
            ),
            deadline_service_user: env_var_or_default_str(
                "DEADLINE_SERVICE_USER",
                &defaults.deadline_service_user,
            ),
            asset_bucket: env_var_or_default_str("ASSET_BUCKET", &defaults.asset_bucket),
            script_staging_dir: env_var_or_default_str(
                "SCRIPT_STAGING_DIR",
                &defaults.script_staging_dir,
            ),
        }
    }

    /// `tracing` filter directive derived from `log_level`
    #[must_use]
    pub fn log_filter(&self) -> String {
        let level = match self.log_level.trim().to_uppercase().as_str() {
            "ERROR" => "error",
            "WARN" | "WARNING" => "warn",
            "DEBUG" => "debug",
            "TRACE" => "trace",
            _ => "info",
        };
        format!("render_db_connection={level}")
    }
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.aws_cli, "aws");
        assert_eq!(settings.json_interpreter, "python3");
        assert_eq!(settings.deadline_service_user, "ec2-user");
        assert!(settings.enable_metrics);
    }

    #[test]
    fn test_parse_bool_variants() {
        for truthy in ["true", "TRUE", "1", "yes", "On"] {
            assert!(parse_bool(truthy), "{truthy} should parse as true");
        }
        for falsy in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(falsy), "{falsy} should parse as false");
        }
    }

    #[test]
    fn test_log_filter_levels() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_filter(), "render_db_connection=info");

        settings.log_level = "debug".to_string();
        assert_eq!(settings.log_filter(), "render_db_connection=debug");

        settings.log_level = "Warning".to_string();
        assert_eq!(settings.log_filter(), "render_db_connection=warn");

        settings.log_level = "verbose".to_string();
        assert_eq!(settings.log_filter(), "render_db_connection=info");
    }
}
