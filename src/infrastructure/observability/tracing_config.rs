const DEFAULT_FILTER: &str = "info,pdfchat=debug,tower_http=debug";

/// Subscriber settings read from the process environment, before the
/// layered application settings are loaded.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        // Production defaults to JSON lines; LOG_FORMAT wins either way.
        let json_format = match std::env::var("LOG_FORMAT") {
            Ok(format) => format.eq_ignore_ascii_case("json"),
            Err(_) => matches!(environment.to_ascii_lowercase().as_str(), "prod" | "production"),
        };

        Self {
            environment,
            json_format,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}
