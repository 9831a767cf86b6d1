//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the locale router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Locale set and rewrite guard settings.
    pub locales: LocaleConfig,

    /// Server action dispatch settings.
    pub actions: ActionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Locale configuration. Fixed at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Recognized locale tags, in match order.
    pub tags: Vec<String>,

    /// Locale prepended to unprefixed paths. Must be one of `tags`.
    pub default_locale: String,

    /// Maximum rewrites a single logical request may go through.
    pub max_rewrites: u32,

    /// Header carrying the current rewrite count.
    pub counter_header: String,

    /// Path prefixes the locale rewrite never touches.
    pub excluded_prefixes: Vec<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            tags: vec!["en-US".to_string(), "en-GB".to_string()],
            default_locale: "en-US".to_string(),
            max_rewrites: 10,
            counter_header: "x-middleware-rewrite-count".to_string(),
            excluded_prefixes: vec![
                "/api".to_string(),
                "/_next".to_string(),
                "/favicon.ico".to_string(),
                "/sitemap.xml".to_string(),
                "/robots.txt".to_string(),
            ],
        }
    }
}

/// Server action configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Header carrying the server action id.
    pub header: String,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            header: "next-action".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.locales.default_locale, "en-US");
        assert_eq!(config.locales.max_rewrites, 10);
        assert_eq!(config.actions.header, "next-action");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [locales]
            max_rewrites = 3

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.locales.max_rewrites, 3);
        assert_eq!(config.locales.tags, vec!["en-US", "en-GB"]);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
