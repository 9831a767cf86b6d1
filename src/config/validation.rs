//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the default locale belongs to the locale set
//! - Validate value ranges and header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::locale::is_valid_tag;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("locales.tags must not be empty")]
    NoLocales,

    #[error("locale tag '{0}' must be non-empty and use only letters, digits, '-' or '_'")]
    InvalidTag(String),

    #[error("locale tag '{0}' is listed more than once")]
    DuplicateTag(String),

    #[error("default locale '{0}' is not one of locales.tags")]
    UnknownDefault(String),

    #[error("{field} '{value}' is not a valid header name")]
    HeaderName { field: &'static str, value: String },

    #[error("excluded prefix '{0}' must start with '/'")]
    ExcludedPrefix(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let locales = &config.locales;
    if locales.tags.is_empty() {
        errors.push(ValidationError::NoLocales);
    }
    let mut seen = HashSet::new();
    for tag in &locales.tags {
        if !is_valid_tag(tag) {
            errors.push(ValidationError::InvalidTag(tag.clone()));
        }
        if !seen.insert(tag.as_str()) {
            errors.push(ValidationError::DuplicateTag(tag.clone()));
        }
    }
    if !locales.tags.is_empty() && !locales.tags.contains(&locales.default_locale) {
        errors.push(ValidationError::UnknownDefault(locales.default_locale.clone()));
    }

    if HeaderName::try_from(locales.counter_header.as_str()).is_err() {
        errors.push(ValidationError::HeaderName {
            field: "locales.counter_header",
            value: locales.counter_header.clone(),
        });
    }
    if HeaderName::try_from(config.actions.header.as_str()).is_err() {
        errors.push(ValidationError::HeaderName {
            field: "actions.header",
            value: config.actions.header.clone(),
        });
    }

    for prefix in &locales.excluded_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::ExcludedPrefix(prefix.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
