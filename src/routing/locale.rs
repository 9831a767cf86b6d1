//! Locale set and path locale detection.

use thiserror::Error;

use crate::config::LocaleConfig;

/// Invalid locale set configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("locale set is empty")]
    Empty,

    #[error("invalid locale tag '{0}'")]
    InvalidTag(String),

    #[error("duplicate locale tag '{0}'")]
    Duplicate(String),

    #[error("default locale '{0}' is not in the locale set")]
    UnknownDefault(String),

    #[error("invalid counter header name '{0}'")]
    InvalidHeader(String),
}

/// Tags become a path segment, so they are restricted to URI-safe characters.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Ordered set of recognized locale tags with one default.
///
/// Immutable after construction; shared read-only across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    tags: Vec<String>,
    default_index: usize,
}

impl LocaleSet {
    /// Build a locale set. `default` must be one of `tags`.
    pub fn new<I, T>(tags: I, default: &str) -> Result<Self, LocaleError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            return Err(LocaleError::Empty);
        }
        for (i, tag) in tags.iter().enumerate() {
            if !is_valid_tag(tag) {
                return Err(LocaleError::InvalidTag(tag.clone()));
            }
            if tags[..i].contains(tag) {
                return Err(LocaleError::Duplicate(tag.clone()));
            }
        }
        let default_index = tags
            .iter()
            .position(|t| t == default)
            .ok_or_else(|| LocaleError::UnknownDefault(default.to_string()))?;

        Ok(Self {
            tags,
            default_index,
        })
    }

    pub fn from_config(config: &LocaleConfig) -> Result<Self, LocaleError> {
        Self::new(config.tags.iter().cloned(), &config.default_locale)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn default_locale(&self) -> &str {
        &self.tags[self.default_index]
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns the locale whose segment prefixes `path`, if any.
    ///
    /// A path carries a locale when it equals `/<tag>` or starts with
    /// `/<tag>/`. Tags are tried in configured order.
    pub fn detect(&self, path: &str) -> Option<&str> {
        let rest = path.strip_prefix('/')?;
        self.tags
            .iter()
            .find(|tag| match rest.strip_prefix(tag.as_str()) {
                Some(after) => after.is_empty() || after.starts_with('/'),
                None => false,
            })
            .map(String::as_str)
    }

    pub fn locale_or_default(&self, path: &str) -> &str {
        self.detect(path).unwrap_or_else(|| self.default_locale())
    }
}
