//! Locale-prefixed page routes.
//!
//! Pages answer with a small JSON descriptor of what would be rendered.

use serde::{Deserialize, Serialize};

/// A page route, identified by its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    About,
}

impl Page {
    pub fn name(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
        }
    }

    /// Route template with the locale segment left as a placeholder.
    pub fn template(self) -> &'static str {
        match self {
            Page::Home => "/[locale]",
            Page::About => "/[locale]/about",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Page::Home => "",
            Page::About => "/about",
        }
    }
}

/// A page matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatch<'a> {
    pub page: Page,
    pub locale: &'a str,
}

impl<'a> PageMatch<'a> {
    /// Match `/<locale>`, `/<locale>/` or `/<locale>/about`.
    ///
    /// The locale segment is taken as-is; recognizing it is the locale
    /// router's job, not the page table's.
    pub fn resolve(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;
        let (locale, tail) = match rest.split_once('/') {
            Some((locale, tail)) => (locale, tail),
            None => (rest, ""),
        };
        if locale.is_empty() {
            return None;
        }
        let page = match tail {
            "" => Page::Home,
            "about" | "about/" => Page::About,
            _ => return None,
        };
        Some(Self { page, locale })
    }

    /// Public URL of the page: the default locale is served unprefixed.
    pub fn public_route(&self, default_locale: &str) -> String {
        let suffix = self.page.suffix();
        if self.locale == default_locale {
            if suffix.is_empty() {
                "/".to_string()
            } else {
                suffix.to_string()
            }
        } else {
            format!("/{}{}", self.locale, suffix)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub page: Page,
    pub locale: String,
    pub route: String,
    pub template: String,
}

impl PageView {
    pub fn new(matched: &PageMatch<'_>, default_locale: &str) -> Self {
        Self {
            page: matched.page,
            locale: matched.locale.to_string(),
            route: matched.public_route(default_locale),
            template: matched.page.template().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let home = PageMatch::resolve("/en-GB").unwrap();
        assert_eq!(home.page, Page::Home);
        assert_eq!(home.locale, "en-GB");

        assert_eq!(PageMatch::resolve("/en-US/").unwrap().page, Page::Home);
        assert_eq!(PageMatch::resolve("/en-US/about").unwrap().page, Page::About);
        assert_eq!(PageMatch::resolve("/en-US/foo"), None);
        assert_eq!(PageMatch::resolve("/en-US/[locale]"), None);
        assert_eq!(PageMatch::resolve("/"), None);
    }

    #[test]
    fn test_public_route() {
        let default = PageMatch::resolve("/en-US").unwrap();
        assert_eq!(default.public_route("en-US"), "/");

        let about = PageMatch::resolve("/en-US/about").unwrap();
        assert_eq!(about.public_route("en-US"), "/about");

        let gb = PageMatch::resolve("/en-GB/about").unwrap();
        assert_eq!(gb.public_route("en-US"), "/en-GB/about");
    }
}
