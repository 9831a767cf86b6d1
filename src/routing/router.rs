//! Locale rewrite policy.
//!
//! # Responsibilities
//! - Pass through paths that already carry a recognized locale segment
//! - Rewrite everything else under the default locale
//! - Carry the rewrite count on the request and refuse to rewrite past the maximum
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The count travels in a request header, never in shared state
//! - Explicit LimitExceeded rather than another rewrite

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Uri};
use thiserror::Error;

use crate::config::LocaleConfig;
use crate::observability::metrics;
use crate::routing::locale::{LocaleError, LocaleSet};

/// Number of rewrites a logical request has already gone through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RewriteCount(pub u32);

/// Outcome of routing a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Path already carries a locale; forward unchanged.
    PassThrough,
    /// Path must be served under the default locale.
    Rewrite { path: String, count: RewriteCount },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The request has already been rewritten `max` times.
    #[error("rewrite limit exceeded for '{path}': {count} rewrites (max {max})")]
    LimitExceeded { path: String, count: u32, max: u32 },

    /// The rewritten path could not form a valid URI.
    #[error("rewritten path '{0}' is not a valid URI")]
    InvalidPath(String),
}

/// Rewrites unprefixed paths to the default locale, bounded by a loop guard.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
    locales: LocaleSet,
    max_rewrites: u32,
    counter_header: HeaderName,
}

impl LocaleRouter {
    pub fn new(locales: LocaleSet, max_rewrites: u32, counter_header: HeaderName) -> Self {
        Self {
            locales,
            max_rewrites,
            counter_header,
        }
    }

    pub fn from_config(config: &LocaleConfig) -> Result<Self, LocaleError> {
        let locales = LocaleSet::from_config(config)?;
        let header = HeaderName::try_from(config.counter_header.as_str())
            .map_err(|_| LocaleError::InvalidHeader(config.counter_header.clone()))?;
        Ok(Self::new(locales, config.max_rewrites, header))
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn max_rewrites(&self) -> u32 {
        self.max_rewrites
    }

    pub fn counter_header(&self) -> &HeaderName {
        &self.counter_header
    }

    /// Decide what to do with `path` given how often it was already rewritten.
    ///
    /// Pure: no logging, no metrics.
    pub fn decide(&self, path: &str, count: RewriteCount) -> Result<RouteDecision, RewriteError> {
        if self.locales.detect(path).is_some() {
            return Ok(RouteDecision::PassThrough);
        }

        if count.0 >= self.max_rewrites {
            return Err(RewriteError::LimitExceeded {
                path: path.to_string(),
                count: count.0,
                max: self.max_rewrites,
            });
        }

        Ok(RouteDecision::Rewrite {
            path: format!("/{}{}", self.locales.default_locale(), path),
            count: RewriteCount(count.0 + 1),
        })
    }

    /// Read the rewrite count carried on a request.
    ///
    /// Absent or malformed values read as zero. Digit strings too large for a
    /// `u32` saturate so they still trip the guard.
    pub fn read_count(&self, headers: &HeaderMap) -> RewriteCount {
        let Some(value) = headers.get(&self.counter_header) else {
            return RewriteCount::default();
        };

        let raw = value.to_str().unwrap_or_default().trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            tracing::warn!(
                header = %self.counter_header,
                value = ?value,
                "Malformed rewrite count, treating as 0"
            );
            return RewriteCount::default();
        }

        RewriteCount(raw.parse().unwrap_or(u32::MAX))
    }

    /// Apply the routing decision to a request.
    ///
    /// On rewrite the returned request has the new path (query preserved) and
    /// the incremented count in the counter header.
    pub fn apply(&self, mut req: Request<Body>) -> Result<Request<Body>, RewriteError> {
        let count = self.read_count(req.headers());
        let path = req.uri().path().to_string();

        let decision = match self.decide(&path, count) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(
                    method = %req.method(),
                    path = %path,
                    count = count.0,
                    max = self.max_rewrites,
                    "Rewrite limit exceeded"
                );
                metrics::record_rewrite_limit_exceeded();
                return Err(e);
            }
        };

        let (new_path, next) = match decision {
            RouteDecision::PassThrough => return Ok(req),
            RouteDecision::Rewrite { path, count } => (path, count),
        };

        let path_and_query = match req.uri().query() {
            Some(query) => format!("{}?{}", new_path, query),
            None => new_path.clone(),
        };
        let mut parts = req.uri().clone().into_parts();
        parts.path_and_query = Some(
            PathAndQuery::try_from(path_and_query)
                .map_err(|_| RewriteError::InvalidPath(new_path.clone()))?,
        );
        *req.uri_mut() =
            Uri::from_parts(parts).map_err(|_| RewriteError::InvalidPath(new_path.clone()))?;
        req.headers_mut()
            .insert(self.counter_header.clone(), HeaderValue::from(next.0));

        tracing::info!(
            rewrite = next.0,
            method = %req.method(),
            from = %path,
            to = %new_path,
            "Middleware rewrite"
        );
        metrics::record_rewrite();

        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "x-middleware-rewrite-count";

    fn router(max: u32) -> LocaleRouter {
        LocaleRouter::new(
            LocaleSet::new(["en-US", "en-GB"], "en-US").unwrap(),
            max,
            HeaderName::from_static(HEADER),
        )
    }

    fn request(uri: &str, count: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(count) = count {
            builder = builder.header(HEADER, count);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn count_of(req: &Request<Body>) -> Option<&str> {
        req.headers().get(HEADER).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_unprefixed_path_is_rewritten() {
        let decision = router(10).decide("/foo", RewriteCount(0)).unwrap();
        assert_eq!(
            decision,
            RouteDecision::Rewrite {
                path: "/en-US/foo".into(),
                count: RewriteCount(1),
            }
        );
    }

    #[test]
    fn test_prefixed_path_passes_through() {
        let r = router(10);
        assert_eq!(
            r.decide("/en-GB/about", RewriteCount(0)),
            Ok(RouteDecision::PassThrough)
        );
        assert_eq!(r.decide("/en-US", RewriteCount(3)), Ok(RouteDecision::PassThrough));
    }

    #[test]
    fn test_pass_through_ignores_limit() {
        // A locale-prefixed path never consults the guard.
        assert_eq!(
            router(10).decide("/en-GB/about", RewriteCount(10)),
            Ok(RouteDecision::PassThrough)
        );
    }

    #[test]
    fn test_template_path_rewrites_below_limit() {
        let decision = router(10).decide("/[locale]", RewriteCount(9)).unwrap();
        assert_eq!(
            decision,
            RouteDecision::Rewrite {
                path: "/en-US/[locale]".into(),
                count: RewriteCount(10),
            }
        );
    }

    #[test]
    fn test_template_path_fails_at_limit() {
        let err = router(10).decide("/[locale]", RewriteCount(10)).unwrap_err();
        assert_eq!(
            err,
            RewriteError::LimitExceeded {
                path: "/[locale]".into(),
                count: 10,
                max: 10,
            }
        );
    }

    #[test]
    fn test_counter_strictly_increases_below_limit() {
        let r = router(5);
        for n in 0..5 {
            match r.decide("/x", RewriteCount(n)).unwrap() {
                RouteDecision::Rewrite { count, .. } => assert_eq!(count, RewriteCount(n + 1)),
                other => panic!("expected rewrite, got {:?}", other),
            }
        }
        assert!(r.decide("/x", RewriteCount(5)).is_err());
    }

    #[test]
    fn test_root_path_rewrite() {
        assert_eq!(
            router(10).decide("/", RewriteCount(0)),
            Ok(RouteDecision::Rewrite {
                path: "/en-US/".into(),
                count: RewriteCount(1),
            })
        );
    }

    #[test]
    fn test_read_count() {
        let r = router(10);
        assert_eq!(r.read_count(request("/", None).headers()), RewriteCount(0));
        assert_eq!(r.read_count(request("/", Some("7")).headers()), RewriteCount(7));
        assert_eq!(r.read_count(request("/", Some(" 4 ")).headers()), RewriteCount(4));
        assert_eq!(r.read_count(request("/", Some("-1")).headers()), RewriteCount(0));
        assert_eq!(r.read_count(request("/", Some("abc")).headers()), RewriteCount(0));
        assert_eq!(
            r.read_count(request("/", Some("99999999999999")).headers()),
            RewriteCount(u32::MAX)
        );
    }

    #[test]
    fn test_apply_rewrites_request() {
        let req = router(10).apply(request("/foo?x=1", None)).unwrap();
        assert_eq!(req.uri().path(), "/en-US/foo");
        assert_eq!(req.uri().query(), Some("x=1"));
        assert_eq!(count_of(&req), Some("1"));
        assert_eq!(req.method(), "POST");
    }

    #[test]
    fn test_apply_keeps_absolute_uri_authority() {
        let req = router(10)
            .apply(request("http://localhost:3000/foo", Some("2")))
            .unwrap();
        assert_eq!(req.uri().to_string(), "http://localhost:3000/en-US/foo");
        assert_eq!(count_of(&req), Some("3"));
    }

    #[test]
    fn test_apply_pass_through_is_idempotent() {
        let r = router(10);
        let once = r.apply(request("/en-GB/about", Some("2"))).unwrap();
        let twice = r.apply(request("/en-GB/about", Some("2"))).unwrap();
        let twice = r.apply(twice).unwrap();
        assert_eq!(once.uri(), twice.uri());
        assert_eq!(count_of(&once), Some("2"));
        assert_eq!(count_of(&twice), Some("2"));
    }

    #[test]
    fn test_apply_at_limit_fails() {
        let err = router(10)
            .apply(request("/[locale]", Some("10")))
            .unwrap_err();
        assert!(matches!(err, RewriteError::LimitExceeded { count: 10, max: 10, .. }));
    }

    #[test]
    fn test_repeated_template_rewrites_terminate() {
        // Simulates a dispatcher that keeps falling back to the template path.
        let r = router(10);
        let mut req = request("/foo", None);
        let mut rewrites = 0;
        loop {
            match r.apply(req) {
                Ok(rewritten) => {
                    rewrites += 1;
                    let count = count_of(&rewritten).unwrap().to_string();
                    req = request("/[locale]", Some(&count));
                }
                Err(RewriteError::LimitExceeded { count, .. }) => {
                    assert_eq!(count, 10);
                    break;
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(rewrites, 10);
    }

    #[test]
    fn test_from_config() {
        let r = LocaleRouter::from_config(&LocaleConfig::default()).unwrap();
        assert_eq!(r.max_rewrites(), 10);
        assert_eq!(r.locales().default_locale(), "en-US");
        assert_eq!(r.counter_header().as_str(), HEADER);

        let mut bad = LocaleConfig::default();
        bad.counter_header = "not a header".into();
        assert!(matches!(
            LocaleRouter::from_config(&bad),
            Err(LocaleError::InvalidHeader(_))
        ));
    }
}
