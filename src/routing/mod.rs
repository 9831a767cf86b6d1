//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, method, rewrite-count header)
//!     → matcher.rs (excluded prefixes bypass routing)
//!     → locale.rs (detect locale segment)
//!     → router.rs (pass through, rewrite, or refuse at the limit)
//!
//! Construction (at startup):
//!     LocaleConfig
//!     → validate tags and default
//!     → freeze as immutable LocaleRouter
//! ```
//!
//! # Design Decisions
//! - Locale set compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same (path, count) always yields the same decision
//! - First matching locale wins (configured order)

pub mod locale;
pub mod matcher;
pub mod router;

pub use locale::{LocaleError, LocaleSet};
pub use matcher::{AnyMatcher, Matcher, PathPrefixMatcher};
pub use router::{LocaleRouter, RewriteCount, RewriteError, RouteDecision};
