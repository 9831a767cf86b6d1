//! Request middleware.

pub mod locale_rewrite;

pub use locale_rewrite::{locale_rewrite_middleware, LocaleRewriteState};
