//! # Path Formats

/// Output format for a rendered path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFormat {
    /// Router pattern with `{param}` placeholders left in place (axum syntax)
    Route,
    /// Concrete request path with every placeholder substituted and escaped
    Http,
}
