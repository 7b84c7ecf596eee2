//! API constants
//!
//! All routes are mounted under a single unversioned prefix.

/// Helper macro for constructing API paths with the base prefix at compile
/// time.
///
/// Usage: `api_path!("/organizations")` expands to `"/api/organizations"`.
#[macro_export]
macro_rules! api_path {
    ($path:expr) => {
        concat!("/api", $path)
    };
}
