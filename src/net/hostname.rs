//! Host identity resolution.

/// Name of the running host, or an empty string when it cannot be resolved.
///
/// An empty name never matches a job's hostname filter.
pub fn resolve() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to query hostname.");
            String::new()
        }
    }
}
