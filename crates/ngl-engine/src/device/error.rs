use thiserror::Error;

/// Failure reported by the GL context itself.
///
/// Compile and link failures carry the driver info log and are surfaced by the
/// shader layer instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlError {
    /// `glGen*`/`glCreate*` returned no object.
    #[error("failed to create {kind}: {reason}")]
    CreateObject { kind: &'static str, reason: String },
}

impl GlError {
    pub(crate) fn create(kind: &'static str, reason: impl Into<String>) -> Self {
        GlError::CreateObject { kind, reason: reason.into() }
    }
}
