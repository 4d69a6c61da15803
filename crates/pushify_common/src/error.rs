// --- File: crates/pushify_common/src/error.rs ---

/// A trait for converting errors to HTTP status codes.
///
/// Domain error enums implement this so handlers can map a failure to a
/// response status without matching on every variant at each call site.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}
