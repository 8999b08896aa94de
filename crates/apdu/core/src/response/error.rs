//! Error types specific to APDU responses

use super::status::StatusWord;

/// Errors raised while interpreting a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Fewer than two bytes were returned, so there is no status word
    #[error("Incomplete response: {0} byte(s), expected at least 2")]
    Incomplete(usize),

    /// The card returned a non-success status word
    #[error("Status error {0}: {desc}", desc = .0.description())]
    Status(StatusWord),
}
