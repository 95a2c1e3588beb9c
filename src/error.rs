use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures surfaced to the user. Neither carries detail on purpose: the
/// caller just re-prompts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("please fill in all fields")]
    InvalidCredentials,
    #[error("please complete the payment form")]
    IncompletePaymentForm,
}
