use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid input: notification parameter set is empty")]
    InvalidInput,

    #[error("Notification is missing the sign parameter")]
    MissingSignature,

    #[error("Notification signature verification failed")]
    SignatureMismatch,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error(
        "Inconsistent fees: transport_fee={transport_fee} + product_fee={product_fee} != total_fee={total_fee}"
    )]
    InconsistentFees {
        total_fee: i64,
        transport_fee: i64,
        product_fee: i64,
    },

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifyError {
    pub(crate) fn malformed(field: &'static str, reason: impl ToString) -> Self {
        NotifyError::MalformedField {
            field,
            reason: reason.to_string(),
        }
    }
}
