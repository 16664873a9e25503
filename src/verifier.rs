use crate::config::VerifierConfig;

/// Verifies notify URL callbacks with one pre-shared pay-sign key.
///
/// Holds no mutable state; share it freely between request handlers.
#[derive(Debug)]
pub struct NotifyVerifier {
    pub(crate) config: VerifierConfig,
}

impl NotifyVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }
}
