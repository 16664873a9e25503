use crate::error::NotifyError;
use crate::time::{TimeParser, parse_time};

pub struct VerifierConfig {
    /// Pay-sign key (the `appKey`/partner key used in `&key=` of the MD5 signature).
    pub pay_sign_key: String,
    pub time_parser: TimeParser,
}

pub struct VerifierConfigBuilder {
    pay_sign_key: Option<String>,
    time_parser: Option<TimeParser>,
}

impl VerifierConfig {
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder {
            pay_sign_key: None,
            time_parser: None,
        }
    }
}

impl VerifierConfigBuilder {
    pub fn pay_sign_key(mut self, pay_sign_key: impl Into<String>) -> Self {
        self.pay_sign_key = Some(pay_sign_key.into());
        self
    }

    /// Override the `time_end` parser. Defaults to [`parse_time`].
    pub fn time_parser(mut self, time_parser: TimeParser) -> Self {
        self.time_parser = Some(time_parser);
        self
    }

    pub fn build(self) -> Result<VerifierConfig, NotifyError> {
        let pay_sign_key = self
            .pay_sign_key
            .ok_or_else(|| NotifyError::Config("pay_sign_key is required".into()))?;

        if pay_sign_key.is_empty() {
            return Err(NotifyError::Config("pay_sign_key must not be empty".into()));
        }

        Ok(VerifierConfig {
            pay_sign_key,
            time_parser: self.time_parser.unwrap_or(parse_time),
        })
    }
}

impl std::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("pay_sign_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
