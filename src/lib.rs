pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod notify;
pub mod time;
pub mod verifier;

pub use config::{VerifierConfig, VerifierConfigBuilder};
pub use error::NotifyError;
pub use model::notify::{Charset, NotifyUrlData, SignMethod};
pub use model::params::NotifyParams;
pub use notify::decode_notify_url;
pub use verifier::NotifyVerifier;
