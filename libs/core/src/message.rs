use serde::Serialize;

use crate::phone::DEFAULT_COUNTRY_CODE;

/// One notification to deliver. Built once per dispatch and never mutated;
/// the destination is carried raw and each adapter formats it for its own
/// wire protocol.
#[derive(Clone, Debug)]
pub struct SendRequest {
    pub destination: String,
    pub body: String,
    /// Country calling code applied to bare 10-digit destinations. `None`
    /// means the North American default.
    pub region: Option<String>,
}

impl SendRequest {
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            body: body.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn country_code(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_COUNTRY_CODE)
    }
}

/// Carrier acceptance of a message, with the carrier-assigned correlation id.
/// Acceptance means the carrier took the message, not that a handset saw it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderReceipt {
    pub message_id: String,
}

/// Everything that can go wrong inside one adapter attempt. Adapters convert
/// every failure into one of these; nothing panics or escapes as a raw
/// transport error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum SendError {
    /// Required credentials were absent or empty; no network call was made.
    #[error("credentials missing")]
    CredentialsMissing,
    /// The carrier answered with a non-success status; the carrier's own
    /// error text is preserved verbatim.
    #[error("carrier rejected: {0}")]
    CarrierRejected(String),
    /// The call itself failed (timeout, DNS, reset) before the carrier could
    /// answer.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Uniform result of one adapter attempt, whatever the carrier's response
/// shape looks like.
pub type SendResult = Result<ProviderReceipt, SendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_defaults_to_north_america() {
        let req = SendRequest::new("4165551234", "hi");
        assert_eq!(req.country_code(), "1");
    }

    #[test]
    fn region_hint_overrides_default() {
        let req = SendRequest::new("2075550123", "hi").with_region("44");
        assert_eq!(req.country_code(), "44");
    }

    #[test]
    fn send_error_preserves_carrier_text() {
        let err = SendError::CarrierRejected("insufficient balance".into());
        assert_eq!(err.to_string(), "carrier rejected: insufficient balance");
    }
}
