//! Twilio carrier adapter. Basic-auth form POST against the Messages API;
//! Twilio's own error text is carried through verbatim on rejection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sms_core::{
    normalize_destination, CredentialStore, ProviderReceipt, SendError, SendRequest, SendResult,
    SmsSender,
};

pub const PROVIDER_ID: &str = "twilio";

pub const ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const FROM_NUMBER: &str = "TWILIO_FROM_NUMBER";

const REQUIRED_CREDENTIALS: &[&str] = &[ACCOUNT_SID, AUTH_TOKEN, FROM_NUMBER];
const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TwilioSender {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
    api_base: String,
    timeout: Duration,
}

impl TwilioSender {
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialStore>,
        api_base: Option<String>,
    ) -> Self {
        let base = api_base.unwrap_or_else(|| DEFAULT_API_BASE.into());
        Self {
            http,
            credentials,
            api_base: base.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn credential(&self, key: &str) -> Result<String, SendError> {
        match self.credentials.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SendError::CredentialsMissing),
        }
    }

    fn message_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    async fn send(&self, request: &SendRequest) -> SendResult {
        let account_sid = self.credential(ACCOUNT_SID)?;
        let auth_token = self.credential(AUTH_TOKEN)?;
        let from = self.credential(FROM_NUMBER)?;

        let to = format!(
            "+{}",
            normalize_destination(&request.destination, request.country_code())
        );
        let params = [
            ("To", to.as_str()),
            ("From", from.as_str()),
            ("Body", request.body.as_str()),
        ];

        let response = self
            .http
            .post(self.message_url(&account_sid))
            .basic_auth(&account_sid, Some(&auth_token))
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            let reason = carrier_error(&body)
                .unwrap_or_else(|| format!("status {}", status.as_u16()));
            tracing::warn!(
                provider = PROVIDER_ID,
                status = status.as_u16(),
                %reason,
                "twilio rejected message"
            );
            return Err(SendError::CarrierRejected(reason));
        }

        // A success status with no sid means the carrier accepted the message
        // but the response contract broke; that is a transport-level problem,
        // not a rejection.
        let raw: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let message_id = raw
            .get("sid")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SendError::Transport("carrier accepted but response had no message sid".into())
            })?
            .to_string();

        tracing::info!(provider = PROVIDER_ID, %message_id, "twilio accepted message");
        Ok(ProviderReceipt { message_id })
    }
}

fn carrier_error(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn transport(err: reqwest::Error) -> SendError {
    SendError::Transport(err.to_string())
}
