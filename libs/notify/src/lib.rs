//! Caller-facing entry point for SMS notifications. Order-fulfillment and
//! webhook flows depend on this crate alone; adapter wiring, credential
//! sourcing, and fallback policy live behind [`SmsNotifier`].
//!
//! The façade never raises for carrier or configuration trouble: callers get
//! a [`DispatchOutcome`] and decide for themselves whether an undelivered
//! notification is fatal to their flow.

use std::sync::Arc;
use std::time::Duration;

use sms_core::{CredentialStore, DispatchOutcome, EnvCredentials, SendRequest, SmsSender};
use sms_dispatch::{CredentialResolver, Dispatcher};
use sms_sns::SnsSender;
use sms_twilio::TwilioSender;

pub use sms_core::{Attempt, Delivery, Disposition};

/// Most-reliable-first deployment default.
pub const DEFAULT_PROVIDER_ORDER: &[&str] = &[sms_twilio::PROVIDER_ID, sms_sns::PROVIDER_ID];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SmsNotifier {
    dispatcher: Dispatcher,
}

impl SmsNotifier {
    /// Default production wiring: credentials from the process environment,
    /// Twilio primary, SNS fallback.
    pub fn from_env() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SmsNotifierBuilder {
        SmsNotifierBuilder::default()
    }

    /// Deliver one message, trying providers in priority order. Always
    /// returns an outcome; inspect [`DispatchOutcome::delivered`] and the
    /// attempt trail for diagnostics.
    pub async fn notify_sms(
        &self,
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> DispatchOutcome {
        self.notify(&SendRequest::new(destination, message)).await
    }

    /// Same as [`notify_sms`](Self::notify_sms) for callers that carry a
    /// region hint or reuse a request value.
    pub async fn notify(&self, request: &SendRequest) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(request).await;
        if !outcome.delivered() {
            tracing::warn!(
                destination = %request.destination,
                trail = ?outcome.failure_trail(),
                "sms notification not delivered"
            );
        }
        outcome
    }

    /// Fire-and-forget view for callers that only care whether the message
    /// was accepted somewhere.
    pub async fn notify_sms_ok(
        &self,
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        self.notify_sms(destination, message).await.delivered()
    }
}

pub struct SmsNotifierBuilder {
    credentials: Arc<dyn CredentialStore>,
    order: Vec<String>,
    timeout: Duration,
    twilio_api_base: Option<String>,
    sns_api_base: Option<String>,
}

impl Default for SmsNotifierBuilder {
    fn default() -> Self {
        Self {
            credentials: Arc::new(EnvCredentials),
            order: DEFAULT_PROVIDER_ORDER.iter().map(|id| id.to_string()).collect(),
            timeout: DEFAULT_TIMEOUT,
            twilio_api_base: None,
            sns_api_base: None,
        }
    }
}

impl SmsNotifierBuilder {
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = store;
        self
    }

    /// Provider priority as data. Ids with no wired adapter show up in the
    /// attempt trail as skips.
    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Per-attempt request timeout. Bounded so a hung primary cannot keep the
    /// fallback from ever being tried.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint override, used by tests to point at a loopback carrier.
    pub fn twilio_api_base(mut self, base: impl Into<String>) -> Self {
        self.twilio_api_base = Some(base.into());
        self
    }

    /// Endpoint override, used by tests to point at a loopback carrier.
    pub fn sns_api_base(mut self, base: impl Into<String>) -> Self {
        self.sns_api_base = Some(base.into());
        self
    }

    pub fn build(self) -> SmsNotifier {
        let http = reqwest::Client::new();
        let twilio = TwilioSender::new(
            http.clone(),
            Arc::clone(&self.credentials),
            self.twilio_api_base,
        )
        .with_timeout(self.timeout);
        let sns = SnsSender::new(http, Arc::clone(&self.credentials), self.sns_api_base)
            .with_timeout(self.timeout);

        let senders: Vec<Arc<dyn SmsSender>> = vec![Arc::new(twilio), Arc::new(sns)];
        let resolver = CredentialResolver::new(Arc::clone(&self.credentials));
        SmsNotifier {
            dispatcher: Dispatcher::with_order(senders, &self.order, resolver),
        }
    }
}
