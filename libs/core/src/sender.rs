use async_trait::async_trait;

use crate::message::{SendRequest, SendResult};

/// One carrier integration. Adding a carrier means adding an implementation;
/// the dispatcher never changes.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Stable identifier used in priority ordering and diagnostics.
    fn id(&self) -> &str;

    /// Named secrets this carrier cannot work without. The dispatcher checks
    /// these before spending a network round trip.
    fn required_credentials(&self) -> &'static [&'static str];

    /// Attempt delivery. Makes exactly one outbound call, or zero when the
    /// credential pre-check fails. Every failure path lands in
    /// `Err(SendError)`; nothing escapes this boundary as a raised fault.
    async fn send(&self, request: &SendRequest) -> SendResult;
}
