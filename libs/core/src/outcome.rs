use serde::Serialize;

use crate::message::{ProviderReceipt, SendError};

/// What the dispatcher tells its caller: which provider (if any) accepted the
/// message, plus the full attempt trail for diagnostics. On total failure the
/// trail holds one entry per configured provider, in attempt order.
#[derive(Clone, Debug, Serialize)]
pub struct DispatchOutcome {
    pub delivery: Option<Delivery>,
    pub attempts: Vec<Attempt>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Delivery {
    pub provider: String,
    pub receipt: ProviderReceipt,
}

#[derive(Clone, Debug, Serialize)]
pub struct Attempt {
    pub provider: String,
    pub disposition: Disposition,
}

#[derive(Clone, Debug, Serialize)]
pub enum Disposition {
    Accepted { message_id: String },
    Skipped { reason: String },
    Failed(SendError),
}

impl DispatchOutcome {
    pub fn delivered(&self) -> bool {
        self.delivery.is_some()
    }

    /// Human-readable reason per attempt, in order. Empty only when no
    /// providers are configured at all.
    pub fn failure_trail(&self) -> Vec<String> {
        self.attempts
            .iter()
            .map(|attempt| match &attempt.disposition {
                Disposition::Accepted { message_id } => {
                    format!("{}: accepted ({message_id})", attempt.provider)
                }
                Disposition::Skipped { reason } => {
                    format!("{}: skipped ({reason})", attempt.provider)
                }
                Disposition::Failed(err) => format!("{}: {err}", attempt.provider),
            })
            .collect()
    }
}

impl Attempt {
    pub fn accepted(provider: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            disposition: Disposition::Accepted {
                message_id: message_id.into(),
            },
        }
    }

    pub fn skipped(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            disposition: Disposition::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(provider: impl Into<String>, error: SendError) -> Self {
        Self {
            provider: provider.into(),
            disposition: Disposition::Failed(error),
        }
    }
}
