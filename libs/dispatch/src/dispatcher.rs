use std::sync::Arc;

use metrics::counter;
use sms_core::{Attempt, Delivery, DispatchOutcome, SendRequest, SmsSender};

use crate::resolver::CredentialResolver;

enum Slot {
    Wired(Arc<dyn SmsSender>),
    /// Named in the configured order but no adapter registered under that id.
    Missing(String),
}

/// Walks providers in a fixed priority order. Skips providers whose
/// credentials are absent, stops on the first carrier acceptance, and never
/// retries the same provider within one dispatch. All failures come back as
/// data; this type has no error path of its own.
pub struct Dispatcher {
    slots: Vec<Slot>,
    resolver: CredentialResolver,
}

impl Dispatcher {
    /// Providers are attempted in the order given.
    pub fn new(senders: Vec<Arc<dyn SmsSender>>, resolver: CredentialResolver) -> Self {
        Self {
            slots: senders.into_iter().map(Slot::Wired).collect(),
            resolver,
        }
    }

    /// Build from a configured id list. Ids with no matching adapter stay in
    /// the trail as skips rather than being silently dropped, so a typo in
    /// deployment config shows up in diagnostics. Duplicate ids collapse to
    /// their first occurrence: one dispatch never attempts the same provider
    /// twice.
    pub fn with_order(
        senders: Vec<Arc<dyn SmsSender>>,
        order: &[String],
        resolver: CredentialResolver,
    ) -> Self {
        let mut seen: Vec<&str> = Vec::with_capacity(order.len());
        let slots = order
            .iter()
            .filter(|id| {
                if seen.contains(&id.as_str()) {
                    false
                } else {
                    seen.push(id.as_str());
                    true
                }
            })
            .map(|id| {
                senders
                    .iter()
                    .find(|sender| sender.id() == id.as_str())
                    .map(|sender| Slot::Wired(Arc::clone(sender)))
                    .unwrap_or_else(|| Slot::Missing(id.clone()))
            })
            .collect();
        Self { slots, resolver }
    }

    pub async fn dispatch(&self, request: &SendRequest) -> DispatchOutcome {
        let mut attempts = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            let sender = match slot {
                Slot::Wired(sender) => sender,
                Slot::Missing(id) => {
                    tracing::debug!(provider = %id, "skipping provider: no adapter wired");
                    attempts.push(Attempt::skipped(id.clone(), "no adapter wired"));
                    continue;
                }
            };

            let provider = sender.id().to_string();
            if !self.resolver.is_available(sender.as_ref()) {
                tracing::debug!(
                    provider = %provider,
                    "skipping provider: credentials not configured"
                );
                counter!("sms_dispatch_skipped_total", "provider" => provider.clone())
                    .increment(1);
                attempts.push(Attempt::skipped(provider, "credentials not configured"));
                continue;
            }

            counter!("sms_dispatch_attempt_total", "provider" => provider.clone()).increment(1);
            match sender.send(request).await {
                Ok(receipt) => {
                    tracing::info!(
                        provider = %provider,
                        message_id = %receipt.message_id,
                        "message accepted for delivery"
                    );
                    counter!("sms_dispatch_accepted_total", "provider" => provider.clone())
                        .increment(1);
                    attempts.push(Attempt::accepted(provider.clone(), receipt.message_id.clone()));
                    return DispatchOutcome {
                        delivery: Some(Delivery { provider, receipt }),
                        attempts,
                    };
                }
                Err(err) => {
                    tracing::warn!(
                        provider = %provider,
                        error = %err,
                        "provider attempt failed, falling through"
                    );
                    attempts.push(Attempt::failed(provider, err));
                }
            }
        }

        tracing::warn!(attempts = attempts.len(), "all providers exhausted");
        counter!("sms_dispatch_exhausted_total").increment(1);
        DispatchOutcome {
            delivery: None,
            attempts,
        }
    }
}
