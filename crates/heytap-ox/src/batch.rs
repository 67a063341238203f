//! Bulk ad slot creation: naming rule, per-item accounting, multi-round
//! sessions.

use bon::Builder;

use crate::{
    client::Heytap,
    error::HeytapRequestError,
    response::ApiEnvelope,
    slot::{SlotKind, SlotRequest, SlotTemplate},
};

/// Price decision for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePolicy {
    /// Fixed floor price in yuan.
    Fixed(u32),
    /// Let the platform auction freely.
    Bidding,
}

impl PricePolicy {
    /// Label embedded in generated slot names: the price itself, or the
    /// literal `bidding`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            PricePolicy::Fixed(price) => price.to_string(),
            PricePolicy::Bidding => "bidding".to_string(),
        }
    }
}

/// Everything one batch needs: which template, whose inventory, how the
/// slots are named and priced, and how many to create.
#[derive(Debug, Clone, Builder)]
pub struct BatchSpec {
    pub template: SlotTemplate,
    #[builder(into)]
    pub app_name: String,
    #[builder(into)]
    pub base_name: String,
    pub price: PricePolicy,
    pub count: u32,
}

/// Naming rule: `app-base-label-index`, with the kind segment inserted
/// before the label for every kind except native.
#[must_use]
pub fn slot_name(
    app_name: &str,
    base_name: &str,
    kind: SlotKind,
    price_label: &str,
    index: u32,
) -> String {
    match kind {
        SlotKind::Native => format!("{app_name}-{base_name}-{price_label}-{index}"),
        _ => format!(
            "{app_name}-{base_name}-{}-{price_label}-{index}",
            kind.name_segment()
        ),
    }
}

/// Outcome of one create call within a batch.
#[derive(Debug, Clone)]
pub struct SlotOutcome {
    pub success: bool,
    /// Platform id of the created slot, when the platform returned one.
    pub pos_id: Option<String>,
    pub pos_name: String,
    pub price_label: String,
    /// Platform message, verbatim, when the item failed.
    pub error: Option<String>,
    /// Raw envelope the outcome was derived from.
    pub response: ApiEnvelope,
}

/// Ordered per-item outcomes plus the success tally.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SlotOutcome>,
    pub success_count: u32,
}

impl BatchReport {
    /// Number of items attempted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn total(&self) -> u32 {
        self.outcomes.len() as u32
    }
}

impl Heytap {
    /// Create `spec.count` slots, one call at a time, indices starting at 1.
    ///
    /// A failed item is recorded with the platform's message and the loop
    /// moves on; the batch always attempts every item. The loop is strictly
    /// sequential: names carry a sequential index and the platform has no
    /// idempotency key, so overlapping submissions would risk duplicates.
    /// Only token acquisition failure aborts the batch.
    pub async fn create_batch(
        &self,
        spec: &BatchSpec,
    ) -> Result<BatchReport, HeytapRequestError> {
        if spec.count == 0 {
            return Err(HeytapRequestError::Validation(
                "batch count must be at least 1".to_string(),
            ));
        }
        match spec.price {
            PricePolicy::Fixed(_) if spec.template.is_bidding() => {
                return Err(HeytapRequestError::Validation(format!(
                    "template {} is a bidding template and takes no target price",
                    spec.template.name
                )));
            }
            PricePolicy::Bidding if !spec.template.is_bidding() => {
                return Err(HeytapRequestError::Validation(format!(
                    "template {} requires a target price",
                    spec.template.name
                )));
            }
            _ => {}
        }

        let label = spec.price.label();
        let mut report = BatchReport::default();

        for index in 1..=spec.count {
            let mut config = spec.template.config.clone();
            let mut target_price = None;
            if let PricePolicy::Fixed(price) = spec.price {
                config.target_price_open = Some(u32::from(price > 0));
                target_price = Some(price);
            }

            let request = SlotRequest {
                pos_name: slot_name(
                    &spec.app_name,
                    &spec.base_name,
                    spec.template.kind,
                    &label,
                    index,
                ),
                config,
                target_price,
            };

            let envelope = self.create_ad_slot(&request).await?;
            let success = envelope.is_success();
            if success {
                report.success_count += 1;
            }
            report.outcomes.push(SlotOutcome {
                success,
                pos_id: envelope.pos_id(),
                pos_name: request.pos_name,
                price_label: label.clone(),
                error: if success {
                    None
                } else {
                    Some(envelope.message.clone().unwrap_or_default())
                },
                response: envelope,
            });
        }

        Ok(report)
    }
}

/// One instruction to a [`BatchSession`]. `Stop` ends the session and
/// yields everything it created.
#[derive(Debug, Clone)]
pub enum BatchCommand {
    Create(BatchSpec),
    Stop,
}

/// What a session step produced.
#[derive(Debug)]
pub enum SessionStep {
    /// One batch ran; here is its report.
    Report(BatchReport),
    /// The caller stopped; every slot created during the session.
    Finished(Vec<SlotOutcome>),
}

/// Accumulates successfully created slots across repeated batches until the
/// caller sends [`BatchCommand::Stop`].
#[derive(Debug, Default)]
pub struct BatchSession {
    created: Vec<SlotOutcome>,
}

impl BatchSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots created so far in this session.
    #[must_use]
    pub fn created(&self) -> &[SlotOutcome] {
        &self.created
    }

    /// Run one command. `Create` executes a batch and folds its successes
    /// into the session; `Stop` drains and returns everything created.
    pub async fn run(
        &mut self,
        client: &Heytap,
        command: BatchCommand,
    ) -> Result<SessionStep, HeytapRequestError> {
        match command {
            BatchCommand::Create(spec) => {
                let report = client.create_batch(&spec).await?;
                self.created
                    .extend(report.outcomes.iter().filter(|o| o.success).cloned());
                Ok(SessionStep::Report(report))
            }
            BatchCommand::Stop => Ok(SessionStep::Finished(std::mem::take(&mut self.created))),
        }
    }
}
