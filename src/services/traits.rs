use anyhow::Result;

use crate::database::models::{Match, Player};

/// Current state of a payment as reported by the gateway. The webhook body is
/// never trusted; this is always the result of a fresh fetch by id.
#[derive(Debug, Clone)]
pub struct PaymentInfo {
    pub status: String,
    pub external_reference: Option<String>,
}

/// Outbound template notifications. Implementations never surface errors to
/// callers; a failed send is logged and swallowed.
#[allow(async_fn_in_trait)]
pub trait Notifier: Send + Sync {
    async fn send_template(&self, to: &str, template: &str, params: &[String]);
}

/// Generates a short recap text for a settled match, suitable for pasting
/// into the group chat.
#[allow(async_fn_in_trait)]
pub trait SummaryGenerator: Send + Sync {
    /// `None` when the generator is not configured.
    async fn generate_summary(&self, match_info: &Match) -> Result<Option<String>>;
}

#[allow(async_fn_in_trait)]
pub trait PaymentProvider: Send + Sync {
    /// Creates a gateway preference for one player's share of a match and
    /// returns the checkout URL. `None` when the gateway is not configured.
    async fn create_preference(&self, match_info: &Match, player: &Player)
    -> Result<Option<String>>;

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo>;
}
