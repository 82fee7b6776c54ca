use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::db_types::{Order, OrderStatusType};

pub const DEFAULT_PAYMENT_WINDOW_SECONDS: i64 = 900;
pub const DEFAULT_LIST_CACHE_TTL_SECONDS: u64 = 120;
pub const DEFAULT_RECONCILE_AFTER_SECONDS: i64 = 300;

#[derive(Debug, Clone, Copy)]
pub struct OrderFlowConfig {
    /// How long the customer has to pay once the payment link is issued.
    pub payment_window: Duration,
    /// How long a cached order listing may be served.
    pub list_cache_ttl: StdDuration,
    /// How old a pending order without a payment must be before reconciliation takes it over from the request that
    /// created it.
    pub reconcile_after: Duration,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            payment_window: Duration::seconds(DEFAULT_PAYMENT_WINDOW_SECONDS),
            list_cache_ttl: StdDuration::from_secs(DEFAULT_LIST_CACHE_TTL_SECONDS),
            reconcile_after: Duration::seconds(DEFAULT_RECONCILE_AFTER_SECONDS),
        }
    }
}

/// Result of a status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Changed(Order),
    /// The order already had the requested status. Nothing was written.
    Unchanged(Order),
}

impl TransitionOutcome {
    pub fn into_order(self) -> Order {
        match self {
            Self::Changed(o) | Self::Unchanged(o) => o,
        }
    }
}

/// What happened when the provider told us an order was paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentConfirmation {
    /// The order moved to `paid`.
    Paid(Order),
    /// A repeated notification. The order was already `paid`.
    AlreadyPaid(Order),
    /// The order's status does not allow it to become `paid`. Nothing was written.
    Ignored { order_id: i64, current: OrderStatusType },
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    pub attached: Vec<Order>,
    pub cancelled: Vec<Order>,
}

impl ReconcileResult {
    pub fn total_count(&self) -> usize {
        self.attached.len() + self.cancelled.len()
    }
}
