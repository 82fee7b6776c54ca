//! Order status transitions.
//!
//! | from \ to  | pending | paid | cancelled | processing | ready | completed |
//! |------------|---------|------|-----------|------------|-------|-----------|
//! | pending    | -       | ✓    | ✓         |            |       |           |
//! | paid       |         | -    | ✓         | ✓          |       |           |
//! | processing |         |      | ✓         | -          | ✓     |           |
//! | ready      |         |      |           |            | -     | ✓         |
//! | cancelled  |         |      | -         |            |       |           |
//! | completed  |         |      |           |            |       | -         |
//!
//! Moving an order to the status it already has always succeeds and changes nothing.
//!
//! Once the payment window of a pending order has closed, the only status change an admin or the expiry sweeper may
//! make is to cancel it. A payment confirmation from the provider is still honoured, since the provider decides
//! whether a late payment was accepted.
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Order, OrderStatusType, OrderStatusType::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Order cannot move from {current} to {requested}")]
pub struct TransitionError {
    pub current: OrderStatusType,
    pub requested: OrderStatusType,
}

/// What a legal status request requires of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order already has the requested status.
    NoOp,
    /// The status must be written.
    Apply { from: OrderStatusType, to: OrderStatusType },
}

/// Who is asking for the status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    Admin,
    PaymentProvider,
    System,
}

pub fn is_terminal(status: OrderStatusType) -> bool {
    matches!(status, Cancelled | Completed)
}

fn is_edge(from: OrderStatusType, to: OrderStatusType) -> bool {
    matches!(
        (from, to),
        (Pending, Paid) |
            (Pending, Cancelled) |
            (Paid, Cancelled) |
            (Paid, Processing) |
            (Processing, Cancelled) |
            (Processing, Ready) |
            (Ready, Completed)
    )
}

/// Checks a requested status change against the transition table alone.
pub fn check_transition(current: OrderStatusType, requested: OrderStatusType) -> Result<Transition, TransitionError> {
    if current == requested {
        return Ok(Transition::NoOp);
    }
    if is_edge(current, requested) {
        Ok(Transition::Apply { from: current, to: requested })
    } else {
        Err(TransitionError { current, requested })
    }
}

/// Checks a requested status change for a specific order at time `now`, taking its payment window into account.
pub fn check_order_transition(
    order: &Order,
    requested: OrderStatusType,
    source: TransitionSource,
    now: DateTime<Utc>,
) -> Result<Transition, TransitionError> {
    let transition = check_transition(order.status, requested)?;
    let window_closed = order.status == Pending && order.is_past_payment_window(now);
    match transition {
        Transition::Apply { to: Paid, .. } if window_closed && source != TransitionSource::PaymentProvider => {
            Err(TransitionError { current: order.status, requested })
        },
        t => Ok(t),
    }
}
