use std::time::Duration;

use boat_order_engine::{db_types::Order, OrderFlowApi, SqliteDatabase};
use log::*;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::integrations::yookassa::YooKassaProvider;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval` the worker cancels pending orders whose payment window has closed, and then finishes off orders
/// that were stored but never got a payment link.
pub fn start_expiry_worker(api: OrderFlowApi<SqliteDatabase, YooKassaProvider>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Order expiry worker started. Sweeping every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running unpaid order expiry job");
            match api.expire_unpaid_orders().await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No orders expired"),
                Ok(expired) => info!("🕰️ {} orders expired: {}", expired.len(), order_list(&expired)),
                Err(e) => error!("🕰️ Error running unpaid order expiry job: {e}"),
            }
            trace!("🕰️ Running payment reconciliation job");
            match api.reconcile_unattached_orders().await {
                Ok(result) if result.total_count() == 0 => trace!("🕰️ Nothing to reconcile"),
                Ok(result) => {
                    info!("🕰️ {} orders reconciled", result.total_count());
                    debug!("🕰️ Payment attached: {}", order_list(&result.attached));
                    debug!("🕰️ Cancelled: {}", order_list(&result.cancelled));
                },
                Err(e) => error!("🕰️ Error running payment reconciliation job: {e}"),
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders.iter().map(|o| format!("#{} (user {})", o.id, o.user_id)).collect::<Vec<String>>().join(", ")
}
