use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    cache::{cache_key, InMemoryCache, OrderCache, ORDERS_LIST_NAMESPACE},
    db_types::{NewOrder, Order, OrderStatusType},
    events::EventProducers,
    helpers::{Clock, SystemClock},
    shop_api::{
        errors::OrderFlowError,
        order_objects::{OrderFlowConfig, PaymentConfirmation, ReconcileResult, TransitionOutcome},
    },
    state_machine::{check_order_transition, Transition, TransitionError, TransitionSource},
    traits::{CatalogManagement, OrderManagement, PaymentIntent, PaymentProvider, PaymentRequest, ProviderError},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders, issuing payment links, and moving orders
/// through their statuses in response to admins, the payment provider and the background sweeps.
pub struct OrderFlowApi<B, P> {
    db: B,
    provider: P,
    cache: Arc<dyn OrderCache>,
    clock: Arc<dyn Clock>,
    producers: EventProducers,
    config: OrderFlowConfig,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.config)
    }
}

impl<B, P> OrderFlowApi<B, P> {
    /// Creates an API with an in-memory listing cache, the system clock, no event subscribers and default timings.
    pub fn new(db: B, provider: P) -> Self {
        Self {
            db,
            provider,
            cache: Arc::new(InMemoryCache::new()),
            clock: Arc::new(SystemClock),
            producers: EventProducers::default(),
            config: OrderFlowConfig::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn OrderCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_producers(mut self, producers: EventProducers) -> Self {
        self.producers = producers;
        self
    }

    pub fn with_config(mut self, config: OrderFlowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &OrderFlowConfig {
        &self.config
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    /// Places an order for `product_id`, to be collected at `pickup_point_id`, and obtains a payment link for it.
    ///
    /// The order is committed before the payment provider is called, and the payment details are written in a second
    /// step, so no database transaction is held open across the provider call. If the provider fails, the order is
    /// cancelled again and [`OrderFlowError::PaymentUnavailable`] (transient failures) or
    /// [`OrderFlowError::ProviderRejected`] is returned.
    pub async fn create_order(
        &self,
        user_id: i64,
        product_id: i64,
        pickup_point_id: i64,
    ) -> Result<Order, OrderFlowError> {
        let pickup_point = self
            .db
            .fetch_pickup_point(pickup_point_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Pickup point #{pickup_point_id}")))?;
        let product = self
            .db
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Product #{product_id}")))?;
        if !product.is_active {
            debug!("🔄️ User {user_id} tried to order inactive product #{product_id}");
            return Err(OrderFlowError::Unavailable(product_id));
        }
        let seed = NewOrder::snapshot(user_id, &product, &pickup_point);
        let order = self.db.insert_order(seed).await?;
        info!("🔄️ Order #{} for '{}' ({}) created for user {user_id}", order.id, order.product_name, order.total_price);

        let request = PaymentRequest::for_order(order.id, order.total_price);
        let intent = match self.provider.create_payment(request).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("🔄️ Could not create a payment for order #{}: {e}", order.id);
                self.cancel_unpayable_order(&order).await;
                self.invalidate_order_lists().await;
                return Err(match e {
                    ProviderError::Unavailable(s) => OrderFlowError::PaymentUnavailable(s),
                    ProviderError::Rejected(s) => OrderFlowError::ProviderRejected(s),
                });
            },
        };
        let order = self.attach_payment(&order, &intent).await?;
        self.invalidate_order_lists().await;
        self.producers.publish_order_created(&order);
        Ok(order)
    }

    async fn attach_payment(&self, order: &Order, intent: &PaymentIntent) -> Result<Order, OrderFlowError> {
        let expires_at = order.created_at + self.config.payment_window;
        let result = self.db.attach_payment(order.id, &intent.payment_id, &intent.confirmation_url, expires_at).await;
        let order = match result {
            Ok(order) => order,
            Err(e) => {
                error!("🔄️ Payment {} exists but could not be attached to order #{}: {e}", intent.payment_id, order.id);
                return Err(e.into());
            },
        };
        debug!("🔄️ Order #{} has payment {} (provider status {})", order.id, intent.payment_id, intent.provider_status);
        Ok(order)
    }

    /// Compensation for a failed payment creation. Failures here are logged; the reconciliation sweep picks up any
    /// order that is left behind.
    async fn cancel_unpayable_order(&self, order: &Order) {
        match self.db.update_order_status(order.id, OrderStatusType::Pending, OrderStatusType::Cancelled).await {
            Ok(Some(cancelled)) => {
                info!("🔄️ Order #{} cancelled because it has no payment", order.id);
                self.producers.publish_status_change(&cancelled, OrderStatusType::Pending);
            },
            Ok(None) => warn!("🔄️ Order #{} was no longer pending, so it was not cancelled", order.id),
            Err(e) => error!("🔄️ Could not cancel order #{} after payment failure: {e}", order.id),
        }
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| OrderFlowError::NotFound(format!("Order #{order_id}")))
    }

    /// Fetches an order on behalf of `user_id`. Other users' orders are reported as missing.
    pub async fn fetch_order_for_user(&self, order_id: i64, user_id: i64) -> Result<Order, OrderFlowError> {
        match self.fetch_order(order_id).await? {
            order if order.user_id == user_id => Ok(order),
            _ => {
                debug!("🔄️ User {user_id} asked for order #{order_id}, which belongs to someone else");
                Err(OrderFlowError::NotFound(format!("Order #{order_id}")))
            },
        }
    }

    /// The user's orders, newest first. Served from the listing cache when possible.
    pub async fn list_user_orders(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let key = cache_key(ORDERS_LIST_NAMESPACE, &[&user_id.to_string(), "GET", "/orders/"]);
        match self.cache.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Order>>(&json) {
                Ok(orders) => {
                    trace!("🔄️ Order list for user {user_id} served from cache");
                    return Ok(orders);
                },
                Err(e) => warn!("🔄️ Cached order list for user {user_id} is unreadable: {e}"),
            },
            Ok(None) => trace!("🔄️ Order list for user {user_id} not cached"),
            Err(e) => warn!("🔄️ Could not read order list cache: {e}"),
        }
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        match serde_json::to_string(&orders) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&key, json, self.config.list_cache_ttl).await {
                    warn!("🔄️ Could not cache order list for user {user_id}: {e}");
                }
            },
            Err(e) => warn!("🔄️ Could not serialize order list for user {user_id}: {e}"),
        }
        Ok(orders)
    }

    /// Every order in the shop, newest first. Never cached.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_all_orders().await?;
        Ok(orders)
    }

    /// Changes the status of an order on an admin's request.
    ///
    /// Requesting the current status succeeds without writing anything. Illegal requests fail with
    /// [`OrderFlowError::InvalidTransition`] and leave the order untouched.
    pub async fn update_status(&self, order_id: i64, new_status: OrderStatusType) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        let outcome = self.transition(order, new_status, TransitionSource::Admin).await?;
        Ok(outcome.into_order())
    }

    /// Records that the provider has accepted payment for `order_id`.
    ///
    /// Repeated notifications are harmless. A notification for an order that can no longer become `paid` is
    /// reported as [`PaymentConfirmation::Ignored`] rather than an error, since the provider cannot do anything about
    /// it.
    pub async fn confirm_payment(&self, order_id: i64, payment_id: &str) -> Result<PaymentConfirmation, OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        if let Some(known) = order.payment_id.as_deref() {
            if known != payment_id {
                warn!("🔄️ Payment {payment_id} confirmed for order #{order_id}, but the order was issued {known}");
            }
        }
        match self.transition(order, OrderStatusType::Paid, TransitionSource::PaymentProvider).await {
            Ok(TransitionOutcome::Changed(order)) => {
                info!("🔄️ Order #{order_id} has been paid ({payment_id})");
                Ok(PaymentConfirmation::Paid(order))
            },
            Ok(TransitionOutcome::Unchanged(order)) => {
                debug!("🔄️ Order #{order_id} was already paid. Repeated notification ignored");
                Ok(PaymentConfirmation::AlreadyPaid(order))
            },
            Err(OrderFlowError::InvalidTransition(TransitionError { current, .. })) => {
                if current == OrderStatusType::Cancelled {
                    warn!(
                        "🔄️ Payment {payment_id} succeeded for order #{order_id}, which is cancelled. The customer may \
                         need a manual refund."
                    );
                } else {
                    info!("🔄️ Payment confirmation for order #{order_id} ignored, the order is already {current}");
                }
                Ok(PaymentConfirmation::Ignored { order_id, current })
            },
            Err(e) => Err(e),
        }
    }

    /// Cancels pending orders whose payment window has closed. Returns the orders that were cancelled.
    ///
    /// An order that is paid while the sweep runs stays paid: the status write only happens if the order is still
    /// pending.
    pub async fn expire_unpaid_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let now = self.clock.now();
        let overdue = self.db.fetch_pending_orders().await?.into_iter().filter(|o| o.is_past_payment_window(now));
        let mut expired = Vec::new();
        for order in overdue {
            let id = order.id;
            match self.transition(order, OrderStatusType::Cancelled, TransitionSource::System).await {
                Ok(TransitionOutcome::Changed(order)) => expired.push(order),
                Ok(TransitionOutcome::Unchanged(_)) => {},
                Err(OrderFlowError::InvalidTransition(e)) => {
                    debug!("🔄️ Order #{id} became {} before it could expire", e.current);
                },
                Err(e) => return Err(e),
            }
        }
        Ok(expired)
    }

    /// Finds pending orders that never got a payment attached (e.g. the process died between storing the order and
    /// writing the payment link) and finishes the job.
    ///
    /// The provider is asked again with the order's original idempotence key, so a payment that was created the
    /// first time round is returned rather than duplicated. If the provider fails, the order is cancelled.
    pub async fn reconcile_unattached_orders(&self) -> Result<ReconcileResult, OrderFlowError> {
        let cutoff = self.clock.now() - self.config.reconcile_after;
        let stale = self
            .db
            .fetch_pending_orders()
            .await?
            .into_iter()
            .filter(|o| !o.has_payment() && o.created_at < cutoff);
        let mut result = ReconcileResult::default();
        for order in stale {
            let request = PaymentRequest::for_order(order.id, order.total_price);
            match self.provider.create_payment(request).await {
                Ok(intent) => match self.attach_payment(&order, &intent).await {
                    Ok(order) => {
                        info!("🔄️ Reconciled order #{} with payment {}", order.id, intent.payment_id);
                        result.attached.push(order);
                    },
                    Err(OrderFlowError::StorageError(e)) => {
                        warn!("🔄️ Order #{} could not be reconciled: {e}", order.id);
                    },
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    warn!("🔄️ Provider refused to reissue payment for order #{}: {e}. Cancelling it.", order.id);
                    let id = order.id;
                    match self.transition(order, OrderStatusType::Cancelled, TransitionSource::System).await {
                        Ok(TransitionOutcome::Changed(order)) => result.cancelled.push(order),
                        Ok(TransitionOutcome::Unchanged(_)) => {},
                        Err(OrderFlowError::InvalidTransition(e)) => {
                            debug!("🔄️ Order #{id} became {} during reconciliation", e.current);
                        },
                        Err(e) => return Err(e),
                    }
                },
            }
        }
        if !result.attached.is_empty() {
            self.invalidate_order_lists().await;
        }
        Ok(result)
    }

    /// Applies a status change to `order`, as last read by the caller.
    ///
    /// The write is conditional on the order still having the status the caller saw. If another writer got there
    /// first, the order is re-read: if it now has the requested status the request is a no-op, otherwise it fails
    /// with the status the order actually has.
    async fn transition(
        &self,
        order: Order,
        requested: OrderStatusType,
        source: TransitionSource,
    ) -> Result<TransitionOutcome, OrderFlowError> {
        let (from, to) = match check_order_transition(&order, requested, source, self.clock.now())? {
            Transition::NoOp => {
                trace!("🔄️ Order #{} is already {requested}", order.id);
                return Ok(TransitionOutcome::Unchanged(order));
            },
            Transition::Apply { from, to } => (from, to),
        };
        match self.db.update_order_status(order.id, from, to).await? {
            Some(updated) => {
                info!("🔄️ Order #{} moved from {from} to {to}", updated.id);
                self.invalidate_order_lists().await;
                self.producers.publish_status_change(&updated, from);
                Ok(TransitionOutcome::Changed(updated))
            },
            None => {
                let current = self.fetch_order(order.id).await?;
                debug!("🔄️ Order #{} changed to {} while moving it from {from} to {to}", current.id, current.status);
                if current.status == requested {
                    Ok(TransitionOutcome::Unchanged(current))
                } else {
                    Err(TransitionError { current: current.status, requested }.into())
                }
            },
        }
    }

    async fn invalidate_order_lists(&self) {
        match self.cache.purge_namespace(ORDERS_LIST_NAMESPACE).await {
            Ok(n) => trace!("🔄️ {n} cached order lists invalidated"),
            Err(e) => warn!("🔄️ Could not invalidate cached order lists: {e}. They will expire on their own."),
        }
    }
}
