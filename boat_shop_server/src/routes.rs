//! Request handler definitions
//!
//! Define each route and its handler here. The handlers only translate between HTTP and [`OrderFlowApi`]; the order
//! rules live in the engine.
//!
//! Handlers run on actix worker threads, one request after another per worker. Never block in a handler: everything
//! that waits (database, payment provider, cache) must be awaited.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use boat_order_engine::{CatalogManagement, OrderFlowApi, OrderManagement, PaymentConfirmation, PaymentProvider};
use log::*;
use yookassa_tools::helpers::parse_webhook_event;

use crate::{
    auth::{JwtClaims, Role},
    data_objects::{NewOrderRequest, StatusUpdateRequest, WebhookResponse},
    errors::ServerError,
    helpers::flow_error,
    integrations::yookassa::map_provider_status,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Every handler is generic over the storage backend `B` and the payment provider `P` of the `OrderFlowApi` it uses.
// The path is a single literal or an array of them, for resources served with and without a trailing slash.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:tt impl OrderFlow) => {
        paste::paste! { pub struct [<$name:camel Route>]<B, P>(core::marker::PhantomData<fn() -> (B, P)>);}
        paste::paste! { impl<B, P> [<$name:camel Route>]<B, P> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (B, P)>)
            }
        }}
        paste::paste! { impl<B, P> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B, P>
        where
            B: boat_order_engine::OrderManagement + boat_order_engine::CatalogManagement + 'static,
            P: boat_order_engine::PaymentProvider + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B, P>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:tt impl OrderFlow where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B, P>(core::marker::PhantomData<fn() -> (B, P)>);}
        paste::paste! { impl<B, P> [<$name:camel Route>]<B, P> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (B, P)>)
            }
        }}
        paste::paste! { impl<B, P> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B, P>
        where
            B: boat_order_engine::OrderManagement + boat_order_engine::CatalogManagement + 'static,
            P: boat_order_engine::PaymentProvider + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B, P>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Fallback for requests that match no route, so that they get the same error body as every other failure.
pub async fn no_route(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    trace!("💻️ No route for {} {}", req.method(), req.path());
    Err(ServerError::NoRoute(format!("No route for {} {}", req.method(), req.path())))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/" impl OrderFlow);
/// Route handler for placing an order
///
/// The body names the product and the pickup point: `{"product_id": 7, "pickup_point_id": 3}`. On success the new
/// order is returned with status 201. It is `pending`, and its `payment_url` is where the customer pays.
///
/// If the payment provider cannot issue a payment, the order is cancelled straight away and the call fails with 502.
pub async fn create_order<B, P>(
    req: HttpRequest,
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let user_id = claims.user_id()?;
    let NewOrderRequest { product_id, pickup_point_id } = body.into_inner();
    debug!("💻️ POST order for product #{product_id} at pickup point #{pickup_point_id} by user {user_id}");
    let order = api.create_order(user_id, product_id, pickup_point_id).await.map_err(|e| flow_error(&req, e))?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/" impl OrderFlow);
/// Route handler for the caller's own orders, newest first.
pub async fn my_orders<B, P>(
    req: HttpRequest,
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let user_id = claims.user_id()?;
    debug!("💻️ GET orders for user {user_id}");
    let orders = api.list_user_orders(user_id).await.map_err(|e| flow_error(&req, e))?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/all-orders" impl OrderFlow where requires [Role::Admin]);
/// Route handler for the admin order list. Every order in the shop, newest first.
pub async fn all_orders<B, P>(req: HttpRequest, api: web::Data<OrderFlowApi<B, P>>) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    debug!("💻️ GET all orders");
    let orders = api.list_all_orders().await.map_err(|e| flow_error(&req, e))?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get ["/{id}", "/{id}/"] impl OrderFlow);
/// Route handler for a single order
///
/// Users can read their own orders. Admins can read any order. Anybody else gets a 404, exactly as if the order did
/// not exist.
pub async fn order_by_id<B, P>(
    req: HttpRequest,
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for user {}", claims.sub);
    let order = if claims.is_superuser {
        api.fetch_order(order_id).await
    } else {
        api.fetch_order_for_user(order_id, claims.user_id()?).await
    }
    .map_err(|e| flow_error(&req, e))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Patch ["/{id}", "/{id}/"] impl OrderFlow where requires [Role::Admin]);
/// Route handler for changing an order's status
///
/// Admins send `{"status": "processing"}` and the like. Illegal changes are refused with 409, and the response names
/// the order's current status. Asking for the status the order already has succeeds and changes nothing.
pub async fn update_order_status<B, P>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    debug!("💻️ PATCH order #{order_id} to {status}");
    let order = api.update_status(order_id, status).await.map_err(|e| flow_error(&req, e))?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(yookassa_webhook => Post "/yookassa" impl OrderFlow);
/// Route handler for YooKassa payment notifications
///
/// The signature has been checked by the time the handler runs. Only `payment.succeeded` is acted upon; every other
/// event is acknowledged with `{"status": "ignored"}`. Repeated notifications, and notifications for orders that can
/// no longer be paid, are acknowledged with `{"status": "ok"}`.
///
/// The only 5xx response is a storage failure while recording the payment, so that the provider tries again.
pub async fn yookassa_webhook<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    trace!("🪝️ Received YooKassa notification");
    let event = parse_webhook_event(&body).map_err(|e| {
        warn!("🪝️ Could not read YooKassa notification. {e}");
        ServerError::BadRequest(e.to_string())
    })?;
    if !event.is_payment_succeeded() {
        debug!("🪝️ Ignoring '{}' notification for payment {}", event.event, event.payment_id());
        return Ok(HttpResponse::Ok().json(WebhookResponse::ignored()));
    }
    let order_id = event.metadata().order_id().ok_or_else(|| {
        warn!("🪝️ Payment {} succeeded, but its metadata has no valid order id", event.payment_id());
        ServerError::BadRequest("Notification metadata has no valid order_id".into())
    })?;
    trace!("🪝️ Payment {} for order #{order_id} implies {}", event.payment_id(), map_provider_status(event.provider_status()));
    match api.confirm_payment(order_id, event.payment_id()).await {
        Ok(PaymentConfirmation::Paid(order)) => info!("🪝️ Order #{} paid with {}", order.id, event.payment_id()),
        Ok(PaymentConfirmation::AlreadyPaid(order)) => debug!("🪝️ Order #{} was already paid", order.id),
        Ok(PaymentConfirmation::Ignored { order_id, current }) => {
            info!("🪝️ Payment notification for order #{order_id} acknowledged without change. It is {current}.")
        },
        Err(e) => {
            warn!("🪝️ Could not record payment {} for order #{order_id}. {e}", event.payment_id());
            return Err(flow_error(&req, e));
        },
    }
    Ok(HttpResponse::Ok().json(WebhookResponse::ok()))
}
