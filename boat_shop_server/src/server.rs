use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, error::InternalError, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use boat_order_engine::{
    cache::{InMemoryCache, OrderCache},
    events::{EventHandlers, EventHooks, EventProducers},
    CatalogManagement,
    OrderFlowApi,
    OrderManagement,
    PaymentProvider,
    SqliteDatabase,
};
use log::*;
use shop_common::Secret;
use yookassa_tools::helpers::SIGNATURE_HEADER;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::yookassa::YooKassaProvider,
    middleware::{AuthenticationMiddlewareFactory, HmacMiddlewareFactory},
    routes::{
        health,
        no_route,
        AllOrdersRoute,
        CreateOrderRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        UpdateOrderStatusRoute,
        YookassaWebhookRoute,
    },
};

pub type ShopApi = OrderFlowApi<SqliteDatabase, YooKassaProvider>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database migrations are up to date");
    let provider =
        YooKassaProvider::new(config.yookassa.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let cache: Arc<dyn OrderCache> = Arc::new(InMemoryCache::new());
    let handlers = EventHandlers::new(128, notification_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    match config.sweep_interval {
        Some(interval) => {
            let api = build_api(&config, db.clone(), provider.clone(), cache.clone(), producers.clone());
            let _worker = start_expiry_worker(api, interval);
        },
        None => warn!("🚀️ The expiry and reconciliation sweeps are disabled"),
    }
    let srv = create_server_instance(config, db, provider, cache, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

fn build_api(
    config: &ServerConfig,
    db: SqliteDatabase,
    provider: YooKassaProvider,
    cache: Arc<dyn OrderCache>,
    producers: EventProducers,
) -> ShopApi {
    OrderFlowApi::new(db, provider).with_cache(cache).with_producers(producers).with_config(config.order_flow)
}

/// Order notifications (e-mail and the like) are handled by other services. Here they are only logged.
fn notification_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            Box::pin(async move {
                info!("📦️ Order #{} placed by user {} ({})", ev.order.id, ev.order.user_id, ev.order.total_price)
            })
        })
        .on_order_paid(|ev| Box::pin(async move { info!("📦️ Order #{} has been paid", ev.order.id) }))
        .on_order_annulled(|ev| {
            Box::pin(async move {
                info!("📦️ Order #{} was cancelled while it was {}", ev.order.id, ev.previous_status)
            })
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: YooKassaProvider,
    cache: Arc<dyn OrderCache>,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let verifier = TokenVerifier::new(&config.auth);
    let host = config.host.clone();
    let port = config.port;
    let signature_checks = config.webhook_signature_checks;
    let webhook_key = config.yookassa.secret_key.clone();
    let srv = HttpServer::new(move || {
        let orders_api = build_api(&config, db.clone(), provider.clone(), cache.clone(), producers.clone());
        let verifier = verifier.clone();
        let webhook_key = webhook_key.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("shop::access_log"))
            .app_data(web::Data::new(orders_api))
            .configure(move |cfg| {
                configure_routes::<SqliteDatabase, YooKassaProvider>(cfg, verifier, webhook_key, signature_checks)
            })
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Registers every route of the shop. The [`OrderFlowApi`] for `B` and `P` must be added to the app data separately.
pub fn configure_routes<B, P>(
    cfg: &mut web::ServiceConfig,
    verifier: TokenVerifier,
    webhook_key: Secret<String>,
    signature_checks: bool,
) where
    B: OrderManagement + CatalogManagement + 'static,
    P: PaymentProvider + 'static,
{
    let orders_scope = web::scope("/orders")
        .wrap(AuthenticationMiddlewareFactory::new(verifier))
        .service(CreateOrderRoute::<B, P>::new())
        .service(MyOrdersRoute::<B, P>::new())
        .service(AllOrdersRoute::<B, P>::new())
        .service(OrderByIdRoute::<B, P>::new())
        .service(UpdateOrderStatusRoute::<B, P>::new());
    let webhook_scope = web::scope("/webhooks")
        .wrap(HmacMiddlewareFactory::new(SIGNATURE_HEADER, webhook_key, signature_checks))
        .service(YookassaWebhookRoute::<B, P>::new());
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health)
        .service(orders_scope)
        .service(webhook_scope)
        .default_service(web::to(no_route));
}

/// Malformed JSON bodies get the same error body as every other bad request.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(err, actix_web::ResponseError::error_response(&ServerError::BadRequest(message)))
            .into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(err, actix_web::ResponseError::error_response(&ServerError::BadRequest(message)))
            .into()
    })
}
