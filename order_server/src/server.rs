use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use order_engine::{
    cache::MemoryCache,
    db::sqlite::run_migrations,
    events::{EventHandlers, EventHooks, EventPublisher},
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    queue::{attach_outbound_bridge, start_consumers, IntakeQueue, QueueProducer},
    routes::{
        enqueue_order,
        health,
        CreateOrderRoute,
        OrderByExternalIdRoute,
        OrderByIdRoute,
        OrdersByStatusRoute,
        OrdersSearchRoute,
    },
};

/// Brings up the full gateway: store, migrations, outbound event bridge, queue consumer pool
/// and the HTTP listener. Runs until the HTTP server shuts down.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.skip_migrations {
        info!("🗃️ OIG_SKIP_MIGRATIONS is set. The database schema is assumed to be up to date.");
    } else {
        run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }

    let cache = MemoryCache::new();
    let mut hooks = EventHooks::default();
    attach_outbound_bridge(&mut hooks);
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let publisher = EventPublisher::new(handlers.producers());
    handlers.start_handlers().await;

    let queue_api = OrderFlowApi::new(db.clone(), cache.clone(), publisher.clone(), config.dedup.clone());
    let (intake, receiver) = IntakeQueue::new(config.queue.prefetch);
    let consumer_pool = start_consumers(queue_api, receiver, config.queue);
    let producer = intake.producer();
    info!("📨️ Queue intake channel is open");

    let srv = create_server_instance(config, db, cache, publisher, producer)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    // the intake queue closes with the server; let the consumers drain
    drop(intake);
    let _ = consumer_pool.await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    cache: MemoryCache,
    publisher: EventPublisher,
    producer: QueueProducer,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), cache.clone(), publisher.clone(), config.dedup.clone());
        let query_api = OrderQueryApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("oig::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(producer.clone()))
            .service(health)
            .service(enqueue_order)
            .service(CreateOrderRoute::<SqliteDatabase, MemoryCache, EventPublisher>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrderByExternalIdRoute::<SqliteDatabase>::new())
            .service(OrdersByStatusRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
