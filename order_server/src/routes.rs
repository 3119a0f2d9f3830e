//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go
//! into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers hit the database and the duplicate cache, so every one of them is async; a blocking
//! handler would stall the worker thread that runs it.

use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use order_engine::{
    api::order_objects::{OrderQueryFilter, Pagination},
    db_types::{NewOrder, OrderId, OrderStatusType},
    traits::{DuplicateCache, OrderPublisher, OrderRepository},
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{data_objects::OrderRequest, errors::ServerError, queue::QueueProducer};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
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

//----------------------------------------------   Intake  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderRepository, DuplicateCache, OrderPublisher);
/// Route handler for order submissions.
///
/// The request body is the same camelCase JSON document that queue producers send. A successful
/// submission returns `201 Created` with the stored, completed order. Duplicate submissions
/// return `409 Conflict` and submissions that fail validation return `400 Bad Request`.
pub async fn create_order<B, C, P>(
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderRepository,
    C: DuplicateCache,
    P: OrderPublisher,
{
    let order = NewOrder::from(body.into_inner());
    debug!("💻️ POST order submission {}", order.order_id);
    let order = api.create_order(order).await.map_err(|e| {
        debug!("💻️ Order was not accepted. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(order))
}

/// Asynchronous intake over HTTP. The submission is acknowledged with `202 Accepted` as soon as
/// it is on the intake queue; validation, deduplication and persistence happen in the consumer
/// pool, exactly as for submissions arriving from an external broker.
#[post("/orders/enqueue")]
pub async fn enqueue_order(
    body: web::Json<OrderRequest>,
    producer: web::Data<QueueProducer>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST enqueue submission {}", request.external_id);
    producer
        .submit(request)
        .await
        .map_err(|_| ServerError::BackendError("The intake queue has shut down".to_string()))?;
    Ok(HttpResponse::Accepted().finish())
}

//----------------------------------------------   Queries  ----------------------------------------------------
route!(order_by_id => Get "/orders/id/{id}" impl OrderRepository);
/// Fetch a single order by its database id.
pub async fn order_by_id<B: OrderRepository>(
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order_by_id({id})");
    let order = api.fetch_order_by_id(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_external_id => Get "/orders/external/{order_id}" impl OrderRepository);
/// Fetch a single order by the producer-assigned external id.
pub async fn order_by_external_id<B: OrderRepository>(
    path: web::Path<OrderId>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_external_id({order_id})");
    let order = api.fetch_order_by_order_id(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_search => Get "/orders" impl OrderRepository);
/// Search stored orders. Filters (`order_id`, `status`) and pagination (`offset`, `limit`,
/// `sort`) are all optional query parameters.
pub async fn orders_search<B: OrderRepository>(
    filter: web::Query<OrderQueryFilter>,
    pagination: web::Query<Pagination>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders search");
    let orders = api.search_orders(filter.into_inner(), &pagination).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(orders_by_status => Get "/orders/status/{status}" impl OrderRepository);
/// List orders in a given lifecycle status. The status segment is case-insensitive.
pub async fn orders_by_status<B: OrderRepository>(
    path: web::Path<String>,
    pagination: web::Query<Pagination>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let status = path.into_inner().parse::<OrderStatusType>().map_err(|e| {
        debug!("💻️ Could not parse order status. {e}");
        ServerError::InvalidRequestPath(e.to_string())
    })?;
    debug!("💻️ GET orders with status {status}");
    let orders = api.fetch_orders_by_status(status, &pagination).await?;
    Ok(HttpResponse::Ok().json(orders))
}
