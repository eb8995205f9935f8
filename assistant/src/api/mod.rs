use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::agents::handler::MessageHandler;
use crate::metrics::Metrics;
use crate::transport::MessageDelivery;

mod webhook;

pub fn routes(
    handler: Arc<MessageHandler>,
    delivery: Arc<dyn MessageDelivery>,
    metrics: Metrics,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("whatsapp")
        .and(warp::post())
        .and(warp::body::form())
        .and(with_handler(handler))
        .and(with_delivery(delivery))
        .and(with_metrics(metrics))
        .and_then(webhook::handle_whatsapp)
}

fn with_handler(
    handler: Arc<MessageHandler>,
) -> impl Filter<Extract = (Arc<MessageHandler>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || handler.clone())
}

fn with_delivery(
    delivery: Arc<dyn MessageDelivery>,
) -> impl Filter<Extract = (Arc<dyn MessageDelivery>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || delivery.clone())
}

fn with_metrics(
    metrics: Metrics,
) -> impl Filter<Extract = (Metrics,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || metrics.clone())
}
