use std::sync::Arc;

use tracing::{error, info};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::agents::handler::MessageHandler;
use crate::metrics::Metrics;
use crate::models::{InboundMessage, WhatsappForm};
use crate::transport::{twiml_message, MessageDelivery};

/// Twilio webhook: run the pipeline and send the reply back over the REST
/// API. An empty 200 acks the webhook once the reply went out-of-band; if
/// the REST send fails the reply rides the response body as TwiML instead,
/// so the user still hears back.
pub async fn handle_whatsapp(
    form: WhatsappForm,
    handler: Arc<MessageHandler>,
    delivery: Arc<dyn MessageDelivery>,
    metrics: Metrics,
) -> Result<warp::reply::Response, Rejection> {
    let inbound: InboundMessage = form.into();
    info!(sender = %inbound.sender_id, "webhook message received");

    let reply = handler.handle(&inbound).await;

    match delivery.send(&inbound.sender_id, &reply.text).await {
        Ok(sid) => {
            info!(%sid, "reply delivered via provider");
            Ok(warp::reply::with_status(warp::reply(), StatusCode::OK).into_response())
        }
        Err(err) => {
            error!(error = %err, "provider delivery failed, falling back to TwiML");
            metrics.delivery_failures.inc();
            let twiml = twiml_message(&reply.text);
            Ok(warp::reply::with_header(twiml, "Content-Type", "application/xml").into_response())
        }
    }
}
