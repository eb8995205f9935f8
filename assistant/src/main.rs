use std::sync::Arc;

use tracing::{error, info};
use warp::Filter;

mod agents;
mod api;
mod catalog;
mod config;
mod error;
mod metrics;
mod models;
mod transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting WhatsApp Admissions Assistant");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Load the program catalog; a failed load degrades replies, it does not
    // stop the service.
    let catalog = match catalog::Catalog::load(&config.catalog_path) {
        Ok(catalog) => Some(Arc::new(catalog)),
        Err(err) => {
            error!(error = %err, path = %config.catalog_path, "catalog load failed, starting degraded");
            None
        }
    };

    let pipeline_metrics = metrics::Metrics::register()?;

    let generator = Arc::new(agents::generator::GeminiGenerator::new(&config)?);
    let delivery = Arc::new(transport::TwilioClient::new(&config)?);
    let handler = Arc::new(agents::handler::MessageHandler::new(
        catalog.clone(),
        generator,
        pipeline_metrics.clone(),
    ));

    // Build API routes
    let api_routes =
        api::routes(handler, delivery, pipeline_metrics.clone()).with(warp::log("api"));

    // Root banner route
    let root = warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "message": "WhatsApp Admissions Assistant is running",
            "status": "healthy",
        }))
    });

    // Health check route
    let programs_loaded = catalog.as_ref().map(|c| c.len()).unwrap_or(0);
    let catalog_ready = catalog.is_some();
    let generator_configured = !config.google_api_key.is_empty();
    let transport_configured =
        !config.twilio_account_sid.is_empty() && !config.twilio_auth_token.is_empty();
    let health = warp::path("health").and(warp::get()).map(move || {
        warp::reply::json(&models::HealthStatus {
            status: if catalog_ready { "healthy" } else { "degraded" },
            programs_loaded,
            catalog_ready,
            generator_configured,
            transport_configured,
        })
    });

    // Metrics route
    let metrics_route = warp::path("metrics").and(warp::get()).map(|| {
        use prometheus::{Encoder, TextEncoder};
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer).unwrap();
        warp::reply::with_header(buffer, "Content-Type", encoder.format_type())
    });

    let routes = root
        .or(health)
        .or(metrics_route)
        .or(api_routes)
        .recover(error::handle_rejection);

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
