//! Per-message orchestration: retrieve, format, generate, and always reply.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agents::{formatter, generator::AnswerGenerator, retriever};
use crate::catalog::Catalog;
use crate::metrics::Metrics;
use crate::models::{InboundMessage, OutboundMessage};

/// How many catalog records are passed to the generation prompt.
pub const RETRIEVAL_LIMIT: usize = 3;

pub const EMPTY_QUERY_REPLY: &str = "Please send a question about our programs, for example: \
\"Tell me about BS Computer Science\".";

pub const SERVICE_UNAVAILABLE_REPLY: &str = "The admissions assistant is temporarily \
unavailable. Please try again later or contact the university directly.";

pub const GENERATION_FALLBACK_REPLY: &str = "I apologize, but I'm experiencing technical \
difficulties. Please try again later or contact the university directly for assistance.";

/// Drives the pipeline for one inbound message. Every failure inside the
/// pipeline maps to a fixed fallback reply; `handle` itself cannot fail.
pub struct MessageHandler {
    catalog: Option<Arc<Catalog>>,
    generator: Arc<dyn AnswerGenerator>,
    metrics: Metrics,
}

impl MessageHandler {
    /// `catalog` is `None` when the startup load failed; the handler then
    /// serves the fixed service-unavailable reply until restart.
    pub fn new(
        catalog: Option<Arc<Catalog>>,
        generator: Arc<dyn AnswerGenerator>,
        metrics: Metrics,
    ) -> Self {
        Self {
            catalog,
            generator,
            metrics,
        }
    }

    pub async fn handle(&self, inbound: &InboundMessage) -> OutboundMessage {
        self.metrics.messages_received.inc();
        let request_id = Uuid::new_v4();

        let query = inbound.text.trim();
        if query.is_empty() {
            info!(%request_id, sender = %inbound.sender_id, "empty query, replying with prompt");
            return OutboundMessage {
                text: EMPTY_QUERY_REPLY.to_string(),
            };
        }

        let catalog = match &self.catalog {
            Some(catalog) => catalog,
            None => {
                warn!(%request_id, "catalog unavailable, serving degraded reply");
                return OutboundMessage {
                    text: SERVICE_UNAVAILABLE_REPLY.to_string(),
                };
            }
        };

        let matches = retriever::search(query, catalog, RETRIEVAL_LIMIT);
        if matches.is_empty() {
            self.metrics.retrievals_empty.inc();
        }
        info!(%request_id, matches = matches.len(), "retrieval finished");

        let context = formatter::format_context(&matches);

        match self.generator.generate(query, &context).await {
            Ok(text) => {
                info!(%request_id, "generation finished");
                OutboundMessage { text }
            }
            Err(err) => {
                error!(%request_id, error = %err, "generation failed, serving fallback");
                self.metrics.generation_failures.inc();
                OutboundMessage {
                    text: GENERATION_FALLBACK_REPLY.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::models::ProgramRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockGenerator {
        reply: Result<String, ()>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockGenerator {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerGenerator for MockGenerator {
        async fn generate(&self, query: &str, context: &str) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), context.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GenerationError::Timeout),
            }
        }
    }

    fn fixture_catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_records(vec![
            ProgramRecord {
                name: "BS Computer Science".to_string(),
                level: "undergraduate".to_string(),
                faculty: "Faculty of Sciences".to_string(),
                duration: "4 years".to_string(),
                description: "Programming and software systems.".to_string(),
            },
            ProgramRecord {
                name: "BBA".to_string(),
                level: "undergraduate".to_string(),
                faculty: "Faculty of Business".to_string(),
                duration: "4 years".to_string(),
                description: "Business administration.".to_string(),
            },
        ]))
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            sender_id: "whatsapp:+15550001111".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn matched_context_reaches_the_generator() {
        let generator = MockGenerator::answering("CS is a four year program.");
        let handler = MessageHandler::new(
            Some(fixture_catalog()),
            generator.clone(),
            Metrics::unregistered(),
        );

        let reply = handler
            .handle(&inbound("Tell me about BS Computer Science"))
            .await;

        assert_eq!(reply.text, "CS is a four year program.");
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Tell me about BS Computer Science");
        assert!(calls[0].1.contains("BS Computer Science"));
        assert!(calls[0].1.contains("Faculty of Sciences"));
    }

    #[tokio::test]
    async fn empty_query_short_circuits() {
        let generator = MockGenerator::answering("never used");
        let handler = MessageHandler::new(
            Some(fixture_catalog()),
            generator.clone(),
            Metrics::unregistered(),
        );

        let reply = handler.handle(&inbound("   ")).await;

        assert_eq!(reply.text, EMPTY_QUERY_REPLY);
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_maps_to_the_fallback() {
        let generator = MockGenerator::failing();
        let handler = MessageHandler::new(
            Some(fixture_catalog()),
            generator,
            Metrics::unregistered(),
        );

        let reply = handler.handle(&inbound("Tell me about BBA")).await;

        assert_eq!(reply.text, GENERATION_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn missing_catalog_serves_the_degraded_reply() {
        let generator = MockGenerator::answering("never used");
        let handler = MessageHandler::new(None, generator.clone(), Metrics::unregistered());

        let reply = handler.handle(&inbound("Tell me about BBA")).await;

        assert_eq!(reply.text, SERVICE_UNAVAILABLE_REPLY);
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn unmatched_query_still_generates_with_the_sentinel_context() {
        let generator = MockGenerator::answering("I do not have that information.");
        let handler = MessageHandler::new(
            Some(fixture_catalog()),
            generator.clone(),
            Metrics::unregistered(),
        );

        let reply = handler.handle(&inbound("scholarships for astrophysics")).await;

        assert_eq!(reply.text, "I do not have that information.");
        let calls = generator.calls();
        assert_eq!(calls[0].1, formatter::EMPTY_CONTEXT);
    }
}
