use serde::{Deserialize, Serialize};

/// One academic program as loaded from the catalog file.
///
/// Records are immutable after load; the catalog keeps them in file order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramRecord {
    pub name: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

/// A catalog record paired with its relevance score for one query.
///
/// Lives only within a single retrieval call; higher score is more relevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub record: ProgramRecord,
    pub score: u32,
}

/// An inbound chat message as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
}

/// The reply produced by the message handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
}

/// Twilio webhook form body (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct WhatsappForm {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
}

impl From<WhatsappForm> for InboundMessage {
    fn from(form: WhatsappForm) -> Self {
        InboundMessage {
            sender_id: form.from,
            text: form.body,
        }
    }
}

/// Payload for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub programs_loaded: usize,
    pub catalog_ready: bool,
    pub generator_configured: bool,
    pub transport_configured: bool,
}
