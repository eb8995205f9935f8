//! Outbound delivery through the Twilio REST API, plus the TwiML fallback
//! used when the REST send fails and the reply has to ride the webhook
//! response instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::DeliveryError;

/// Boundary for outbound message delivery; returns the provider message id.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError>;
}

pub struct TwilioClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.twilio_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_whatsapp_number.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl MessageDelivery for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let form = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                code: status.as_u16(),
            });
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| DeliveryError::Malformed(e.to_string()))?;

        debug!(sid = %resource.sid, "message delivered");
        Ok(resource.sid)
    }
}

/// Render a reply as a TwiML `<Response><Message>` document, for returning
/// the message in the webhook response body when REST delivery fails.
pub fn twiml_message(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        xml_escape(body)
    )
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twiml_wraps_the_message_body() {
        let xml = twiml_message("BBA runs four years.");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Response><Message>BBA runs four years.</Message></Response>"
        );
    }

    #[test]
    fn twiml_escapes_markup_characters() {
        let xml = twiml_message("Fees < 50k & scholarships > none");
        assert!(xml.contains("Fees &lt; 50k &amp; scholarships &gt; none"));
        assert!(!xml.contains("< 50k"));
    }

    #[test]
    fn twiml_escapes_quotes() {
        let xml = twiml_message(r#"the "flagship" program's intake"#);
        assert!(xml.contains("the &quot;flagship&quot; program&apos;s intake"));
    }
}
