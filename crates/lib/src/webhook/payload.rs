//! WhatsApp webhook delivery payload (entry → changes → value → messages).
//!
//! Only the fields this service reads are modeled; everything else in the
//! event is ignored. All containers default to empty so a sparse payload
//! parses cleanly.

use serde::Deserialize;

/// Top-level webhook event envelope.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

/// Change metadata; `phone_number_id` selects the business configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub phone_number_id: String,
}

/// One inbound customer message.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    /// Customer phone number.
    pub from: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

impl InboundMessage {
    /// Text body, empty for non-text messages.
    pub fn text_body(&self) -> &str {
        self.text.as_ref().map(|t| t.body.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_delivery_event() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "object": "whatsapp_business_account",
                "entry": [{
                    "id": "1",
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "metadata": { "display_phone_number": "5491160000000", "phone_number_id": "111222" },
                            "messages": [
                                { "from": "5491144444444", "id": "wamid.A", "type": "text", "text": { "body": "hola" } }
                            ]
                        }
                    }]
                }]
            }"#,
        )
        .expect("parse");
        let change = &event.entry[0].changes[0];
        assert_eq!(
            change.value.metadata.as_ref().map(|m| m.phone_number_id.as_str()),
            Some("111222")
        );
        assert_eq!(change.value.messages[0].from, "5491144444444");
        assert_eq!(change.value.messages[0].text_body(), "hola");
    }

    #[test]
    fn empty_event_parses_to_no_entries() {
        let event: WebhookEvent = serde_json::from_str("{}").expect("parse");
        assert!(event.entry.is_empty());
    }

    #[test]
    fn non_text_message_has_empty_body() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"from": "549", "type": "image"}"#).expect("parse");
        assert_eq!(msg.text_body(), "");
    }
}
