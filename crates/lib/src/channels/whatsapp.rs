//! WhatsApp Cloud API channel: send text messages via the Graph API.

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v17.0";

/// Outbound WhatsApp connector: delivers replies through the Cloud API
/// messages endpoint of the configured phone number.
#[derive(Clone)]
pub struct WhatsAppChannel {
    token: String,
    phone_number_id: String,
    api_base: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(
        token: impl Into<String>,
        phone_number_id: impl Into<String>,
        api_base: Option<String>,
    ) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| GRAPH_API_BASE.to_string());
        Self {
            token: token.into(),
            phone_number_id: phone_number_id.into(),
            api_base,
            client: reqwest::Client::new(),
        }
    }

    /// Send a text message to a recipient phone number. One attempt, no retry.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), String> {
        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body }
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("send failed: {} {}", status, body));
        }
        Ok(())
    }
}
