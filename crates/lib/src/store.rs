//! Supabase PostgREST client: business lookup and message inserts.
//!
//! Both calls are best-effort from the webhook's point of view; errors are
//! returned to the caller, which logs and carries on.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("supabase request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("supabase api error: {0}")]
    Api(String),
}

/// Business profile row, keyed by WhatsApp phone number id.
#[derive(Debug, Clone, Deserialize)]
pub struct Business {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub horarios: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// Append-only record of one inbound message and the reply produced for it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub business_id: Option<i64>,
    pub from_number: String,
    pub text: String,
    pub response: String,
    pub direction: String,
}

impl MessageRecord {
    pub fn inbound(
        business_id: Option<i64>,
        from_number: impl Into<String>,
        text: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            business_id,
            from_number: from_number.into(),
            text: text.into(),
            response: response.into(),
            direction: "inbound".to_string(),
        }
    }
}

/// Client for the Supabase REST (PostgREST) interface.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    /// Look up the business row for a phone number id. `Ok(None)` when no row
    /// matches; errors only on transport failure or a non-success response.
    pub async fn fetch_business(
        &self,
        phone_number_id: &str,
    ) -> Result<Option<Business>, StoreError> {
        let url = format!("{}/rest/v1/businesses", self.base_url);
        let res = self
            .request(reqwest::Method::GET, &url)
            .query(&[
                ("phone_number_id", format!("eq.{}", phone_number_id)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("{} {}", status, body)));
        }
        let rows: Vec<Business> = res.json().await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one message record. No update or delete path exists.
    pub async fn insert_message(&self, record: &MessageRecord) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/messages", self.base_url);
        let res = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_record_has_fixed_direction() {
        let r = MessageRecord::inbound(Some(7), "549111", "hola", "buenas!");
        assert_eq!(r.direction, "inbound");
        assert_eq!(r.business_id, Some(7));
    }

    #[test]
    fn business_row_tolerates_missing_fields() {
        let b: Business = serde_json::from_str(r#"{"id": 12}"#).expect("parse");
        assert_eq!(b.id, Some(12));
        assert!(b.horarios.is_none());
    }
}
