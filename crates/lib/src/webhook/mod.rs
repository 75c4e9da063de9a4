//! Webhook endpoint: subscription handshake, delivery processing, health.
//!
//! One axum server on a single port. Delivery processing is strictly
//! sequential per message; upstream failures are logged and swallowed so the
//! platform always gets its 200.

mod payload;
mod server;

pub use payload::{Change, ChangeValue, Entry, InboundMessage, Metadata, TextBody, WebhookEvent};
pub use server::{run_server, AppState};
