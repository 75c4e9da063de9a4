//! Outbound channels (WhatsApp Cloud API).
//!
//! Inbound flows through the webhook endpoint; this module only sends.

mod whatsapp;

pub use whatsapp::WhatsAppChannel;
