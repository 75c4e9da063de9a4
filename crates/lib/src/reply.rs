//! Reply decision: a templated hours answer or a prompt for the generative model.
//!
//! `decide` is a pure function of the inbound text and the business context.
//! There are exactly two outcomes: an hours inquiry with configured hours gets
//! a fixed-format answer, everything else gets a prompt for the model.

use crate::store::Business;

/// Hours used when the business has none configured.
pub const DEFAULT_HORARIOS: &str = "Lun a Vie 9-18";

/// Lowercased tokens that mark an hours inquiry ("horarios", "abre", "abren", ...).
const HOURS_KEYWORDS: &[&str] = &["horari", "abre", "abren"];

/// Business context interpolated into replies and prompts.
#[derive(Debug, Clone)]
pub struct BusinessContext {
    pub horarios: String,
    pub direccion: String,
    pub info: String,
}

impl BusinessContext {
    /// Context from a looked-up business row; absent row or blank fields fall
    /// back to defaults (default hours, empty address and extra info).
    pub fn from_business(business: Option<&Business>) -> Self {
        let field = |v: Option<&String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_default()
        };
        let horarios = field(business.and_then(|b| b.horarios.as_ref()));
        Self {
            horarios: if horarios.is_empty() {
                DEFAULT_HORARIOS.to_string()
            } else {
                horarios
            },
            direccion: field(business.and_then(|b| b.direccion.as_ref())),
            info: field(business.and_then(|b| b.info.as_ref())),
        }
    }
}

/// The decided reply: either a ready-made text or a prompt to run through the
/// generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAction {
    /// Direct string interpolation, no external call needed.
    Templated(String),
    /// Prompt for the text-generation service.
    Generate(String),
}

/// Case-insensitive keyword test for an hours inquiry.
fn is_hours_inquiry(text: &str) -> bool {
    let lowered = text.to_lowercase();
    HOURS_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Decide the reply for an inbound text. Hours inquiries with configured hours
/// get the templated answer; everything else goes to the model.
pub fn decide(text: &str, ctx: &BusinessContext) -> ReplyAction {
    if is_hours_inquiry(text) && !ctx.horarios.is_empty() {
        ReplyAction::Templated(format!(
            "Hola 👋 Estamos abiertos {}. ¿Querés reservar?",
            ctx.horarios
        ))
    } else {
        ReplyAction::Generate(build_prompt(text, ctx))
    }
}

/// Prompt embedding the business data and the customer's question verbatim.
pub fn build_prompt(text: &str, ctx: &BusinessContext) -> String {
    format!(
        "Eres un asistente de un comercio. Datos:\n- Horarios: {}\n- Dirección: {}\n- Info extra: {}\nCliente pregunta: \"{}\"\nResponde en español, breve y con tono cercano.",
        ctx.horarios, ctx.direccion, ctx.info, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(horarios: &str) -> BusinessContext {
        BusinessContext {
            horarios: horarios.to_string(),
            direccion: "Av. Corrientes 1234".to_string(),
            info: "Aceptamos tarjetas".to_string(),
        }
    }

    #[test]
    fn hours_inquiry_with_hours_is_templated() {
        let action = decide("¿Cuáles son sus horarios?", &ctx("Lun a Sab 10-20"));
        assert_eq!(
            action,
            ReplyAction::Templated(
                "Hola 👋 Estamos abiertos Lun a Sab 10-20. ¿Querés reservar?".to_string()
            )
        );
    }

    #[test]
    fn hours_inquiry_is_case_insensitive() {
        let action = decide("¿A qué hora ABREN mañana?", &ctx("9 a 18"));
        assert!(matches!(action, ReplyAction::Templated(t) if t.contains("9 a 18")));
    }

    #[test]
    fn abre_token_matches() {
        assert!(matches!(
            decide("cuando abre el local", &ctx("9-18")),
            ReplyAction::Templated(_)
        ));
    }

    #[test]
    fn other_text_goes_to_the_model_with_verbatim_question() {
        let text = "¿Tienen menú vegetariano?";
        match decide(text, &ctx("9-18")) {
            ReplyAction::Generate(prompt) => {
                assert!(prompt.contains(text));
                assert!(prompt.contains("9-18"));
                assert!(prompt.contains("Av. Corrientes 1234"));
                assert!(prompt.contains("Aceptamos tarjetas"));
            }
            other => panic!("expected Generate, got {:?}", other),
        }
    }

    #[test]
    fn hours_inquiry_without_hours_goes_to_the_model() {
        let action = decide("¿Cuáles son sus horarios?", &ctx(""));
        assert!(matches!(action, ReplyAction::Generate(p) if p.contains("horarios")));
    }

    #[test]
    fn context_defaults_when_no_business() {
        let ctx = BusinessContext::from_business(None);
        assert_eq!(ctx.horarios, DEFAULT_HORARIOS);
        assert!(ctx.direccion.is_empty());
        assert!(ctx.info.is_empty());
    }

    #[test]
    fn context_defaults_when_fields_blank() {
        let business = crate::store::Business {
            id: Some(3),
            horarios: Some("  ".to_string()),
            direccion: None,
            info: Some("WiFi gratis".to_string()),
        };
        let ctx = BusinessContext::from_business(Some(&business));
        assert_eq!(ctx.horarios, DEFAULT_HORARIOS);
        assert!(ctx.direccion.is_empty());
        assert_eq!(ctx.info, "WiFi gratis");
    }
}
