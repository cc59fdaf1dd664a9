//! Chat assistant transcript and upstream plumbing.
//!
//! The transcript lives in application state, seeded with the assistant's
//! greeting. Replies come from the chatbot endpoints; when a request fails
//! the bot answers with an apology line instead of erroring the view, so
//! the chat never shows the error panel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::client::ApiClient;

/// Municipality assumed for questions that don't name one.
const DEFAULT_MUNICIPIO: &str = "BUCARAMANGA";

const GREETING: &str = "¡Hola! Soy tu asistente de seguridad. Puedo ayudarte con información sobre delitos en Santander.";
const ASK_FALLBACK: &str = "Lo siento, no pude obtener una respuesta.";
const ASK_ERROR: &str =
    "Disculpa, hubo un error al procesar tu pregunta. Por favor, intenta de nuevo.";
const QUICK_FALLBACK: &str = "No encontré información disponible.";
const QUICK_ERROR: &str =
    "Disculpa, hubo un error al consultar los datos. Por favor, intenta de nuevo.";

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// The running transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh transcript, seeded with the greeting.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
        };
        conversation.push(Sender::Bot, GREETING);
        conversation
    }

    fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.messages.push(Message {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }
}

/// Transcript label for a canned quick question.
///
/// Unknown kinds echo as themselves.
pub fn quick_label(kind: &str) -> &str {
    match kind {
        "tendencias" => "Mostrar tendencias de delitos",
        "recomendaciones" => "Obtener recomendaciones de seguridad",
        "resumen" => "Ver resumen de datos",
        other => other,
    }
}

/// Ask the assistant a free-text question, appending both sides to the
/// transcript.
pub async fn ask(
    client: &ApiClient,
    conversation: &mut Conversation,
    pregunta: &str,
    municipio: Option<&str>,
    delito: Option<&str>,
) {
    conversation.push(Sender::User, pregunta);

    let municipio = municipio.or(Some(DEFAULT_MUNICIPIO));
    let reply = match client.chatbot_ask(pregunta, municipio, delito).await {
        Ok(reply) => reply
            .into_text()
            .unwrap_or_else(|| ASK_FALLBACK.to_string()),
        Err(error) => {
            warn!(error = %error, "Chatbot ask failed");
            ASK_ERROR.to_string()
        }
    };

    conversation.push(Sender::Bot, reply);
}

/// Ask one of the canned quick questions.
pub async fn quick(
    client: &ApiClient,
    conversation: &mut Conversation,
    kind: &str,
    municipio: Option<&str>,
) {
    conversation.push(Sender::User, quick_label(kind));

    let municipio = municipio.or(Some(DEFAULT_MUNICIPIO));
    let reply = match client.chatbot_quick(kind, municipio).await {
        Ok(reply) => reply
            .into_text()
            .unwrap_or_else(|| QUICK_FALLBACK.to_string()),
        Err(error) => {
            warn!(kind = %kind, error = %error, "Chatbot quick question failed");
            QUICK_ERROR.to_string()
        }
    };

    conversation.push(Sender::Bot, reply);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_seeded_with_greeting() {
        let conversation = Conversation::new();

        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].sender, Sender::Bot);
        assert!(conversation.messages[0].text.contains("asistente de seguridad"));
    }

    #[test]
    fn test_quick_labels() {
        assert_eq!(quick_label("tendencias"), "Mostrar tendencias de delitos");
        assert_eq!(quick_label("resumen"), "Ver resumen de datos");
        assert_eq!(quick_label("situacion"), "situacion");
    }
}
