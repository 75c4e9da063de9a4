//! Generative reply client (OpenAI chat completions).

mod openai;

pub use openai::{
    ChatResponse, OpenAiClient, OpenAiError, EMPTY_REPLY_FALLBACK, ERROR_REPLY_FALLBACK,
};
