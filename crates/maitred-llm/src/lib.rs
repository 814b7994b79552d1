//! Language-model integration for maitred.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint over HTTP,
//! both single-shot (booking extraction) and token-streaming (assistant
//! replies). The protocol itself is consumed, never reimplemented: this
//! crate only shapes payloads and reads responses.

pub mod client;
pub mod error;
pub mod extract;

pub use client::ChatClient;
pub use error::LlmError;
pub use extract::BookingExtractor;
