//! Embedded web assets for maitred.

pub mod chat;

pub use chat::CHAT_HTML;
