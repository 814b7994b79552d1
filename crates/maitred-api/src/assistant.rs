//! The per-turn engine behind `POST /api/assistant`.
//!
//! Each inbound message is handled by one invocation: resolve the
//! session, run the configured booking strategy, and emit an ordered
//! sequence of [`StreamEvent`]s into the response channel. The stream
//! always opens with the session announcement and always terminates with
//! `Done`, including on validation failures; once streaming has begun,
//! upstream errors become an apology chunk, never an HTTP status.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use maitred_chat::{advance, clean_text, normalize_whitespace, GuidedReply, Session};
use maitred_core::types::{BookingStrategy, ChatMessage};
use maitred_core::StreamEvent;

use crate::state::AppState;
use crate::stream::chunk_text;

/// User-visible text when the language model is unavailable or fails.
pub const FALLBACK_TEXT: &str =
    "Sorry, the assistant is having trouble right now. Please try again later.";

/// User-visible text when the message exceeds the configured length.
pub const TOO_LONG_TEXT: &str =
    "That message is a bit long for me. Could you shorten it and try again?";

/// Run one conversation turn, writing events into `tx`.
///
/// Send failures mean the client disconnected; the turn is simply
/// abandoned (there is no cancellation signal beyond the closed channel).
pub async fn run_turn(
    state: AppState,
    requested: Option<Uuid>,
    message: String,
    tx: mpsc::Sender<StreamEvent>,
) {
    let session_id = requested.unwrap_or_else(Uuid::new_v4);

    // The session announcement is always the first frame.
    if !send(&tx, StreamEvent::SessionAssigned { session_id }).await {
        return;
    }

    // Whitespace-only normalization: punctuation respacing would corrupt
    // the tokens the field extractors capture (email domains, decimals).
    let cleaned = normalize_whitespace(&message);
    tracing::debug!(session_id = %session_id, message = %cleaned, "Turn started");

    if cleaned.is_empty() {
        send(&tx, StreamEvent::Done).await;
        return;
    }
    if cleaned.chars().count() > state.config.chat.max_message_length {
        send_text(&state, &tx, TOO_LONG_TEXT).await;
        send(&tx, StreamEvent::Done).await;
        return;
    }

    let session = match state.store.get_or_create(session_id) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Session load failed");
            send_text(&state, &tx, FALLBACK_TEXT).await;
            send(&tx, StreamEvent::Done).await;
            return;
        }
    };

    match state.config.chat.strategy {
        BookingStrategy::Guided => guided_turn(&state, session, &cleaned, &tx).await,
        BookingStrategy::Extraction => extraction_turn(&state, session, &cleaned, &tx).await,
    }

    send(&tx, StreamEvent::Done).await;
}

/// One turn of the guided step machine.
async fn guided_turn(
    state: &AppState,
    mut session: Session,
    message: &str,
    tx: &mpsc::Sender<StreamEvent>,
) {
    match advance(&mut session, message) {
        GuidedReply::Prompt(prompt) => {
            if let Err(e) = state.store.save(&session) {
                tracing::warn!(session_id = %session.id, error = %e, "Session save failed");
            }
            send_text(state, tx, &clean_text(&prompt)).await;
        }

        GuidedReply::FreeChat => {
            session.history.push(ChatMessage::user(message));
            if let Some(reply) = stream_llm_reply(state, &session.history, tx).await {
                session.history.push(ChatMessage::assistant(reply));
            }
            if let Err(e) = state.store.save(&session) {
                tracing::warn!(session_id = %session.id, error = %e, "Session save failed");
            }
        }

        GuidedReply::Closed {
            confirmation,
            booking,
        } => {
            // Fire-and-forget persistence: the user's confirmation is not
            // contingent on the writes, and the session resets regardless.
            if booking.is_complete() {
                let saver = Arc::clone(&state.saver);
                let session_id = session.id;
                tokio::spawn(async move {
                    let outcome = saver.save(&booking).await;
                    tracing::info!(
                        session_id = %session_id,
                        calendar = outcome.calendar,
                        sheet = outcome.sheet,
                        "Booking persistence finished"
                    );
                });
            } else {
                tracing::warn!(session_id = %session.id, "Booking closed incomplete, not persisted");
            }

            if let Err(e) = state.store.reset(session.id) {
                tracing::warn!(session_id = %session.id, error = %e, "Session reset failed");
            }
            // Sent verbatim: the summary embeds user data (email addresses)
            // that punctuation respacing would corrupt.
            send_text(state, tx, &confirmation).await;
        }
    }
}

/// One turn of the extraction strategy: stream a free-form reply, then
/// hand the recent history to the extraction call. The session is
/// retained indefinitely; there is no terminal step.
async fn extraction_turn(
    state: &AppState,
    mut session: Session,
    message: &str,
    tx: &mpsc::Sender<StreamEvent>,
) {
    session.history.push(ChatMessage::user(message));

    let Some(reply) = stream_llm_reply(state, &session.history, tx).await else {
        if let Err(e) = state.store.save(&session) {
            tracing::warn!(session_id = %session.id, error = %e, "Session save failed");
        }
        return;
    };

    session.history.push(ChatMessage::assistant(reply));
    if let Err(e) = state.store.save(&session) {
        tracing::warn!(session_id = %session.id, error = %e, "Session save failed");
    }

    // At most one extraction attempt per turn; "not yet complete" just
    // means the conversation continues.
    let Some(extractor) = &state.extractor else {
        return;
    };
    let Some(booking) = extractor.extract(&session.history).await else {
        tracing::debug!(session_id = %session.id, "Booking not yet complete");
        return;
    };

    tracing::info!(session_id = %session.id, "Booking complete, persisting");
    let outcome = state.saver.save(&booking).await;
    if outcome.any_succeeded() {
        send(tx, StreamEvent::BookingSaved).await;
    }
}

/// Stream an assistant reply for the given history, forwarding fragments
/// as they arrive. Returns the accumulated reply text, or `None` when the
/// model was unavailable or failed (after emitting the apology frame).
async fn stream_llm_reply(
    state: &AppState,
    history: &[ChatMessage],
    tx: &mpsc::Sender<StreamEvent>,
) -> Option<String> {
    let Some(client) = &state.llm else {
        tracing::warn!("No language model configured, sending fallback");
        send_text(state, tx, FALLBACK_TEXT).await;
        return None;
    };

    let mut rx = match client.stream(history).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!(error = %e, "Chat completion call failed");
            send_text(state, tx, FALLBACK_TEXT).await;
            return None;
        }
    };

    let mut reply = String::new();
    while let Some(item) = rx.recv().await {
        match item {
            Ok(fragment) => {
                reply.push_str(&fragment);
                if !send(tx, StreamEvent::Chunk(fragment)).await {
                    return None;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat completion stream failed mid-turn");
                send_text(state, tx, FALLBACK_TEXT).await;
                return None;
            }
        }
    }
    Some(reply)
}

/// Send fixed text as a sequence of fixed-size chunks.
async fn send_text(state: &AppState, tx: &mpsc::Sender<StreamEvent>, text: &str) {
    for chunk in chunk_text(text, state.config.chat.chunk_size) {
        if !send(tx, StreamEvent::Chunk(chunk)).await {
            return;
        }
    }
}

/// Returns false when the receiver is gone (client disconnected).
async fn send(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
