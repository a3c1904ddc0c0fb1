use axum::{extract::State, Json};

use crate::conversation::service::{InboundMessage, OutboundMessage};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/bot/messages
///
/// Single entry point for chat transports. Accepts one inbound message
/// and returns the ordered list of replies to deliver back to the chat.
pub async fn handle_bot_message(
    State(state): State<AppState>,
    Json(msg): Json<InboundMessage>,
) -> Result<Json<Vec<OutboundMessage>>, AppError> {
    let replies = state.conversation.handle_message(msg).await?;
    Ok(Json(replies))
}
