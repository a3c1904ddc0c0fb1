//! Transport-free conversation service: one inbound message in, a list
//! of outbound messages back. Owns the load-transition-save cycle, the
//! per-chat gate, the restart commands, and the hand-off to the
//! finalization pipeline. Any chat transport (HTTP gateway, Telegram
//! poller) is an adapter in front of this.

use std::sync::Arc;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::conversation::machine::{self, Transition};
use crate::conversation::session::Session;
use crate::conversation::steps::Step;
use crate::conversation::store::{SessionGate, SessionStore};
use crate::conversation::validators;
use crate::document::preview::render_preview;
use crate::errors::AppError;
use crate::resumes::finalize::{Delivery, FinalizePipeline};
use crate::storage::{ArtifactStore, DEFAULT_LINK_TTL};

const GREETING: &str = "Hi! I'll help you put together a resume. You can restart anytime with /create.";
const FINALIZE_FAILED: &str = "Something went wrong while building your resume";
const UPLOAD_REPLY: &str = "File uploaded. The link is valid for 10 minutes:";

#[derive(Debug, Clone, Deserialize)]
pub struct InboundAttachment {
    pub filename: String,
    /// Base64-encoded file body.
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Chat identifier on the wire. One session per chat.
    #[serde(rename = "session_id")]
    pub chat_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachment: Option<InboundAttachment>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_link: Option<String>,
}

impl OutboundMessage {
    fn text_only(text: impl Into<String>) -> Self {
        OutboundMessage {
            text: text.into(),
            quick_replies: Vec::new(),
            attachment_link: None,
        }
    }

    fn for_step(step: Step) -> Self {
        let spec = step.spec();
        OutboundMessage {
            text: spec.prompt.to_string(),
            quick_replies: spec.quick_replies.iter().map(|s| s.to_string()).collect(),
            attachment_link: None,
        }
    }
}

pub struct ConversationService {
    sessions: Arc<dyn SessionStore>,
    gate: SessionGate,
    finalize: FinalizePipeline,
    artifacts: Arc<dyn ArtifactStore>,
}

impl ConversationService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        finalize: FinalizePipeline,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        ConversationService {
            sessions,
            gate: SessionGate::new(),
            finalize,
            artifacts,
        }
    }

    /// Handles one inbound message. Per-chat handling is serialized by
    /// the gate, so two racing messages from one chat never interleave
    /// their load-transition-save cycles.
    pub async fn handle_message(
        &self,
        msg: InboundMessage,
    ) -> Result<Vec<OutboundMessage>, AppError> {
        let _guard = self.gate.acquire(&msg.chat_id).await;

        if let Some(attachment) = &msg.attachment {
            return self.handle_upload(&msg.chat_id, attachment).await;
        }

        let text = msg.text.unwrap_or_default();

        if validators::is_restart_command(&text) {
            return self.restart(&msg.chat_id).await;
        }

        let session = self.sessions.load(&msg.chat_id).await?;
        let Some(mut session) = session else {
            // No active session for this chat: start one instead of
            // guessing what the text was meant to answer.
            return self.restart(&msg.chat_id).await;
        };

        match machine::apply(&mut session, &text) {
            Transition::Stay { message } => {
                let step = session.current_step;
                self.sessions.save(&session).await?;
                let mut reply = OutboundMessage::for_step(step);
                reply.text = message;
                Ok(vec![reply])
            }
            Transition::Next { step } => {
                self.sessions.save(&session).await?;
                if step == Step::Preview {
                    Ok(vec![
                        OutboundMessage::text_only(render_preview(&session.draft)),
                        OutboundMessage::for_step(step),
                    ])
                } else {
                    Ok(vec![OutboundMessage::for_step(step)])
                }
            }
            Transition::Finalize { format } => {
                let outcome = self
                    .finalize
                    .finalize(&msg.chat_id, &session.draft, format)
                    .await;
                // The session ends here no matter what happened above.
                self.sessions.delete(&msg.chat_id).await?;

                match outcome {
                    Ok(outcome) => {
                        info!(
                            chat_id = %msg.chat_id,
                            resume_id = %outcome.resume_id,
                            "Session finalized"
                        );
                        Ok(vec![match outcome.delivery {
                            Delivery::Link {
                                download_url,
                                expires_in_secs,
                            } => OutboundMessage {
                                text: format!(
                                    "Your resume is ready! The link is valid for {} minutes:",
                                    expires_in_secs / 60
                                ),
                                quick_replies: Vec::new(),
                                attachment_link: Some(download_url),
                            },
                            Delivery::Failed { reason } => OutboundMessage::text_only(format!(
                                "{FINALIZE_FAILED}: {reason}"
                            )),
                        }])
                    }
                    Err(e) => {
                        error!(chat_id = %msg.chat_id, "Finalization failed: {e}");
                        Ok(vec![OutboundMessage::text_only(format!(
                            "{FINALIZE_FAILED}. Your answers were not saved; you can start over with /create."
                        ))])
                    }
                }
            }
        }
    }

    /// Discards any in-progress session and starts a fresh one.
    async fn restart(&self, chat_id: &str) -> Result<Vec<OutboundMessage>, AppError> {
        self.sessions.delete(chat_id).await?;
        let session = Session::new(chat_id);
        self.sessions.save(&session).await?;
        info!(chat_id = %chat_id, "Session started");
        Ok(vec![
            OutboundMessage::text_only(GREETING),
            OutboundMessage::for_step(session.current_step),
        ])
    }

    /// Direct-upload shortcut: an attached document bypasses the guided
    /// flow and lands in the artifact store under the chat's folder.
    async fn handle_upload(
        &self,
        chat_id: &str,
        attachment: &InboundAttachment,
    ) -> Result<Vec<OutboundMessage>, AppError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&attachment.data)
            .map_err(|e| AppError::Validation(format!("Attachment is not valid base64: {e}")))?;

        let key = format!("user_{chat_id}/{}", attachment.filename);
        self.artifacts
            .put(&key, bytes.into(), "application/octet-stream")
            .await?;
        let link = self.artifacts.presigned_link(&key, DEFAULT_LINK_TTL).await?;

        Ok(vec![OutboundMessage {
            text: UPLOAD_REPLY.to_string(),
            quick_replies: Vec::new(),
            attachment_link: Some(link),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::store::InMemorySessionStore;
    use crate::render::RenderFormat;
    use crate::resumes::finalize::test_support::{FakeArtifactStore, FakeRenderer, FakeRepo};
    use std::sync::atomic::Ordering;

    struct Harness {
        service: ConversationService,
        sessions: Arc<InMemorySessionStore>,
        repo: Arc<FakeRepo>,
        renderer: Arc<FakeRenderer>,
    }

    fn make_harness(renderer: FakeRenderer) -> Harness {
        let sessions = Arc::new(InMemorySessionStore::new());
        let repo = Arc::new(FakeRepo::default());
        let renderer = Arc::new(renderer);
        let artifacts: Arc<FakeArtifactStore> = Arc::new(FakeArtifactStore::default());
        let finalize = FinalizePipeline::new(repo.clone(), renderer.clone(), artifacts.clone());
        Harness {
            service: ConversationService::new(sessions.clone(), finalize, artifacts),
            sessions,
            repo,
            renderer,
        }
    }

    fn text_msg(text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: "chat-1".to_string(),
            text: Some(text.to_string()),
            attachment: None,
        }
    }

    async fn send(harness: &Harness, text: &str) -> Vec<OutboundMessage> {
        harness
            .service
            .handle_message(text_msg(text))
            .await
            .expect("handle_message failed")
    }

    const HAPPY_PATH: &[&str] = &[
        "Alice",
        "Engineer",
        "alice@example.com",
        "+1 555 0100",
        "Berlin",
        "github.com/alice",
        "I build backends.",
        "Rust, SQL",
        "yes",
        "Acme",
        "Dev",
        "2020 — 2024",
        "Shipped things",
        "finish",
        "no",
        "English",
        "no",
        "confirm",
    ];

    #[tokio::test]
    async fn test_restart_command_creates_fresh_session() {
        let harness = make_harness(FakeRenderer::ok());
        let replies = send(&harness, "/start").await;
        assert_eq!(replies.len(), 2);
        assert!(replies[0].text.contains("resume"));
        assert_eq!(replies[1].text, Step::FullName.spec().prompt);

        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::FullName);
    }

    #[tokio::test]
    async fn test_unknown_chat_implicitly_restarts() {
        let harness = make_harness(FakeRenderer::ok());
        let replies = send(&harness, "hello there").await;
        // The stray text is not treated as an answer.
        assert_eq!(replies.last().unwrap().text, Step::FullName.spec().prompt);
        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert_eq!(session.draft.personal_info.full_name, "");
    }

    #[tokio::test]
    async fn test_invalid_reply_reprompts_without_advancing() {
        let harness = make_harness(FakeRenderer::ok());
        send(&harness, "/start").await;
        let replies = send(&harness, "   ").await;
        assert_eq!(replies.len(), 1);
        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::FullName);
    }

    #[tokio::test]
    async fn test_preview_reply_includes_draft_summary() {
        let harness = make_harness(FakeRenderer::ok());
        send(&harness, "/start").await;
        for reply in &HAPPY_PATH[..HAPPY_PATH.len() - 1] {
            send(&harness, reply).await;
        }
        // The last exchange before "confirm" ended on the preview.
        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::FormatChoice);
    }

    #[tokio::test]
    async fn test_happy_path_ends_with_link_and_no_session() {
        let harness = make_harness(FakeRenderer::ok());
        send(&harness, "/start").await;
        for reply in HAPPY_PATH {
            send(&harness, reply).await;
        }
        let replies = send(&harness, "pdf").await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].attachment_link.is_some());
        assert!(replies[0].text.contains("10 minutes"));

        assert!(harness.sessions.load("chat-1").await.unwrap().is_none());
        assert_eq!(harness.renderer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.repo.versions.lock().unwrap().len(), 1);

        let resumes = harness.repo.resumes.lock().unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].title, "Alice — Engineer");
    }

    #[tokio::test]
    async fn test_render_failure_reports_and_still_ends_session() {
        let harness = make_harness(FakeRenderer::failing());
        send(&harness, "/start").await;
        for reply in HAPPY_PATH {
            send(&harness, reply).await;
        }
        let replies = send(&harness, "document").await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].attachment_link.is_none());
        assert!(replies[0].text.contains(FINALIZE_FAILED));

        // Session is gone and the structured data survived.
        assert!(harness.sessions.load("chat-1").await.unwrap().is_none());
        assert_eq!(harness.repo.versions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_restart_mid_loop_discards_scratch() {
        let harness = make_harness(FakeRenderer::ok());
        send(&harness, "/start").await;
        for reply in &["Alice", "Engineer", "a@b.c", "555", "Berlin", "-", "About", "Rust", "yes", "Acme"] {
            send(&harness, reply).await;
        }
        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert!(!session.scratch.is_empty());

        send(&harness, "/create").await;
        let session = harness.sessions.load("chat-1").await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::FullName);
        assert!(session.scratch.is_empty());
        assert_eq!(session.draft.work_experience.len(), 0);
    }

    #[tokio::test]
    async fn test_attachment_upload_returns_link() {
        let harness = make_harness(FakeRenderer::ok());
        let replies = harness
            .service
            .handle_message(InboundMessage {
                chat_id: "chat-1".to_string(),
                text: None,
                attachment: Some(InboundAttachment {
                    filename: "cv.pdf".to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4"),
                }),
            })
            .await
            .unwrap();

        assert_eq!(replies.len(), 1);
        assert!(replies[0].attachment_link.is_some());
        assert!(replies[0]
            .attachment_link
            .as_deref()
            .unwrap()
            .contains("user_chat-1/cv.pdf"));
    }

    #[tokio::test]
    async fn test_bad_base64_attachment_is_rejected() {
        let harness = make_harness(FakeRenderer::ok());
        let result = harness
            .service
            .handle_message(InboundMessage {
                chat_id: "chat-1".to_string(),
                text: None,
                attachment: Some(InboundAttachment {
                    filename: "cv.pdf".to_string(),
                    data: "not base64!!!".to_string(),
                }),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
