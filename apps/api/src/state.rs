use std::sync::Arc;

use crate::conversation::service::ConversationService;
use crate::render::DocumentRenderer;
use crate::resumes::repository::ResumeRepository;
use crate::storage::ArtifactStore;
use crate::translation::TranslationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub resumes: Arc<dyn ResumeRepository>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub translator: TranslationService,
    pub conversation: Arc<ConversationService>,
}
