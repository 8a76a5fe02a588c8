use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::provider::InterviewProvider;
use crate::storage::Store;
use crate::tasks::TaskQueue;

/// Email → subscription status. Process-scoped; lost on restart.
pub type Subscriptions = Arc<RwLock<HashMap<String, String>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    /// Chosen at startup: OpenAI, Gemini or the offline mock.
    pub provider: Arc<dyn InterviewProvider>,
    /// Background jobs; workers hold their own provider and
    /// speech-to-text handles.
    pub tasks: TaskQueue,
    pub subscriptions: Subscriptions,
}
