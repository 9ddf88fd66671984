use std::sync::Arc;

use sd_domain::config::Config;
use sd_router::{Router, SessionStore};

/// Shared application state handed to every CLI command.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<Router>,
    pub sessions: Arc<SessionStore>,
}
