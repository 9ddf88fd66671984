//! `supportdesk run` — one-shot execution command.
//!
//! Sends a single message through the router, prints the reply to
//! stdout, and exits. Useful for scripting and quick checks.

use std::sync::Arc;

use sd_domain::config::Config;
use sd_router::engine::FAILURE_MARKER;

use crate::bootstrap;

/// Execute a single message cycle and print the reply.
pub async fn run(
    config: Arc<Config>,
    message: String,
    session_key: String,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;

    let mut session = state.sessions.take(&session_key);
    let reply = state.router.handle_message(&mut session, &message).await;
    state.sessions.restore(session);

    println!("{reply}");

    // Backend failures are rendered into the reply, not raised; signal
    // them to scripts through the exit code.
    if reply.starts_with(FAILURE_MARKER) {
        std::process::exit(1);
    }

    Ok(())
}
