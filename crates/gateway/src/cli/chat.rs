//! `supportdesk chat` — the interactive support session.
//!
//! A readline loop that sends each line through the router and prints
//! the reply. Slash commands cover document upload, session switching,
//! and other REPL conveniences.

use std::sync::Arc;

use sd_domain::config::Config;

use crate::bootstrap;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL.
pub async fn chat(
    config: Arc<Config>,
    mut session_key: String,
    document: Option<String>,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;

    // Pre-index a document when one was given on the command line.
    if let Some(path) = document {
        upload_document(&state, &session_key, &path).await;
    }

    // Readline editor with persistent history.
    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".supportdesk")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    // Welcome banner goes to stderr so stdout stays clean for replies.
    eprintln!("supportdesk — AI customer support assistant");
    eprintln!("Session: {session_key}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!("Hello! How can I help you today?");
    eprintln!();

    loop {
        let readline = rl.readline("you> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(&state, trimmed, &mut session_key).await {
                        break;
                    }
                    continue;
                }

                let mut session = state.sessions.take(&session_key);
                let reply = state.router.handle_message(&mut session, trimmed).await;
                state.sessions.restore(session);

                println!("{reply}");
                println!();
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command. Returns `true` if the REPL should exit.
async fn handle_slash_command(
    state: &AppState,
    input: &str,
    session_key: &mut String,
) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim());

    match cmd {
        "/exit" | "/quit" => return true,

        "/upload" => {
            if let Some(path) = arg.filter(|s| !s.is_empty()) {
                upload_document(state, session_key, path).await;
            } else {
                eprintln!("Usage: /upload <path-to-text-file>");
            }
        }

        "/session" => {
            if let Some(name) = arg.filter(|s| !s.is_empty()) {
                *session_key = name.to_string();
                eprintln!("Session switched to: {session_key}");
            } else {
                eprintln!("Current session: {session_key}");
                eprintln!("Usage: /session <name>");
            }
        }

        "/reset" => {
            state.sessions.reset(session_key);
            eprintln!("Session reset: history, escalation state, and document index cleared.");
        }

        "/clear" => {
            // ANSI escape: clear screen and move cursor to top-left.
            eprint!("\x1B[2J\x1B[1;1H");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /upload <path>   Index a text document for this session");
            eprintln!("  /session <name>  Switch to a named session");
            eprintln!("  /reset           Start over (clears history and index)");
            eprintln!("  /clear           Clear the screen");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document upload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Read a UTF-8 text file and install it as the session's document
/// index. A failed ingestion leaves any previous index in place.
async fn upload_document(state: &AppState, session_key: &str, path: &str) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("\x1B[31mcould not read {path}: {e}\x1B[0m");
            return;
        }
    };

    let doc_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let mut session = state.sessions.take(session_key);
    match state
        .router
        .index_document(&mut session, &doc_name, &text)
        .await
    {
        Ok(()) => {
            let chunks = session
                .document_index
                .as_ref()
                .map(|i| i.chunk_count())
                .unwrap_or(0);
            eprintln!("Indexed {doc_name} ({chunks} chunk(s)). Ask away!");
        }
        Err(e) => {
            eprintln!("\x1B[31mindexing failed: {e}\x1B[0m");
        }
    }
    state.sessions.restore(session);
}
