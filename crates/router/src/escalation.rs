//! The multi-turn escalation dialogue.
//!
//! Drives the staged "collect name, then email, then notify" flow:
//! `None → AwaitingName → AwaitingEmail → None`, with a fast path that
//! skips both collection states once identity was captured earlier in
//! the session. Name and email are accepted as free text; a
//! malformed-looking email is acknowledged in the reply rather than
//! silently recorded.

use sd_backends::Notifier;

use crate::keywords::find_email;
use crate::session::{PendingStage, Session};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reply texts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const NAME_PROMPT: &str =
    "I can connect you with a human agent. Could you share your full name?";

pub const NOTIFIED_REPLY: &str =
    "Thank you. A human agent has been notified and will reach out to you shortly.";

/// Appended to the confirmation when the notification channel could not
/// be reached. The collected details are kept so the request is not lost.
pub const DELIVERY_WARNING: &str = "(Note: we had trouble reaching the support \
    channel just now. Your request has been recorded and will be followed up.)";

/// Appended when the collected email doesn't look like an address.
const EMAIL_SHAPE_NOTE: &str =
    "(That doesn't look like a typical email address, but I've recorded it as given.)";

pub fn email_prompt(name: &str) -> String {
    format!("Thanks, {name}. What's the best email address to reach you at?")
}

/// The alert text forwarded to the human-facing channel.
fn notification_text(name: &str, email: &str, message: &str) -> String {
    format!("Escalation request from {name} <{email}>: {message}")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State transitions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Handle a message classified as `Escalate`.
///
/// With identity already collected this notifies immediately; otherwise
/// it stores the triggering message and enters the collection dialogue
/// at whichever stage is still missing.
pub async fn on_escalate(
    session: &mut Session,
    message: &str,
    notifier: &dyn Notifier,
) -> String {
    if session.identity_complete() {
        session.pending_escalation_message = Some(message.to_string());
        return notify_and_confirm(session, notifier).await;
    }

    session.pending_escalation_message = Some(message.to_string());
    if session.collected_name().is_none() {
        session.pending_stage = PendingStage::AwaitingName;
        NAME_PROMPT.to_string()
    } else {
        // Name known from an earlier, unfinished escalation; only the
        // email is still missing.
        session.pending_stage = PendingStage::AwaitingEmail;
        email_prompt(session.collected_name().unwrap_or_default())
    }
}

/// Handle a message classified as `CollectName`.
pub async fn on_collect_name(
    session: &mut Session,
    input: &str,
    notifier: &dyn Notifier,
) -> String {
    let name = input.trim().to_string();
    session.set_collected_name(&name);

    if session.collected_email().is_some() {
        session.pending_stage = PendingStage::None;
        return notify_and_confirm(session, notifier).await;
    }

    session.pending_stage = PendingStage::AwaitingEmail;
    email_prompt(&name)
}

/// Handle a message classified as `CollectEmail`.
///
/// Closes the collection dialogue and notifies. The email is accepted
/// as free text; an input without email shape is acknowledged, never
/// silently dropped.
pub async fn on_collect_email(
    session: &mut Session,
    input: &str,
    notifier: &dyn Notifier,
) -> String {
    let email = input.trim().to_string();
    let looks_like_email = find_email(&email).is_some();
    session.set_collected_email(&email);
    session.pending_stage = PendingStage::None;

    let mut reply = notify_and_confirm(session, notifier).await;
    if !looks_like_email {
        reply.push_str("\n\n");
        reply.push_str(EMAIL_SHAPE_NOTE);
    }
    reply
}

/// Forward the pending escalation to the notification channel.
///
/// On success the pending message is cleared. On delivery failure the
/// already-collected name/email/message are left intact so operator
/// follow-up remains possible, and the confirmation carries a
/// low-severity warning suffix.
async fn notify_and_confirm(session: &mut Session, notifier: &dyn Notifier) -> String {
    let name = session.collected_name().unwrap_or("N/A").to_string();
    let email = session.collected_email().unwrap_or("N/A").to_string();
    let message = session
        .pending_escalation_message
        .clone()
        .unwrap_or_default();

    let text = notification_text(&name, &email, &message);

    match notifier.notify(&text).await {
        Ok(()) => {
            session.pending_escalation_message = None;
            tracing::info!(session_key = %session.session_key, "escalation forwarded to human channel");
            NOTIFIED_REPLY.to_string()
        }
        Err(e) => {
            tracing::warn!(
                session_key = %session.session_key,
                error = %e,
                "escalation notification delivery failed; keeping collected details"
            );
            format!("{NOTIFIED_REPLY}\n\n{DELIVERY_WARNING}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_text_carries_all_three_parts() {
        let text = notification_text("Jane Doe", "jane@example.com", "I want a refund");
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("jane@example.com"));
        assert!(text.contains("I want a refund"));
    }

    #[test]
    fn email_prompt_addresses_user_by_name() {
        assert!(email_prompt("Jane").contains("Jane"));
    }
}
