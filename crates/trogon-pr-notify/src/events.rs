//! Pull-request webhook routing.
//!
//! Maps a verified webhook body plus its `X-GitHub-Event` type to at most one
//! [`NotificationIntent`]. Each recognized event type has a pure decoder that
//! reads only the fields it needs; anything else is a no-op.
//!
//! | Event | Action | Recipient |
//! |---|---|---|
//! | `pull_request` | `assigned` | assignee |
//! | `pull_request_review` | `submitted` | PR author |
//! | `pull_request_review_comment` | `created` | PR author |

use serde::Deserialize;
use thiserror::Error;

use crate::text::truncate;

/// Longest review or comment body, in code points, quoted in a notification.
pub const BODY_PREVIEW_LIMIT: usize = 300;

/// Who to notify and what to tell them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub recipient_login: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("malformed {event} payload: {source}")]
    MalformedPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Webhook event types this service acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    PullRequestReview,
    PullRequestReviewComment,
}

impl EventKind {
    /// `None` for event types that are acknowledged but ignored.
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "pull_request" => Some(Self::PullRequest),
            "pull_request_review" => Some(Self::PullRequestReview),
            "pull_request_review_comment" => Some(Self::PullRequestReviewComment),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
            Self::PullRequestReviewComment => "pull_request_review_comment",
        }
    }

    fn decoder(self) -> fn(&[u8]) -> serde_json::Result<Option<NotificationIntent>> {
        match self {
            Self::PullRequest => decode_pull_request,
            Self::PullRequestReview => decode_review,
            Self::PullRequestReviewComment => decode_review_comment,
        }
    }
}

/// Decides whether a verified webhook should notify anyone.
///
/// Unknown event types return `Ok(None)` without looking at the body.
/// Malformed JSON for a known type is a [`RouteError`], never a no-op.
pub fn route(event: &str, body: &[u8]) -> Result<Option<NotificationIntent>, RouteError> {
    let Some(kind) = EventKind::parse(event) else {
        return Ok(None);
    };
    (kind.decoder())(body).map_err(|source| RouteError::MalformedPayload {
        event: kind.as_str(),
        source,
    })
}

// ── Payloads ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Account {
    #[serde(default)]
    login: String,
}

#[derive(Deserialize)]
struct PullRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    user: Option<Account>,
}

impl PullRequest {
    fn author(&self) -> Option<&str> {
        non_empty_login(self.user.as_ref())
    }
}

#[derive(Deserialize)]
struct PullRequestPayload {
    action: String,
    pull_request: PullRequest,
    #[serde(default)]
    assignee: Option<Account>,
}

#[derive(Deserialize)]
struct Review {
    #[serde(default)]
    state: String,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct ReviewPayload {
    action: String,
    review: Review,
    pull_request: PullRequest,
}

#[derive(Deserialize)]
struct Comment {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct ReviewCommentPayload {
    action: String,
    comment: Comment,
    pull_request: PullRequest,
}

fn non_empty_login(account: Option<&Account>) -> Option<&str> {
    account
        .map(|a| a.login.trim())
        .filter(|login| !login.is_empty())
}

// ── Decoders ──────────────────────────────────────────────────────────────────

fn decode_pull_request(body: &[u8]) -> serde_json::Result<Option<NotificationIntent>> {
    let payload: PullRequestPayload = serde_json::from_slice(body)?;
    if payload.action != "assigned" {
        return Ok(None);
    }
    let Some(assignee) = non_empty_login(payload.assignee.as_ref()) else {
        return Ok(None);
    };

    let pr = &payload.pull_request;
    Ok(Some(NotificationIntent {
        recipient_login: assignee.to_string(),
        message: format!(
            "📌 You were assigned to a pull request\n{}\n{}",
            pr.title, pr.html_url
        ),
    }))
}

fn review_prefix(state: &str) -> Option<&'static str> {
    match state {
        "approved" => Some("✅ Your pull request was approved"),
        "changes_requested" => Some("🔴 Changes requested on your pull request"),
        "commented" => Some("💬 New review on your pull request"),
        _ => None,
    }
}

fn decode_review(body: &[u8]) -> serde_json::Result<Option<NotificationIntent>> {
    let payload: ReviewPayload = serde_json::from_slice(body)?;
    if payload.action != "submitted" || payload.review.state.is_empty() {
        return Ok(None);
    }
    let Some(prefix) = review_prefix(&payload.review.state.to_ascii_lowercase()) else {
        return Ok(None);
    };
    let Some(author) = payload.pull_request.author() else {
        return Ok(None);
    };

    let pr = &payload.pull_request;
    let mut message = format!("{prefix}\n{}\n{}", pr.title, pr.html_url);
    append_quote(&mut message, payload.review.body.as_deref());

    Ok(Some(NotificationIntent {
        recipient_login: author.to_string(),
        message,
    }))
}

fn decode_review_comment(body: &[u8]) -> serde_json::Result<Option<NotificationIntent>> {
    let payload: ReviewCommentPayload = serde_json::from_slice(body)?;
    if payload.action != "created" {
        return Ok(None);
    }
    let Some(author) = payload.pull_request.author() else {
        return Ok(None);
    };

    let pr = &payload.pull_request;
    let mut message = format!("💬 New comment on your pull request\n{}\n{}", pr.title, pr.html_url);
    append_quote(&mut message, payload.comment.body.as_deref());

    Ok(Some(NotificationIntent {
        recipient_login: author.to_string(),
        message,
    }))
}

fn append_quote(message: &mut String, body: Option<&str>) {
    let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) else {
        return;
    };
    message.push_str("\n\n");
    message.push_str(&truncate(body, BODY_PREVIEW_LIMIT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn pr(author: &str) -> serde_json::Value {
        json!({
            "title": "Fix flaky test",
            "html_url": "https://github.com/org/repo/pull/7",
            "user": { "login": author }
        })
    }

    // ── pull_request ──────────────────────────────────────────────────────────

    #[test]
    fn assigned_notifies_assignee() {
        let body = bytes(json!({
            "action": "assigned",
            "pull_request": pr("bob"),
            "assignee": { "login": "alice" }
        }));

        let intent = route("pull_request", &body).unwrap().unwrap();
        assert_eq!(intent.recipient_login, "alice");
        assert!(intent.message.contains("Fix flaky test"));
        assert!(intent.message.contains("https://github.com/org/repo/pull/7"));
    }

    #[test]
    fn other_pull_request_actions_are_ignored() {
        for action in ["opened", "closed", "unassigned", "synchronize"] {
            let body = bytes(json!({
                "action": action,
                "pull_request": pr("bob"),
                "assignee": { "login": "alice" }
            }));
            assert_eq!(route("pull_request", &body).unwrap(), None, "action {action}");
        }
    }

    #[test]
    fn assigned_without_assignee_is_ignored() {
        let missing = bytes(json!({ "action": "assigned", "pull_request": pr("bob") }));
        let null = bytes(json!({ "action": "assigned", "pull_request": pr("bob"), "assignee": null }));
        let blank = bytes(json!({
            "action": "assigned",
            "pull_request": pr("bob"),
            "assignee": { "login": "  " }
        }));

        assert_eq!(route("pull_request", &missing).unwrap(), None);
        assert_eq!(route("pull_request", &null).unwrap(), None);
        assert_eq!(route("pull_request", &blank).unwrap(), None);
    }

    // ── pull_request_review ───────────────────────────────────────────────────

    #[test]
    fn review_states_map_to_prefixes() {
        let cases = [
            ("approved", "approved"),
            ("changes_requested", "Changes requested"),
            ("commented", "New review"),
            ("APPROVED", "approved"),
        ];
        for (state, expected) in cases {
            let body = bytes(json!({
                "action": "submitted",
                "review": { "state": state, "body": null },
                "pull_request": pr("bob")
            }));
            let intent = route("pull_request_review", &body).unwrap().unwrap();
            assert_eq!(intent.recipient_login, "bob");
            assert!(intent.message.contains(expected), "state {state}: {}", intent.message);
        }
    }

    #[test]
    fn review_with_unknown_or_empty_state_is_ignored() {
        for state in ["dismissed", "pending", ""] {
            let body = bytes(json!({
                "action": "submitted",
                "review": { "state": state },
                "pull_request": pr("bob")
            }));
            assert_eq!(route("pull_request_review", &body).unwrap(), None, "state {state:?}");
        }
    }

    #[test]
    fn review_other_action_is_ignored() {
        let body = bytes(json!({
            "action": "edited",
            "review": { "state": "approved" },
            "pull_request": pr("bob")
        }));
        assert_eq!(route("pull_request_review", &body).unwrap(), None);
    }

    #[test]
    fn review_body_is_truncated_and_appended() {
        let long = "ш".repeat(BODY_PREVIEW_LIMIT + 50);
        let body = bytes(json!({
            "action": "submitted",
            "review": { "state": "changes_requested", "body": long },
            "pull_request": pr("bob")
        }));

        let intent = route("pull_request_review", &body).unwrap().unwrap();
        let quoted = intent.message.rsplit("\n\n").next().unwrap();
        assert_eq!(quoted.chars().count(), BODY_PREVIEW_LIMIT + 1);
        assert!(quoted.ends_with('…'));
    }

    #[test]
    fn review_without_author_is_ignored() {
        let body = bytes(json!({
            "action": "submitted",
            "review": { "state": "approved" },
            "pull_request": { "title": "t", "html_url": "u" }
        }));
        assert_eq!(route("pull_request_review", &body).unwrap(), None);
    }

    // ── pull_request_review_comment ───────────────────────────────────────────

    #[test]
    fn created_comment_notifies_author_with_body() {
        let body = bytes(json!({
            "action": "created",
            "comment": { "body": "nit: rename this" },
            "pull_request": pr("Bob")
        }));

        let intent = route("pull_request_review_comment", &body).unwrap().unwrap();
        assert_eq!(intent.recipient_login, "Bob");
        assert!(intent.message.contains("Fix flaky test"));
        assert!(intent.message.ends_with("nit: rename this"));
    }

    #[test]
    fn edited_comment_is_ignored() {
        let body = bytes(json!({
            "action": "edited",
            "comment": { "body": "x" },
            "pull_request": pr("bob")
        }));
        assert_eq!(route("pull_request_review_comment", &body).unwrap(), None);
    }

    // ── dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn unknown_event_is_a_no_op_even_with_garbage_body() {
        assert_eq!(route("push", b"not json").unwrap(), None);
        assert_eq!(route("", b"").unwrap(), None);
    }

    #[test]
    fn malformed_json_is_an_error_for_known_events() {
        for event in ["pull_request", "pull_request_review", "pull_request_review_comment"] {
            let err = route(event, b"{not json").unwrap_err();
            assert!(matches!(err, RouteError::MalformedPayload { event: e, .. } if e == event));
        }
    }

    #[test]
    fn missing_required_fields_is_malformed() {
        let err = route("pull_request", br#"{"action":"assigned"}"#).unwrap_err();
        assert!(err.to_string().starts_with("malformed pull_request payload"));
    }
}
