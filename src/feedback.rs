use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use teloxide::utils::markdown::{bold, escape};
use thiserror::Error;
use tracing::{error, warn};

pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Body of `POST /api/feedback`. Unknown fields (e.g. `userId`) are ignored.
#[derive(Debug, Default)]
pub struct FeedbackRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub message: Option<String>,
    pub username: Option<String>,
}

impl FeedbackRequest {
    /// Read each field on its own. A field that is not a string counts as absent.
    pub fn from_json(body: &Value) -> Self {
        let field = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("name"),
            kind: field("type"),
            message: field("message"),
            username: field("username"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Review,
    Suggestion,
}

impl FeedbackKind {
    /// Absent and unrecognized values both fall back to `Review`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("suggestion") => FeedbackKind::Suggestion,
            _ => FeedbackKind::Review,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackKind::Review => "Review",
            FeedbackKind::Suggestion => "Suggestion",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FeedbackKind::Review => "⭐",
            FeedbackKind::Suggestion => "💡",
        }
    }
}

/// A validated submission, ready to be turned into a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub author: String,
    pub kind: FeedbackKind,
    pub message: String,
    pub handle: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Submission {
    pub fn from_request(req: FeedbackRequest) -> Result<Self, FeedbackError> {
        let message = non_blank(req.message).ok_or(FeedbackError::Validation(EMPTY_MESSAGE))?;

        Ok(Self {
            author: non_blank(req.name).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            kind: FeedbackKind::from_label(req.kind.as_deref()),
            message,
            handle: non_blank(req.username)
                .map(|h| h.trim_start_matches('@').to_string())
                .filter(|h| !h.is_empty()),
        })
    }

    /// Render the MarkdownV2 report sent to the feedback channel.
    pub fn report(&self, received_at: DateTime<Utc>) -> String {
        let mut author = escape(&self.author);
        if let Some(handle) = &self.handle {
            author.push_str(&escape(&format!(" (@{})", handle)));
        }

        format!(
            "{icon} {title}\n\n👤 {from_label} {author}\n🕒 {at_label} {at}\n\n{body}",
            icon = self.kind.icon(),
            title = bold(&escape(&format!("New {}", self.kind.label().to_lowercase()))),
            from_label = bold("From:"),
            at_label = bold("Received:"),
            at = escape(&received_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            body = escape(&self.message),
        )
    }
}

const EMPTY_MESSAGE: &str = "Message must not be empty";
const NOT_CONFIGURED: &str = "Server is not configured to accept feedback";
const DELIVERY_FAILED: &str = "Failed to deliver feedback";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("feedback channel is not configured")]
    Configuration,

    #[error("failed to send feedback: {0:#}")]
    Upstream(#[source] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub message: &'static str,
}

impl SuccessBody {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "Thank you! Your feedback has been sent.",
        }
    }
}

impl FeedbackError {
    pub fn status(&self) -> StatusCode {
        match self {
            FeedbackError::Validation(_) => StatusCode::BAD_REQUEST,
            FeedbackError::Configuration | FeedbackError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text returned to the caller. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            FeedbackError::Validation(reason) => *reason,
            FeedbackError::Configuration => NOT_CONFIGURED,
            FeedbackError::Upstream(_) => DELIVERY_FAILED,
        }
    }
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            FeedbackError::Validation(_) => warn!("Rejected feedback: {}", self),
            _ => error!("Feedback failed: {}", self),
        }
        (
            self.status(),
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
