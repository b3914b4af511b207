use serde::Serialize;
use tracing::{error, info};

/// A user-facing acknowledgment produced by the deletion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    Success { title: String, message: String },
    Error { title: String, message: String },
}

impl Feedback {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Feedback::Success {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Feedback::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error { .. })
    }

    pub fn title(&self) -> &str {
        match self {
            Feedback::Success { title, .. } | Feedback::Error { title, .. } => title,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Feedback::Success { message, .. } | Feedback::Error { message, .. } => message,
        }
    }
}

/// Receives `Feedback` for display, e.g. as an alert. Implementations must not block.
pub trait Notify: Send + Sync {
    fn notify(&self, feedback: &Feedback);
}

/// A `Notify` implementation that writes feedback to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn notify(&self, feedback: &Feedback) {
        match feedback {
            Feedback::Success { title, message } => info!("{title}: {message}"),
            Feedback::Error { title, message } => error!("{title}: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_accessors() {
        let ok = Feedback::success("Success", "Transaction deleted successfully");
        assert!(!ok.is_error());
        assert_eq!(ok.title(), "Success");
        assert_eq!(ok.message(), "Transaction deleted successfully");

        let err = Feedback::error("Error", "Failed to delete transaction");
        assert!(err.is_error());
        assert_eq!(err.message(), "Failed to delete transaction");
    }

    #[test]
    fn test_feedback_serialize() {
        let json = serde_json::to_string(&Feedback::error("Error", "boom")).unwrap();
        assert_eq!(json, r#"{"kind":"error","title":"Error","message":"boom"}"#);
    }
}
