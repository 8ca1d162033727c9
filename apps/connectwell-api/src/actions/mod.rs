//! Form actions: validate, persist, enrich, and report back in one uniform
//! shape. No error crosses an action boundary except where a caller must see
//! it (moderation).
//!
//! Each action walks `Idle → Validating → (Rejected | Persisting) →
//! (Committed | Failed)`.

pub mod communities;
pub mod posts;
pub mod profile;

use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::FieldErrors;

/// Generic message shown when the store fails; the detail is only logged.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Idle,
    Validating,
    Rejected,
    Persisting,
    Committed,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Store,
    NotImplemented,
}

impl ActionPhase {
    pub fn can_enter(self, next: ActionPhase) -> bool {
        use ActionPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Persisting)
                | (Persisting, Committed)
                | (Persisting, Failed(_))
                | (Idle, Failed(FailureKind::NotImplemented))
        )
    }
}

/// Tracks and logs the phase of one action invocation.
pub(crate) struct Transition {
    action: &'static str,
    phase: ActionPhase,
}

impl Transition {
    pub(crate) fn start(action: &'static str) -> Self {
        Self {
            action,
            phase: ActionPhase::Idle,
        }
    }

    pub(crate) fn enter(&mut self, next: ActionPhase) {
        debug_assert!(
            self.phase.can_enter(next),
            "{}: illegal transition {:?} -> {:?}",
            self.action,
            self.phase,
            next
        );
        tracing::debug!(action = self.action, from = ?self.phase, to = ?next, "action phase");
        self.phase = next;
    }
}

/// Uniform result of every form action.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(skip)]
    pub phase: ActionPhase,
}

impl ActionResult {
    pub(crate) fn rejected(errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: "Please fix the highlighted fields.".to_string(),
            community_id: None,
            community_name: None,
            field_errors: Some(errors),
            phase: ActionPhase::Rejected,
        }
    }

    pub(crate) fn committed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            community_id: None,
            community_name: None,
            field_errors: None,
            phase: ActionPhase::Committed,
        }
    }

    pub(crate) fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            community_id: None,
            community_name: None,
            field_errors: None,
            phase: ActionPhase::Failed(kind),
        }
    }

    pub(crate) fn with_community(mut self, id: &str, name: &str) -> Self {
        self.community_id = Some(id.to_string());
        self.community_name = Some(name.to_string());
        self
    }

    /// HTTP status a route should answer with.
    pub fn status(&self, success: StatusCode) -> StatusCode {
        match self.phase {
            ActionPhase::Rejected => StatusCode::BAD_REQUEST,
            ActionPhase::Failed(FailureKind::NotFound) => StatusCode::NOT_FOUND,
            ActionPhase::Failed(FailureKind::NotImplemented) => StatusCode::NOT_IMPLEMENTED,
            ActionPhase::Failed(FailureKind::Store) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => success,
        }
    }
}
