//! Modal add/edit forms.
//!
//! A [`Modal`] holds the draft for one form and walks
//! `Closed -> Open -> Submitting -> Closed`, falling back to `Open` with the draft
//! intact when saving fails.

pub mod course;
pub mod task;

pub use course::{CourseDraft, CoursePayload};
pub use task::{TaskDraft, TaskPayload};

use std::future::Future;

use tracing::error;

use crate::error::AppError;

/// Field values behind a form.
pub trait Draft: Default + Clone {
    /// Record the form is pre-filled from when editing.
    type Initial;
    /// What the save callback receives.
    type Payload;

    fn from_initial(initial: &Self::Initial) -> Self;
    fn initial_id(initial: &Self::Initial) -> String;
    /// Required fields are present.
    fn is_complete(&self) -> bool;
    /// `None` while required fields are missing.
    fn to_payload(&self, id: Option<String>) -> Option<Self::Payload>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<D> {
    Closed,
    Open { editing: Option<String>, draft: D },
    Submitting { editing: Option<String>, draft: D },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The modal was not open.
    NotOpen,
    /// Required fields are missing; nothing was saved.
    Blocked,
    Saved,
    /// Saving failed; the modal is open again with the draft kept.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Modal<D> {
    state: ModalState<D>,
}

impl<D> Default for Modal<D> {
    fn default() -> Self {
        Self {
            state: ModalState::Closed,
        }
    }
}

impl<D: Draft> Modal<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModalState<D> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, ModalState::Submitting { .. })
    }

    /// Id of the record being edited, `None` when adding.
    pub fn editing(&self) -> Option<&str> {
        match &self.state {
            ModalState::Open { editing, .. } | ModalState::Submitting { editing, .. } => {
                editing.as_deref()
            }
            ModalState::Closed => None,
        }
    }

    pub fn open_new(&mut self) {
        self.state = ModalState::Open {
            editing: None,
            draft: D::default(),
        };
    }

    pub fn open_edit(&mut self, initial: &D::Initial) {
        self.state = ModalState::Open {
            editing: Some(D::initial_id(initial)),
            draft: D::from_initial(initial),
        };
    }

    pub fn draft(&self) -> Option<&D> {
        match &self.state {
            ModalState::Open { draft, .. } | ModalState::Submitting { draft, .. } => Some(draft),
            ModalState::Closed => None,
        }
    }

    /// Editable draft; inputs are locked while a save is pending.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match &mut self.state {
            ModalState::Open { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Discards the draft.
    pub fn cancel(&mut self) {
        self.state = ModalState::Closed;
    }

    pub async fn submit<F, Fut>(&mut self, save: F) -> SubmitOutcome
    where
        F: FnOnce(D::Payload) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let (editing, draft) = match std::mem::replace(&mut self.state, ModalState::Closed) {
            ModalState::Open { editing, draft } => (editing, draft),
            other => {
                self.state = other;
                return SubmitOutcome::NotOpen;
            }
        };

        let Some(payload) = draft.to_payload(editing.clone()) else {
            self.state = ModalState::Open { editing, draft };
            return SubmitOutcome::Blocked;
        };
        self.state = ModalState::Submitting {
            editing: editing.clone(),
            draft: draft.clone(),
        };

        match save(payload).await {
            Ok(()) => {
                self.state = ModalState::Closed;
                SubmitOutcome::Saved
            }
            Err(err) => {
                error!("failed to save form: {}", err);
                self.state = ModalState::Open { editing, draft };
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Trimmed value, `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
