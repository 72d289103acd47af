//! Modal dialogs the engine asks the host to show.

use crate::elements::ElementId;
use serde::{Deserialize, Serialize};

pub const CLEAR_TITLE: &str = "Clear Canvas";
pub const CLEAR_BODY: &str = "Are you sure you want to clear the canvas?";

/// What the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogRequest {
    Confirm { title: String, body: String },
    EditText { initial_text: String },
}

/// An open dialog and the state it commits on confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    ConfirmClear,
    EditText { id: ElementId, draft: String },
}

impl Dialog {
    pub fn edit_text(id: ElementId, current: &str) -> Self {
        Dialog::EditText {
            id,
            draft: current.to_string(),
        }
    }

    pub fn request(&self) -> DialogRequest {
        match self {
            Dialog::ConfirmClear => DialogRequest::Confirm {
                title: CLEAR_TITLE.to_string(),
                body: CLEAR_BODY.to_string(),
            },
            Dialog::EditText { draft, .. } => DialogRequest::EditText {
                initial_text: draft.clone(),
            },
        }
    }

    /// Replace the text-edit draft. Ignored by confirmation dialogs.
    pub fn set_draft(&mut self, text: String) -> bool {
        match self {
            Dialog::EditText { draft, .. } => {
                *draft = text;
                true
            }
            Dialog::ConfirmClear => false,
        }
    }
}
