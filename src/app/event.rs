use crate::app::models::{CategoryFilter, TaskId};

/// Result of the edit-text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The prompt was aborted; the task keeps its text.
    Cancelled,
    /// Replace the text, empty strings included.
    Replaced(String),
}

/// Everything the UI can ask of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    AddTask {
        text: String,
        category: String,
        due_date: String,
    },
    ToggleComplete(TaskId),
    EditText {
        id: TaskId,
        outcome: EditOutcome,
    },
    Delete(TaskId),
    SortByDueDate,
    SetFilter(CategoryFilter),
    /// Move `moved` right before `before`, or to the end when `before` is `None`.
    Reorder {
        moved: TaskId,
        before: Option<TaskId>,
    },
}
