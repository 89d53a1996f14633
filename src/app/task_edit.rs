use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::event::{AppEvent, EditOutcome};
use crate::app::models::{Task, TaskId, CATEGORIES};
use derivative::Derivative;

// Which operation the dialog will produce on submit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DialogMode {
    #[default]
    Create,
    EditText(TaskId),
}

// Field rows of the create form
const TEXT_ROW: usize = 0;
const CATEGORY_ROW: usize = 1;
const DUE_DATE_ROW: usize = 2;

// State object for the task dialog
// Keeps track of the state of the dialog and the content being typed
#[derive(Derivative)]
#[derivative(Default)]
pub struct TaskEditDialogState {
    pub dialog_active: bool,
    mode: DialogMode,
    content: TaskEditDialogContent,
    // (char column, row)
    cursor_position: (usize, usize),
}

// Current content of the form
#[derive(Derivative, Debug, Clone, PartialEq)]
#[derivative(Default)]
struct TaskEditDialogContent {
    text: String,
    category: usize,
    due_date: String,
}

impl TaskEditDialogState {
    // Opens the dialog and prepares to accept an input for the new task
    pub fn create_a_new_task(&mut self) {
        self.dialog_active = true;
        self.mode = DialogMode::Create;
        self.content = TaskEditDialogContent::default();
        self.cursor_position = (0, TEXT_ROW);
    }

    // Opens the dialog as a prompt for the text of an existing task
    pub fn edit_task(&mut self, task: &Task) {
        self.dialog_active = true;
        self.mode = DialogMode::EditText(task.id.clone());
        self.content = TaskEditDialogContent {
            text: task.text.clone(),
            ..TaskEditDialogContent::default()
        };
        self.cursor_position = (task.text.chars().count(), TEXT_ROW);
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, DialogMode::EditText(_))
    }

    fn last_row(&self) -> usize {
        if self.is_editing() {
            TEXT_ROW
        } else {
            DUE_DATE_ROW
        }
    }

    fn category(&self) -> &'static str {
        CATEGORIES[self.content.category % CATEGORIES.len()]
    }

    // Move the cursor one line BELOW the current one.
    // The horizontal position is kept where the new line allows it
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor_position;
        let y = (y + 1).min(self.last_row());
        self.cursor_position = (x.min(self.line_len(y)), y);
    }

    // Move the cursor one line ABOVE the current one.
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor_position;
        let y = y.saturating_sub(1);
        self.cursor_position = (x.min(self.line_len(y)), y);
    }

    // Move the cursor one char LEFT; on the category row, pick the previous category
    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor_position;
        if y == CATEGORY_ROW && !self.is_editing() {
            self.content.category = (self.content.category + CATEGORIES.len() - 1) % CATEGORIES.len();
            return;
        }
        self.cursor_position = (x.saturating_sub(1), y);
    }

    // Move the cursor one char RIGHT; on the category row, pick the next category
    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor_position;
        if y == CATEGORY_ROW && !self.is_editing() {
            self.content.category = (self.content.category + 1) % CATEGORIES.len();
            return;
        }
        self.cursor_position = ((x + 1).min(self.line_len(y)), y);
    }

    fn line_len(&self, y: usize) -> usize {
        match y {
            TEXT_ROW => self.content.text.chars().count(),
            DUE_DATE_ROW => self.content.due_date.chars().count(),
            _ => 0,
        }
    }

    fn line_mut(&mut self, y: usize) -> Option<&mut String> {
        match y {
            TEXT_ROW => Some(&mut self.content.text),
            DUE_DATE_ROW => Some(&mut self.content.due_date),
            _ => None,
        }
    }

    // Delete the char left of the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor_position;
        if x == 0 {
            return;
        }
        if let Some(line) = self.line_mut(y) {
            let at = byte_index(line, x - 1);
            line.remove(at);
            self.cursor_position = (x - 1, y);
        }
    }

    // Handles the input of a char by inserting it at the cursor of the active field
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor_position;
        if let Some(line) = self.line_mut(y) {
            let at = byte_index(line, x);
            line.insert(at, to_insert);
            self.cursor_position = (x + 1, y);
        }
    }

    // Enter: turn the form into an event and reset it.
    // Nothing is validated; empty text and odd dates go through as typed.
    pub fn submit(&mut self) -> AppEvent {
        let content = std::mem::take(&mut self.content);
        self.dialog_active = false;
        self.cursor_position = (0, TEXT_ROW);
        match std::mem::take(&mut self.mode) {
            DialogMode::Create => AppEvent::AddTask {
                text: content.text,
                category: CATEGORIES[content.category % CATEGORIES.len()].to_string(),
                due_date: content.due_date,
            },
            DialogMode::EditText(id) => AppEvent::EditText {
                id,
                outcome: EditOutcome::Replaced(content.text),
            },
        }
    }

    // Esc: the edit prompt reports its abort, the create form just closes
    pub fn cancel(&mut self) -> Option<AppEvent> {
        self.dialog_active = false;
        self.content = TaskEditDialogContent::default();
        self.cursor_position = (0, TEXT_ROW);
        match std::mem::take(&mut self.mode) {
            DialogMode::Create => None,
            DialogMode::EditText(id) => Some(AppEvent::EditText {
                id,
                outcome: EditOutcome::Cancelled,
            }),
        }
    }
}

fn byte_index(line: &str, char_index: usize) -> usize {
    line.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

// Returns the UI content for the task dialog
pub fn get_task_edit_ui<'a>(state: &TaskEditDialogState) -> Vec<Line<'a>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);
    let mut text = Vec::new();

    struct TextDialogInputLine {
        prefix: &'static str,
        placeholder: &'static str,
        value: String,
    }

    let mut lines = vec![TextDialogInputLine {
        prefix: "Task:      ",
        placeholder: "What needs doing",
        value: state.content.text.clone(),
    }];
    if !state.is_editing() {
        lines.push(TextDialogInputLine {
            prefix: "Category:  ",
            placeholder: "",
            value: format!("< {} >", state.category()),
        });
        lines.push(TextDialogInputLine {
            prefix: "Due date:  ",
            placeholder: "2024-01-10T09:30",
            value: state.content.due_date.clone(),
        });
    }

    let (cursor_x, cursor_y) = state.cursor_position;

    for (i, line) in lines.into_iter().enumerate() {
        let mut spans = vec![Span::styled(line.prefix, WHITE_TEXT)];
        let selected = cursor_y == i;

        if i == CATEGORY_ROW {
            let style = if selected { BLACK_ON_WHITE } else { WHITE_TEXT };
            spans.push(Span::styled(line.value, style));
        } else if line.value.is_empty() {
            // If the line is empty, a placeholder is displayed
            if selected {
                // First char is highlighted as the cursor, the rest is gray
                spans.push(Span::styled(
                    line.placeholder.chars().take(1).collect::<String>(),
                    BLACK_ON_WHITE,
                ));
                spans.push(Span::styled(
                    line.placeholder.chars().skip(1).collect::<String>(),
                    GRAY_TEXT,
                ));
            } else {
                spans.push(Span::styled(line.placeholder, GRAY_TEXT));
            }
        } else if selected {
            // All chars are white, except for the one at the cursor position
            let before: String = line.value.chars().take(cursor_x).collect();
            let at: String = line.value.chars().skip(cursor_x).take(1).collect();
            let after: String = line.value.chars().skip(cursor_x + 1).collect();
            spans.push(Span::styled(before, WHITE_TEXT));
            if at.is_empty() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            } else {
                spans.push(Span::styled(at, BLACK_ON_WHITE));
                spans.push(Span::styled(after, WHITE_TEXT));
            }
        } else {
            spans.push(Span::styled(line.value, WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    let help = if state.is_editing() {
        "Enter - save, Esc - cancel"
    } else {
        "Enter - add, Esc - close, ←/→ on category - change"
    };
    text.push(Line::from(vec![Span::styled(help, WHITE_TEXT)]));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn typed(state: &mut TaskEditDialogState, s: &str) {
        for c in s.chars() {
            state.input(c);
        }
    }

    fn task(text: &str) -> Task {
        Task {
            id: TaskId("42".into()),
            text: text.into(),
            category: "work".into(),
            due_date: "2024-01-10".into(),
            completed: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_form_submits_add_event_and_resets() {
        let mut state = TaskEditDialogState::default();
        state.create_a_new_task();
        typed(&mut state, "buy milk");
        state.move_cursor_down();
        state.move_cursor_right();
        state.move_cursor_down();
        typed(&mut state, "2024-01-05");

        assert_eq!(
            state.submit(),
            AppEvent::AddTask {
                text: "buy milk".into(),
                category: "personal".into(),
                due_date: "2024-01-05".into(),
            }
        );
        assert!(!state.dialog_active);

        state.create_a_new_task();
        assert_eq!(
            state.submit(),
            AppEvent::AddTask {
                text: String::new(),
                category: "work".into(),
                due_date: String::new(),
            }
        );
    }

    #[test]
    fn category_wraps_both_ways() {
        let mut state = TaskEditDialogState::default();
        state.create_a_new_task();
        state.move_cursor_down();
        state.move_cursor_left();
        assert_eq!(state.category(), "other");
        state.move_cursor_right();
        state.move_cursor_right();
        assert_eq!(state.category(), "personal");
    }

    #[test]
    fn edit_prompt_replaces_or_cancels() {
        let mut state = TaskEditDialogState::default();
        state.edit_task(&task("draft"));
        state.delete_char();
        typed(&mut state, "t!");
        assert_eq!(
            state.submit(),
            AppEvent::EditText {
                id: TaskId("42".into()),
                outcome: EditOutcome::Replaced("draft!".into()),
            }
        );

        state.edit_task(&task("draft"));
        assert_eq!(
            state.cancel(),
            Some(AppEvent::EditText {
                id: TaskId("42".into()),
                outcome: EditOutcome::Cancelled,
            })
        );
    }

    #[test]
    fn edit_prompt_can_clear_text() {
        let mut state = TaskEditDialogState::default();
        state.edit_task(&task("abc"));
        for _ in 0..5 {
            state.delete_char();
        }
        assert_eq!(
            state.submit(),
            AppEvent::EditText {
                id: TaskId("42".into()),
                outcome: EditOutcome::Replaced(String::new()),
            }
        );
    }

    #[test]
    fn edit_prompt_has_a_single_row() {
        let mut state = TaskEditDialogState::default();
        state.edit_task(&task("x"));
        state.move_cursor_down();
        assert_eq!(state.cursor_position.1, TEXT_ROW);
    }

    #[test]
    fn closing_create_form_emits_nothing() {
        let mut state = TaskEditDialogState::default();
        state.create_a_new_task();
        typed(&mut state, "half typed");
        assert_eq!(state.cancel(), None);
        assert!(!state.dialog_active);
    }

    #[test]
    fn cursor_edits_multibyte_text_by_char() {
        let mut state = TaskEditDialogState::default();
        state.create_a_new_task();
        typed(&mut state, "cafe");
        state.delete_char();
        typed(&mut state, "é ☕");
        state.move_cursor_left();
        state.delete_char();
        assert_eq!(state.content.text, "café☕");
    }

    #[test]
    fn dialog_ui_shows_category_and_help() {
        let mut state = TaskEditDialogState::default();
        state.create_a_new_task();
        let rendered: Vec<String> = get_task_edit_ui(&state)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(rendered[1].contains("< work >"));
        assert!(rendered.last().unwrap().contains("Enter - add"));
    }
}
