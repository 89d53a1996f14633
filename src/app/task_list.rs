use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::{debug, info};
use now::DateTimeNow;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};

use ratatui::widgets::*;

use crate::app::event::{AppEvent, EditOutcome};
use crate::app::models::{CategoryFilter, Task, TaskId};
use crate::app::storage::Storage;

use super::ui::App;

/// One rendered list entry. Pure data, derived from (collection, filter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub text: String,
    pub category: String,
    pub due: String,
    pub completed: bool,
    pub toggle_label: &'static str,
}

impl TaskRow {
    fn from_task(task: &Task) -> TaskRow {
        TaskRow {
            id: task.id.clone(),
            text: task.text.clone(),
            category: task.category.clone(),
            due: task.due_label(),
            completed: task.completed,
            toggle_label: if task.completed { "Undo" } else { "Complete" },
        }
    }
}

pub struct TaskList<'a> {
    pub state: ListState,
    pub items: Vec<Task>,
    filter: CategoryFilter,
    storage: &'a Storage,
}

impl<'a> TaskList<'a> {
    // Initialize a task list with items from the database
    pub fn with_items_from_storage(storage: &'a Storage) -> TaskList<'a> {
        TaskList {
            state: ListState::default(),
            items: storage.load_tasks(),
            filter: CategoryFilter::All,
            storage,
        }
    }

    // Single entry point for everything the UI wants done
    pub fn dispatch(&mut self, event: AppEvent) {
        debug!("event=dispatch module=task_list event={:?}", event);
        match event {
            AppEvent::AddTask {
                text,
                category,
                due_date,
            } => {
                self.add_task(text, category, due_date);
            }
            AppEvent::ToggleComplete(id) => self.toggle_complete(&id),
            AppEvent::EditText { id, outcome } => self.edit_text(&id, outcome),
            AppEvent::Delete(id) => self.delete_task(&id),
            AppEvent::SortByDueDate => self.sort_by_due_date(),
            AppEvent::SetFilter(filter) => self.set_category_filter(filter),
            AppEvent::Reorder { moved, before } => self.reorder(&moved, before.as_ref()),
        }
    }

    // Write the whole collection through to storage.
    // Failures are already logged by the storage layer and never reach the user.
    fn persist(&self) {
        let _ = self.storage.save_tasks(&self.items);
    }

    // Millisecond timestamp, bumped until it does not collide.
    fn next_id(&self) -> TaskId {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = TaskId(millis.to_string());
            if self.find(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }

    fn find(&self, id: &TaskId) -> Option<usize> {
        self.items.iter().position(|task| &task.id == id)
    }

    // Keep the selection inside the visible rows after the list changed
    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        match self.state.selected() {
            Some(_) if visible == 0 => self.state.select(None),
            Some(i) if i >= visible => self.state.select(Some(visible - 1)),
            _ => {}
        }
    }

    pub fn add_task(&mut self, text: String, category: String, due_date: String) -> TaskId {
        let id = self.next_id();
        self.items.push(Task {
            id: id.clone(),
            text,
            category,
            due_date,
            completed: false,
            created_at: Utc::now(),
        });
        self.persist();
        info!("event=task_add module=task_list status=ok id={}", id);
        id
    }

    // Change the state of the task to completed/to do; Save in database.
    pub fn toggle_complete(&mut self, id: &TaskId) {
        if let Some(i) = self.find(id) {
            let task = &mut self.items[i];
            task.completed = !task.completed;
            info!(
                "event=task_toggle module=task_list status=ok id={} completed={}",
                id, task.completed
            );
            self.persist();
        }
    }

    pub fn edit_text(&mut self, id: &TaskId, outcome: EditOutcome) {
        let text = match outcome {
            EditOutcome::Cancelled => {
                debug!("event=task_edit module=task_list status=cancelled id={}", id);
                return;
            }
            EditOutcome::Replaced(text) => text,
        };
        if let Some(i) = self.find(id) {
            self.items[i].text = text;
            self.persist();
            info!("event=task_edit module=task_list status=ok id={}", id);
        }
    }

    pub fn delete_task(&mut self, id: &TaskId) {
        let before = self.items.len();
        self.items.retain(|task| &task.id != id);
        if self.items.len() != before {
            self.persist();
            self.clamp_selection();
            info!("event=task_delete module=task_list status=ok id={}", id);
        }
    }

    // Stable; unparseable due dates go after every valid one
    pub fn sort_by_due_date(&mut self) {
        self.items.sort_by_key(|task| {
            let due = task.due();
            (due.is_none(), due)
        });
        self.persist();
        info!("event=task_sort module=task_list status=ok key=due_date");
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        debug!("event=filter_set module=task_list filter={}", filter.label());
        self.filter = filter;
        self.clamp_selection();
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn reorder(&mut self, moved: &TaskId, before: Option<&TaskId>) {
        if before == Some(moved) {
            return;
        }
        let Some(from) = self.find(moved) else {
            return;
        };
        if let Some(target) = before {
            if self.find(target).is_none() {
                return;
            }
        }

        let task = self.items.remove(from);
        let to = before
            .and_then(|target| self.find(target))
            .unwrap_or(self.items.len());
        self.items.insert(to, task);
        self.persist();
        info!(
            "event=task_reorder module=task_list status=ok id={} position={}",
            moved, to
        );
    }

    // Keyboard variant of drag and drop, relative to the visible neighbours
    pub fn move_selected_up(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        if i == 0 {
            return;
        }
        let (moved, before) = {
            let visible = self.visible();
            match (visible.get(i), visible.get(i - 1)) {
                (Some(moved), Some(before)) => (moved.id.clone(), before.id.clone()),
                _ => return,
            }
        };
        self.reorder(&moved, Some(&before));
        self.state.select(Some(i - 1));
    }

    pub fn move_selected_down(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        let (moved, before) = {
            let visible = self.visible();
            if i + 1 >= visible.len() {
                return;
            }
            (
                visible[i].id.clone(),
                visible.get(i + 2).map(|task| task.id.clone()),
            )
        };
        self.reorder(&moved, before.as_ref());
        self.state.select(Some(i + 1));
    }

    /// Tasks passing the active filter, in collection order.
    pub fn visible(&self) -> Vec<&Task> {
        self.items
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect()
    }

    pub fn render(&self) -> Vec<TaskRow> {
        self.visible().into_iter().map(TaskRow::from_task).collect()
    }

    // Move the selection to the next item
    pub fn next(&mut self) {
        let len = self.visible().len();
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 || i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item
    pub fn previous(&mut self) {
        let len = self.visible().len();
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 {
                    0
                } else if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn select_id(&mut self, id: &TaskId) {
        let position = self.visible().iter().position(|task| &task.id == id);
        if position.is_some() {
            self.state.select(position);
        }
    }

    // Get the selected task
    pub fn get_selected(&self) -> Option<&Task> {
        self.state
            .selected()
            .and_then(|i| self.visible().get(i).copied())
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.get_selected().map(|task| task.id.clone())
    }

    pub fn count_completed(&self) -> usize {
        self.items.iter().filter(|task| task.completed).count()
    }

    // Open tasks due before `start_of_today`
    pub fn count_overdue_at(&self, start_of_today: NaiveDateTime) -> usize {
        self.items
            .iter()
            .filter(|task| !task.completed && task.due().is_some_and(|due| due < start_of_today))
            .count()
    }

    pub fn count_overdue(&self) -> usize {
        self.count_overdue_at(start_of_day(Local::now()))
    }
}

// Due dates are wall-clock times, so "today" is the day on the local clock
fn start_of_day<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDateTime {
    now.beginning_of_day().naive_local()
}

// Build the UI (list) for task rows
// The row being dragged is dimmed; the drop target gets a marker
pub fn get_list_items_ui<'a>(
    rows: &'a [TaskRow],
    dragging: Option<&TaskId>,
    drop_before: Option<&TaskId>,
) -> Vec<ListItem<'a>> {
    rows.iter()
        .map(|row| {
            let mut lines = Vec::new();

            let text_style = if row.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };

            let marker = if drop_before == Some(&row.id) { "▸" } else { " " };
            lines.push(Line::from(vec![
                Span::from(marker).fg(Color::LightGreen),
                Span::from(if row.completed { "[✓] " } else { "[ ] " }),
                Span::styled(row.text.as_str(), text_style),
                Span::from(format!(" [{}]", row.category)).fg(category_color(&row.category)),
            ]));

            lines.push(Line::from(vec![
                Span::from(format!("     Due: {}", row.due)),
                Span::from(format!("   Enter: {}  e: Edit  x: Delete", row.toggle_label))
                    .fg(Color::DarkGray),
            ]));
            let item_style = if dragging == Some(&row.id) {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(lines).style(item_style)
        })
        .collect()
}

fn category_color(category: &str) -> Color {
    match category {
        "work" => Color::Cyan,
        "personal" => Color::Magenta,
        _ => Color::Yellow,
    }
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui<'a>(app: &App) -> Vec<Line<'a>> {
    let items = &app.items;
    vec![
        Line::from(format!("Filter: {}", items.filter().label())),
        Line::from(format!("Total tasks: {}", items.items.len())),
        Line::from(format!(
            "Open tasks: {}",
            items.items.len() - items.count_completed()
        )),
        Line::from(format!("Completed: {}", items.count_completed())),
        Line::from(format!("Overdue: {}", items.count_overdue())),
    ]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    vec![
        "Enter - toggle complete/undo".into(),
        "a - add a task".into(),
        "e - edit task text".into(),
        "x - delete a task".into(),
        "d - sort by due date".into(),
        "c - cycle category filter".into(),
        "K/J - move task up/down".into(),
        "mouse drag - reorder".into(),
        "q - quit".into(),
    ]
}
