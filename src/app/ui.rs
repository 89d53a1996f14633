use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::debug;
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::drag::{DragState, ItemBox};
use crate::app::event::AppEvent;
use crate::app::models::TaskId;
use crate::app::storage::Storage;
use crate::app::{task_edit::*, task_list::*};

// Every list item is drawn on two terminal rows
const ROW_HEIGHT: u16 = 2;

pub struct App<'a> {
    pub items: TaskList<'a>,
    pub task_edit_dialog_state: TaskEditDialogState,
    pub drag: DragState,
    // Where the list was last drawn, for mouse hit testing
    list_area: Rect,
}

impl<'a> App<'a> {
    pub fn new(storage: &'a Storage) -> App<'a> {
        App {
            items: TaskList::with_items_from_storage(storage),
            task_edit_dialog_state: TaskEditDialogState::default(),
            drag: DragState::default(),
            list_area: Rect::default(),
        }
    }

    // Inside of the bordered list block
    fn list_inner(&self) -> Rect {
        let area = self.list_area;
        Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(1),
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
        )
    }

    // Vertical extents of all visible items, including ones scrolled out of view
    fn item_boxes(&self) -> Vec<ItemBox> {
        let inner = self.list_inner();
        let offset = self.items.state.offset() as f64;
        let height = f64::from(ROW_HEIGHT);
        self.items
            .visible()
            .iter()
            .enumerate()
            .map(|(i, task)| ItemBox {
                id: task.id.clone(),
                top: f64::from(inner.y) + (i as f64 - offset) * height,
                height,
            })
            .collect()
    }

    fn row_at(&self, column: u16, row: u16) -> Option<TaskId> {
        let inner = self.list_inner();
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return None;
        }
        let index = self.items.state.offset() + usize::from((row - inner.y) / ROW_HEIGHT);
        self.items.visible().get(index).map(|task| task.id.clone())
    }

    // Returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.task_edit_dialog_state.dialog_active {
            // Handle input for the task dialog
            match code {
                KeyCode::Down => self.task_edit_dialog_state.move_cursor_down(),
                KeyCode::Up => self.task_edit_dialog_state.move_cursor_up(),
                KeyCode::Esc => {
                    if let Some(event) = self.task_edit_dialog_state.cancel() {
                        self.items.dispatch(event);
                    }
                }
                KeyCode::Enter => {
                    let event = self.task_edit_dialog_state.submit();
                    self.items.dispatch(event);
                }
                KeyCode::Left => self.task_edit_dialog_state.move_cursor_left(),
                KeyCode::Right => self.task_edit_dialog_state.move_cursor_right(),
                KeyCode::Backspace => self.task_edit_dialog_state.delete_char(),
                KeyCode::Char(to_insert) => self.task_edit_dialog_state.input(to_insert),
                _ => {}
            }
            return false;
        }

        // Handle input for the task list navigation, sorting and state change
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.items.unselect(),
            KeyCode::Down => self.items.next(),
            KeyCode::Up => self.items.previous(),
            KeyCode::Char('a') => self.task_edit_dialog_state.create_a_new_task(),
            KeyCode::Char('e') => {
                if let Some(task) = self.items.get_selected() {
                    self.task_edit_dialog_state.edit_task(task);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.items.selected_id() {
                    self.items.dispatch(AppEvent::Delete(id));
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.items.selected_id() {
                    self.items.dispatch(AppEvent::ToggleComplete(id));
                }
            }
            KeyCode::Char('d') => self.items.dispatch(AppEvent::SortByDueDate),
            KeyCode::Char('c') => {
                let next = self.items.filter().next();
                self.items.dispatch(AppEvent::SetFilter(next));
            }
            KeyCode::Char('K') => self.items.move_selected_up(),
            KeyCode::Char('J') => self.items.move_selected_down(),
            _ => {}
        }
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.task_edit_dialog_state.dialog_active {
            return;
        }
        // pointer sits in the middle of its terminal row
        let y = f64::from(mouse.row) + 0.5;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = self.row_at(mouse.column, mouse.row) {
                    self.items.select_id(&id);
                    self.drag.start(id);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag.is_active() {
                    let boxes = self.item_boxes();
                    self.drag.hover(&boxes, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let boxes = self.item_boxes();
                if let Some((moved, before)) = self.drag.finish(&boxes, y) {
                    debug!("event=drag_drop module=ui id={} before={:?}", moved, before);
                    self.items.dispatch(AppEvent::Reorder {
                        moved: moved.clone(),
                        before,
                    });
                    self.items.select_id(&moved);
                }
            }
            _ => {}
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key.code) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, app: &mut App) {
    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(f.size());

    // DRAW LEFT PART
    app.list_area = chunks[0];
    let rows = app.items.render();
    let title = format!("Tasks ({})", app.items.filter().label());
    let task_list = List::new(get_list_items_ui(
        &rows,
        app.drag.dragging(),
        app.drag.drop_before(),
    ))
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(
        Style::default()
            .bg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol(">> ");

    f.render_stateful_widget(task_list, chunks[0], &mut app.items.state);

    // DRAW RIGHT PART
    if app.task_edit_dialog_state.dialog_active {
        let title = if app.task_edit_dialog_state.is_editing() {
            "Edit Task"
        } else {
            "Add Task"
        };
        let dialog = Paragraph::new(get_task_edit_ui(&app.task_edit_dialog_state))
            .block(Block::new().title(title).borders(Borders::ALL))
            .style(Style::new().white());

        f.render_widget(dialog, chunks[1]);
    } else {
        // If not editing, display instructions and statistics in vertically split layout
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let instructions = Paragraph::new(get_instructions_ui())
            .block(Block::new().title("Commands").borders(Borders::ALL))
            .style(Style::new().white());

        let statistics = Paragraph::new(get_statistics_ui(app))
            .block(Block::new().title("Statistics").borders(Borders::ALL))
            .style(Style::new().white());

        f.render_widget(instructions, right_side[0]);
        f.render_widget(statistics, right_side[1]);
    }
}
