// Mouse drag-and-drop reordering of the task list
use crate::app::models::TaskId;

/// Vertical extent of a rendered list item, in terminal rows.
/// `top` may be negative for items scrolled above the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBox {
    pub id: TaskId,
    pub top: f64,
    pub height: f64,
}

// Picks the item whose vertical midpoint lies closest below the pointer.
// `None` means the pointer is below every midpoint: drop at the end.
pub fn drag_after_element<'a, I>(boxes: I, y: f64) -> Option<&'a TaskId>
where
    I: IntoIterator<Item = &'a ItemBox>,
{
    boxes
        .into_iter()
        .fold(
            (f64::NEG_INFINITY, None),
            |(closest_offset, closest), item| {
                let offset = y - item.top - item.height / 2.0;
                if offset < 0.0 && offset > closest_offset {
                    (offset, Some(&item.id))
                } else {
                    (closest_offset, closest)
                }
            },
        )
        .1
}

/// State of an in-progress mouse drag.
#[derive(Debug, Default)]
pub struct DragState {
    dragging: Option<TaskId>,
    drop_before: Option<TaskId>,
    // a press and release without motion is a click, not a drag
    moved: bool,
}

impl DragState {
    pub fn start(&mut self, id: TaskId) {
        self.dragging = Some(id);
        self.drop_before = None;
        self.moved = false;
    }

    pub fn is_active(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn dragging(&self) -> Option<&TaskId> {
        self.dragging.as_ref()
    }

    // Insertion hint shown while the button is held
    pub fn drop_before(&self) -> Option<&TaskId> {
        self.drop_before.as_ref()
    }

    /// Recompute the insertion point from the boxes of all visible items.
    pub fn hover(&mut self, boxes: &[ItemBox], y: f64) {
        let Some(dragging) = &self.dragging else {
            return;
        };
        let others = boxes.iter().filter(|item| &item.id != dragging);
        self.drop_before = drag_after_element(others, y).cloned();
        self.moved = true;
    }

    /// End the drag, returning `(moved, before)` for the reorder.
    pub fn finish(&mut self, boxes: &[ItemBox], y: f64) -> Option<(TaskId, Option<TaskId>)> {
        if !self.moved {
            self.cancel();
            return None;
        }
        self.hover(boxes, y);
        self.moved = false;
        let moved = self.dragging.take()?;
        Some((moved, self.drop_before.take()))
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
        self.drop_before = None;
        self.moved = false;
    }
}
