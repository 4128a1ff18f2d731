use egui::{Pos2, Vec2};

use crate::dimensions::RenderedDimensions;
use crate::selection::{DisplayRect, SelectionStore};

/// Aspect ratio enforced on the live rectangle while the lock is enabled.
pub const LOCKED_ASPECT_RATIO: f32 = 16.0 / 9.0;

/// A pointer event in page-display coordinates (relative to the page's
/// on-screen origin). Release events carry no position: a commit uses the
/// last live rectangle, not the release point.
#[derive(Debug, Clone, Copy)]
pub enum PointerEvent {
    Down { pos: Pos2 },
    Moved { pos: Pos2 },
    Up,
    /// Pointer exited the page area. Handled identically to `Up` in every
    /// state so interaction can never get stuck.
    Left,
}

/// Mutation requested by the controller, applied to the store by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionCommand {
    Commit {
        page: u16,
        rect: DisplayRect,
        displayed: RenderedDimensions,
    },
    Move {
        page: u16,
        id: u64,
        left: f32,
        top: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InteractionState {
    Idle,
    Drawing {
        anchor: Pos2,
        live: Option<DisplayRect>,
    },
    Dragging {
        id: u64,
        offset: Vec2,
    },
}

/// Pointer state machine: `Idle`, `Drawing` a new rectangle, or `Dragging` an
/// existing selection. At most one of the two interactions is active at any
/// instant; the live rectangle is transient and never assigned an id.
#[derive(Debug)]
pub struct InteractionController {
    state: InteractionState,
    aspect_lock: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            aspect_lock: false,
        }
    }

    pub fn aspect_lock(&self) -> bool {
        self.aspect_lock
    }

    pub fn set_aspect_lock(&mut self, enabled: bool) {
        self.aspect_lock = enabled;
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// The in-progress rectangle, for overlay drawing only.
    pub fn live_rect(&self) -> Option<DisplayRect> {
        match self.state {
            InteractionState::Drawing { live, .. } => live,
            _ => None,
        }
    }

    /// The page changed while drawing: discard the live rectangle. Committed
    /// selections on other pages are unaffected. Dragging cannot span a page
    /// change because the UI disables navigation while interacting.
    pub fn page_changed(&mut self) {
        if matches!(self.state, InteractionState::Drawing { .. }) {
            log::debug!("page change discarded in-progress selection");
            self.state = InteractionState::Idle;
        }
    }

    /// Feed one pointer event; returns the store mutation it implies, if any.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        page: u16,
        displayed: RenderedDimensions,
        store: &SelectionStore,
    ) -> Option<SelectionCommand> {
        match event {
            PointerEvent::Down { pos } => {
                // A press on an existing selection starts a drag and must not
                // also start a new rectangle. Topmost (latest drawn) wins.
                if let Some(sel) = store.list(page).iter().rev().find(|s| s.rect().contains(pos.x, pos.y)) {
                    self.state = InteractionState::Dragging {
                        id: sel.id,
                        offset: pos - Pos2::new(sel.left, sel.top),
                    };
                } else {
                    let anchor = Pos2::new(
                        pos.x.clamp(0.0, displayed.width),
                        pos.y.clamp(0.0, displayed.height),
                    );
                    self.state = InteractionState::Drawing { anchor, live: None };
                }
                None
            }
            PointerEvent::Moved { pos } => match self.state {
                InteractionState::Drawing { anchor, .. } => {
                    // Bounding box of the clamped anchor and the raw pointer;
                    // commit-time clamping happens in the store.
                    let mut rect = DisplayRect::new(
                        anchor.x.min(pos.x),
                        anchor.y.min(pos.y),
                        (pos.x - anchor.x).abs(),
                        (pos.y - anchor.y).abs(),
                    );
                    if self.aspect_lock {
                        rect = constrain_aspect(rect);
                    }
                    self.state = InteractionState::Drawing { anchor, live: Some(rect) };
                    None
                }
                InteractionState::Dragging { id, offset } => Some(SelectionCommand::Move {
                    page,
                    id,
                    left: pos.x - offset.x,
                    top: pos.y - offset.y,
                }),
                InteractionState::Idle => None,
            },
            PointerEvent::Up | PointerEvent::Left => {
                let finished = std::mem::replace(&mut self.state, InteractionState::Idle);
                match finished {
                    // The minimum-size gate lives in the store; an undersized
                    // rectangle simply produces no command worth applying,
                    // but forwarding it keeps the gate in one place.
                    InteractionState::Drawing { live: Some(rect), .. } => Some(SelectionCommand::Commit {
                        page,
                        rect,
                        displayed,
                    }),
                    _ => None,
                }
            }
        }
    }
}

/// Shrink a rectangle onto exactly 16:9, keeping its top-left fixed. Wider
/// than 16:9 shrinks the width; taller or equal shrinks the height.
/// Zero-sized boxes are returned unmodified to avoid dividing by zero.
fn constrain_aspect(rect: DisplayRect) -> DisplayRect {
    if rect.width == 0.0 || rect.height == 0.0 {
        return rect;
    }
    let mut rect = rect;
    if rect.width / rect.height > LOCKED_ASPECT_RATIO {
        rect.width = rect.height * LOCKED_ASPECT_RATIO;
    } else {
        rect.height = rect.width / LOCKED_ASPECT_RATIO;
    }
    rect
}
