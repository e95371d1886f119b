//! Drag gesture state machine for the roster table.
//!
//! Pointer and keyboard input drive `idle -> dragging -> (dropped | cancelled)`.
//! Which drop zone a gesture is over is decided by a [`CollisionPolicy`]; the
//! machine only produces a [`DragOutcome`], which the caller hands to
//! [`Roster::move_row`](crate::roster::Roster::move_row).

use std::cmp::Ordering;

use crate::models::RowId;
use crate::roster::MoveTarget;

/// Pointer travel, in pixels, before a press turns into a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A rendered drop target: a row, or the placeholder of an empty project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZone {
    pub target: MoveTarget,
    pub rect: Rect,
}

pub trait CollisionPolicy {
    /// Picks the zone the pointer is over, if any.
    fn detect(&self, pointer: Point, zones: &[DropZone]) -> Option<MoveTarget>;
}

/// Zone whose center is nearest to the pointer. Only an empty zone list
/// yields no target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestCenter;

impl CollisionPolicy for ClosestCenter {
    fn detect(&self, pointer: Point, zones: &[DropZone]) -> Option<MoveTarget> {
        zones
            .iter()
            .map(|zone| (zone.target, zone.rect.center().distance(pointer)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(target, _)| target)
    }
}

/// Zone that contains the pointer; releasing between zones cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerWithin;

impl CollisionPolicy for PointerWithin {
    fn detect(&self, pointer: Point, zones: &[DropZone]) -> Option<MoveTarget> {
        zones
            .iter()
            .find(|zone| zone.rect.contains(pointer))
            .map(|zone| zone.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKey {
    Space,
    Enter,
    ArrowUp,
    ArrowDown,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub active: RowId,
    pub input: InputSource,
    pub pointer: Option<Point>,
    pub over: Option<MoveTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer pressed on a row but not yet past the activation distance.
    Pending { active: RowId, origin: Point },
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped { active: RowId, target: MoveTarget },
    Cancelled { active: RowId },
}

impl DragOutcome {
    /// The move to apply, if the gesture ended on a target.
    pub fn into_move(self) -> Option<(RowId, MoveTarget)> {
        match self {
            DragOutcome::Dropped { active, target } => Some((active, target)),
            DragOutcome::Cancelled { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController<P = ClosestCenter> {
    policy: P,
    activation_distance: f64,
    state: DragState,
}

impl Default for DragController<ClosestCenter> {
    fn default() -> Self {
        Self::new(ClosestCenter)
    }
}

impl<P: CollisionPolicy> DragController<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            state: DragState::Idle,
        }
    }

    pub fn with_activation_distance(mut self, distance: f64) -> Self {
        self.activation_distance = distance.max(0.0);
        self
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Presses the pointer on a row. Ignored unless idle.
    pub fn pointer_down(&mut self, row_id: RowId, at: Point) -> bool {
        if !matches!(self.state, DragState::Idle) {
            return false;
        }
        self.state = DragState::Pending {
            active: row_id,
            origin: at,
        };
        true
    }

    pub fn pointer_move(&mut self, at: Point, zones: &[DropZone]) {
        match self.state {
            DragState::Pending { active, origin }
                if origin.distance(at) >= self.activation_distance =>
            {
                tracing::debug!(row_id = %active, "pointer drag started");
                self.state = DragState::Dragging(DragSession {
                    active,
                    input: InputSource::Pointer,
                    pointer: Some(at),
                    over: self.policy.detect(at, zones),
                });
            }
            DragState::Dragging(mut session) if session.input == InputSource::Pointer => {
                session.pointer = Some(at);
                session.over = self.policy.detect(at, zones);
                self.state = DragState::Dragging(session);
            }
            _ => {}
        }
    }

    /// Releases the pointer. A press that never activated ends quietly.
    pub fn pointer_up(&mut self, at: Point, zones: &[DropZone]) -> Option<DragOutcome> {
        match self.state {
            DragState::Pending { .. } => {
                self.state = DragState::Idle;
                None
            }
            DragState::Dragging(session) if session.input == InputSource::Pointer => {
                let over = self.policy.detect(at, zones);
                Some(self.finish(session.active, over))
            }
            _ => None,
        }
    }

    /// Keyboard drag: Space/Enter picks up the focused row and later drops
    /// it, arrows walk the zones in vertical order, Escape cancels.
    pub fn key_down(
        &mut self,
        key: DragKey,
        focused: Option<RowId>,
        zones: &[DropZone],
    ) -> Option<DragOutcome> {
        match (self.state, key) {
            (DragState::Idle, DragKey::Space | DragKey::Enter) => {
                let active = focused?;
                tracing::debug!(row_id = %active, "keyboard drag started");
                self.state = DragState::Dragging(DragSession {
                    active,
                    input: InputSource::Keyboard,
                    pointer: None,
                    over: Some(MoveTarget::Row { row_id: active }),
                });
                None
            }
            (DragState::Dragging(session), DragKey::Escape) => Some(self.cancel_session(session)),
            (DragState::Pending { .. }, DragKey::Escape) => {
                self.state = DragState::Idle;
                None
            }
            (DragState::Dragging(session), DragKey::Space | DragKey::Enter)
                if session.input == InputSource::Keyboard =>
            {
                Some(self.finish(session.active, session.over))
            }
            (DragState::Dragging(mut session), DragKey::ArrowUp | DragKey::ArrowDown)
                if session.input == InputSource::Keyboard =>
            {
                let step = if key == DragKey::ArrowDown { 1 } else { -1 };
                session.over = step_zone(session.over, zones, step).or(session.over);
                self.state = DragState::Dragging(session);
                None
            }
            _ => None,
        }
    }

    /// Aborts whatever gesture is in progress.
    pub fn cancel(&mut self) -> Option<DragOutcome> {
        match self.state {
            DragState::Dragging(session) => Some(self.cancel_session(session)),
            DragState::Pending { .. } => {
                self.state = DragState::Idle;
                None
            }
            DragState::Idle => None,
        }
    }

    fn cancel_session(&mut self, session: DragSession) -> DragOutcome {
        self.state = DragState::Idle;
        tracing::debug!(row_id = %session.active, "drag cancelled");
        DragOutcome::Cancelled {
            active: session.active,
        }
    }

    fn finish(&mut self, active: RowId, over: Option<MoveTarget>) -> DragOutcome {
        self.state = DragState::Idle;
        match over {
            Some(target) => DragOutcome::Dropped { active, target },
            None => {
                tracing::debug!(row_id = %active, "drag released outside any drop zone");
                DragOutcome::Cancelled { active }
            }
        }
    }
}

// Next zone above or below `current` by vertical center.
fn step_zone(current: Option<MoveTarget>, zones: &[DropZone], step: isize) -> Option<MoveTarget> {
    let mut ordered = zones.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| {
        a.rect
            .center()
            .y
            .partial_cmp(&b.rect.center().y)
            .unwrap_or(Ordering::Equal)
    });

    let index = current.and_then(|target| ordered.iter().position(|zone| zone.target == target));
    let next = match index {
        Some(index) => index.checked_add_signed(step)?,
        None if step > 0 => 0,
        None => ordered.len().checked_sub(1)?,
    };
    ordered.get(next).map(|zone| zone.target)
}
