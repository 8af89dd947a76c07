//! Hit-testing and drag bookkeeping shared by modes that move things around.
//!
//! A mode implements `DragHandler` for whatever owns the draggable items and
//! keeps a `DragTracker` for the gesture in progress.

use std::fmt::Debug;
use crate::canvas::transform::{CoordinateBundle, TransformManager};
use crate::config::AnnotatorConfig;
use crate::types::CursorStyle;

pub trait DragHandler {
    type Target: Clone + PartialEq + Debug;

    fn find_target_at(
        &self,
        position: &CoordinateBundle,
        transform: &TransformManager,
        config: &AnnotatorConfig,
    ) -> Option<Self::Target>;

    fn on_drag_start(&mut self, target: &Self::Target, position: &CoordinateBundle);

    fn on_drag_update(&mut self, target: &Self::Target, current: &CoordinateBundle, start: &CoordinateBundle);

    fn on_drag_end(&mut self, target: &Self::Target, position: &CoordinateBundle);

    fn cursor_for(&self, hovered: Option<&Self::Target>, dragging: bool) -> CursorStyle {
        match (hovered, dragging) {
            (_, true) => CursorStyle::Grabbing,
            (Some(_), false) => CursorStyle::Grab,
            (None, false) => CursorStyle::Crosshair,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragSession<T> {
    pub target: T,
    pub start: CoordinateBundle,
    pub last: CoordinateBundle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragTracker<T> {
    session: Option<DragSession<T>>,
    hover: Option<T>,
}

impl<T> Default for DragTracker<T> {
    fn default() -> Self {
        Self { session: None, hover: None }
    }
}

impl<T: Clone + PartialEq + Debug> DragTracker<T> {
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession<T>> {
        self.session.as_ref()
    }

    pub fn hovered(&self) -> Option<&T> {
        self.hover.as_ref()
    }

    /// Start dragging whatever lies under `position`. Returns false when nothing was hit.
    pub fn try_begin<H: DragHandler<Target = T>>(
        &mut self,
        handler: &mut H,
        position: &CoordinateBundle,
        transform: &TransformManager,
        config: &AnnotatorConfig,
    ) -> bool {
        let Some(target) = handler.find_target_at(position, transform, config) else {
            return false;
        };
        log::debug!("drag start on {:?}", target);
        handler.on_drag_start(&target, position);
        self.hover = Some(target.clone());
        self.session = Some(DragSession {
            target,
            start: *position,
            last: *position,
        });
        true
    }

    pub fn update<H: DragHandler<Target = T>>(&mut self, handler: &mut H, position: &CoordinateBundle) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        handler.on_drag_update(&session.target, position, &session.start);
        session.last = *position;
        true
    }

    pub fn finish<H: DragHandler<Target = T>>(&mut self, handler: &mut H, position: &CoordinateBundle) -> Option<T> {
        let session = self.session.take()?;
        handler.on_drag_end(&session.target, position);
        log::debug!("drag end on {:?}", session.target);
        Some(session.target)
    }

    /// Refresh the hovered target. Returns true if it changed.
    pub fn hover<H: DragHandler<Target = T>>(
        &mut self,
        handler: &H,
        position: &CoordinateBundle,
        transform: &TransformManager,
        config: &AnnotatorConfig,
    ) -> bool {
        let hit = handler.find_target_at(position, transform, config);
        let changed = hit != self.hover;
        self.hover = hit;
        changed
    }

    /// Drop the session without calling `on_drag_end`. Returns the abandoned session.
    pub fn cancel(&mut self) -> Option<DragSession<T>> {
        self.hover = None;
        self.session.take()
    }

    pub fn cursor<H: DragHandler<Target = T>>(&self, handler: &H) -> CursorStyle {
        handler.cursor_for(self.hover.as_ref(), self.is_dragging())
    }
}
