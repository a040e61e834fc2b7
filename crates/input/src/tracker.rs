use crate::event::{PointerEvent, PointerSource};
use cubespin_common::SceneConfig;
use cubespin_kernel::{Scene, SceneError};
use glam::Vec2;
use std::time::Duration;

/// Live drag state. At most one drag exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        target: usize,
        last_position: Vec2,
        source: PointerSource,
    },
}

impl DragSession {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Index of the object being dragged, if any.
    pub fn target(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. } => Some(*target),
        }
    }
}

/// Converts pointer and touch events into angular velocity on the dragged object.
///
/// Owns the [`DragSession`] exclusively. Velocity is written straight into the
/// scene; a drag replaces the target's velocity rather than adding to it.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    session: DragSession,
    /// Radians per pixel of pointer travel.
    sensitivity: f32,
    canvas_width: f32,
}

impl InteractionTracker {
    pub fn new(sensitivity: f32, canvas_width: f32) -> Self {
        Self {
            session: DragSession::Idle,
            sensitivity,
            canvas_width,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.sensitivity, config.canvas_width as f32)
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    /// Track a canvas resize so target selection uses the current width.
    pub fn set_canvas_width(&mut self, width: f32) {
        self.canvas_width = width;
    }

    /// Pick the object under a pointer at canvas x-coordinate `x`.
    ///
    /// The canvas is split into `count` equal vertical strips, left to right.
    /// With two objects this is the half-width test: `x < width / 2` selects 0.
    /// Coordinates outside the canvas snap to the nearest strip.
    pub fn select_target(&self, x: f32, count: usize) -> usize {
        if count <= 1 || self.canvas_width <= 0.0 {
            return 0;
        }
        let strip = self.canvas_width / count as f32;
        // float-to-int casts saturate, so negative and NaN land on 0
        ((x / strip).floor() as usize).min(count - 1)
    }

    /// Apply one input event at session time `now`.
    ///
    /// Events that do not fit the current state (a move while idle, a second
    /// touch while another is dragging) are ignored.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        scene: &mut Scene,
        now: Duration,
    ) -> Result<(), SceneError> {
        match event {
            PointerEvent::Down(position) | PointerEvent::TouchStart { position, .. } => {
                self.begin(position, event.source(), scene)
            }
            PointerEvent::Move(position) | PointerEvent::TouchMove { position, .. } => {
                self.drag(position, event.source(), scene, now)
            }
            PointerEvent::Up | PointerEvent::Leave | PointerEvent::TouchEnd { .. } => {
                self.end(event.source());
                Ok(())
            }
        }
    }

    fn begin(
        &mut self,
        position: Vec2,
        source: PointerSource,
        scene: &Scene,
    ) -> Result<(), SceneError> {
        if self.session.is_dragging() {
            tracing::debug!(?source, "ignoring pointer down during an active drag");
            return Ok(());
        }
        let target = self.select_target(position.x, scene.len());
        scene.object(target)?;
        self.session = DragSession::Dragging {
            target,
            last_position: position,
            source,
        };
        tracing::debug!(object = target, ?source, "drag started");
        Ok(())
    }

    fn drag(
        &mut self,
        position: Vec2,
        source: PointerSource,
        scene: &mut Scene,
        now: Duration,
    ) -> Result<(), SceneError> {
        let DragSession::Dragging {
            target,
            last_position,
            source: active,
        } = self.session
        else {
            return Ok(());
        };
        if source != active {
            return Ok(());
        }

        let delta = position - last_position;
        let velocity = Vec2::new(delta.y * self.sensitivity, delta.x * self.sensitivity);
        match scene.object_mut(target) {
            Ok(object) => object.drive(velocity, now),
            Err(e) => {
                tracing::warn!("dropping drag: {e}");
                self.session = DragSession::Idle;
                return Err(e);
            }
        }
        self.session = DragSession::Dragging {
            target,
            last_position: position,
            source,
        };
        Ok(())
    }

    fn end(&mut self, source: PointerSource) {
        match self.session {
            DragSession::Dragging {
                target,
                source: active,
                ..
            } if active == source => {
                self.session = DragSession::Idle;
                tracing::debug!(object = target, "drag ended");
            }
            _ => {}
        }
    }
}
