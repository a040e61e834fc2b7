use glam::Vec2;

/// Identifies which device is driving a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    /// A touch contact, keyed by the host's touch id.
    Touch(u64),
}

/// A raw input event in canvas pixel coordinates, origin top-left.
///
/// The host translates its native events into these; the tracker never reads
/// device state itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    /// The pointer left the canvas.
    Leave,
    TouchStart { id: u64, position: Vec2 },
    TouchMove { id: u64, position: Vec2 },
    /// Touch lifted or cancelled.
    TouchEnd { id: u64 },
}

impl PointerEvent {
    pub fn source(&self) -> PointerSource {
        match *self {
            Self::Down(_) | Self::Move(_) | Self::Up | Self::Leave => PointerSource::Mouse,
            Self::TouchStart { id, .. } | Self::TouchMove { id, .. } | Self::TouchEnd { id } => {
                PointerSource::Touch(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_events_report_mouse_source() {
        assert_eq!(PointerEvent::Down(Vec2::ZERO).source(), PointerSource::Mouse);
        assert_eq!(PointerEvent::Leave.source(), PointerSource::Mouse);
    }

    #[test]
    fn touch_events_carry_their_id() {
        let e = PointerEvent::TouchMove {
            id: 7,
            position: Vec2::new(1.0, 2.0),
        };
        assert_eq!(e.source(), PointerSource::Touch(7));
        assert_eq!(PointerEvent::TouchEnd { id: 3 }.source(), PointerSource::Touch(3));
    }
}
