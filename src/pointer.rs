// Pointer-drag rendering of generated paths.

use log::{debug, warn};

use crate::error::Result;
use crate::geometry::{Path, Point};

/// Minimal mouse surface needed to draw: absolute moves and the left button.
pub trait PointerDevice {
    fn move_to(&mut self, point: Point) -> Result<()>;
    fn press(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

impl<D: PointerDevice + ?Sized> PointerDevice for Box<D> {
    fn move_to(&mut self, point: Point) -> Result<()> {
        (**self).move_to(point)
    }

    fn press(&mut self) -> Result<()> {
        (**self).press()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

/// Press at the first point, move through the rest, release at the last.
///
/// The button is released even if a move fails halfway, so the device is
/// never left dragging.
pub fn trace<D: PointerDevice + ?Sized>(device: &mut D, path: &Path) -> Result<()> {
    debug!("Tracing path of {} points from {:?}", path.len(), path.first());
    device.move_to(path.first())?;
    device.press()?;

    let moved = path
        .points()
        .iter()
        .skip(1)
        .try_for_each(|&point| device.move_to(point));

    match moved {
        Ok(()) => device.release(),
        Err(e) => {
            if let Err(release_err) = device.release() {
                warn!("Failed to release pointer after aborted drag: {}", release_err);
            }
            Err(e)
        }
    }
}

/// Single click at each point, in order.
pub fn click_points<D: PointerDevice + ?Sized>(device: &mut D, points: &[Point]) -> Result<()> {
    debug!("Clicking {} points", points.len());
    for &point in points {
        device.move_to(point)?;
        device.press()?;
        device.release()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Move { x: i32, y: i32 },
    Press,
    Release,
}

/// Device that only records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingPointer {
    events: Vec<PointerEvent>,
}

impl RecordingPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PointerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl PointerDevice for RecordingPointer {
    fn move_to(&mut self, point: Point) -> Result<()> {
        self.events.push(PointerEvent::Move {
            x: point.x,
            y: point.y,
        });
        Ok(())
    }

    fn press(&mut self) -> Result<()> {
        self.events.push(PointerEvent::Press);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.events.push(PointerEvent::Release);
        Ok(())
    }
}
