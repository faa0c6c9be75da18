// Windows pointer injection through SendInput.

use std::thread;
use std::time::Duration;

use log::{debug, error};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_MOUSE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MOVE,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

use crate::error::{PathError, Result};
use crate::geometry::Point;
use crate::pointer::PointerDevice;

/// Drives the real cursor. Points are canvas coordinates, shifted by `origin`
/// to land on the screen.
#[derive(Debug, Clone)]
pub struct SendInputPointer {
    origin: Point,
    move_interval: Duration,
}

impl SendInputPointer {
    pub fn new(origin: Point, move_interval: Duration) -> Self {
        SendInputPointer {
            origin,
            move_interval,
        }
    }
}

/// Converts a screen coordinate to the 0-65535 range SendInput expects for
/// absolute moves on the primary monitor.
fn screen_to_normalized(x: i32, y: i32) -> Result<(i32, i32)> {
    let screen_width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
    let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
    if screen_width <= 0 || screen_height <= 0 {
        return Err(PathError::PointerInput("GetSystemMetrics returned no screen size".to_string()));
    }

    let normalized_x = (x as i64 * 65535 / screen_width as i64) as i32;
    let normalized_y = (y as i64 * 65535 / screen_height as i64) as i32;
    Ok((normalized_x, normalized_y))
}

fn send_mouse_input(dx: i32, dy: i32, flags: u32, what: &str) -> Result<()> {
    let mut input: INPUT = unsafe { std::mem::zeroed() };
    input.r#type = INPUT_MOUSE;

    unsafe {
        let mi = &mut input.Anonymous.mi;
        mi.dx = dx;
        mi.dy = dy;
        mi.mouseData = 0;
        mi.dwFlags = flags;
        mi.time = 0;
        mi.dwExtraInfo = 0;

        let inputs_sent = SendInput(1, &input, std::mem::size_of::<INPUT>() as i32);
        if inputs_sent != 1 {
            error!("SendInput failed for {} (sent {} inputs)", what, inputs_sent);
            return Err(PathError::PointerInput(format!("Failed to send {} input", what)));
        }
    }
    Ok(())
}

impl PointerDevice for SendInputPointer {
    fn move_to(&mut self, point: Point) -> Result<()> {
        let screen_x = point.x + self.origin.x;
        let screen_y = point.y + self.origin.y;
        let (normalized_x, normalized_y) = screen_to_normalized(screen_x, screen_y)?;

        debug!(
            "Moving mouse to screen ({}, {}) -> normalized ({}, {})",
            screen_x, screen_y, normalized_x, normalized_y
        );
        send_mouse_input(
            normalized_x,
            normalized_y,
            MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE,
            "mouse move",
        )?;

        // Pacing so the target app sees intermediate positions, not a jump
        if !self.move_interval.is_zero() {
            thread::sleep(self.move_interval);
        }
        Ok(())
    }

    fn press(&mut self) -> Result<()> {
        send_mouse_input(0, 0, MOUSEEVENTF_LEFTDOWN, "mouse down")
    }

    fn release(&mut self) -> Result<()> {
        send_mouse_input(0, 0, MOUSEEVENTF_LEFTUP, "mouse up")
    }
}
