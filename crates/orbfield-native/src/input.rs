use orbfield_core::InputEvent;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseScrollDelta};

// Browser-style pixels per wheel notch, so line and pixel deltas feel alike.
const WHEEL_LINE_PIXELS: f32 = 100.0;

#[derive(Default, Clone, Copy)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
    pub seen: bool,
}

impl MouseState {
    pub fn button(&mut self, state: ElementState) {
        self.down = state == ElementState::Pressed;
    }

    /// Record a cursor move in logical pixels; yields a drag while the button
    /// is held.
    pub fn moved(
        &mut self,
        position: PhysicalPosition<f64>,
        scale_factor: f64,
    ) -> Option<InputEvent> {
        let logical = position.to_logical::<f64>(scale_factor);
        let (x, y) = (logical.x as f32, logical.y as f32);
        let drag = (self.down && self.seen).then(|| InputEvent::Drag {
            dx: x - self.x,
            dy: y - self.y,
        });
        self.x = x;
        self.y = y;
        self.seen = true;
        drag
    }
}

/// Scroll toward the user (down) is positive, zooming out.
#[inline]
pub fn wheel_event(delta: MouseScrollDelta) -> InputEvent {
    let delta = match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PIXELS,
        MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
    };
    InputEvent::Wheel { delta }
}
