use serde::{Deserialize, Serialize};

use super::CaptureMask;

/// Rescales a pointer delta measured on the preview surface into native
/// frame pixels. The preview is usually scaled, so the two spaces differ.
pub fn to_native_delta(
    display_delta: (f64, f64),
    display_size: (f64, f64),
    native_size: (u32, u32),
) -> (f64, f64) {
    let (display_w, display_h) = display_size;
    if !(display_w > 0.0 && display_h > 0.0) {
        return (0.0, 0.0);
    }
    let scale_x = native_size.0 as f64 / display_w;
    let scale_y = native_size.1 as f64 / display_h;
    (display_delta.0 * scale_x, display_delta.1 * scale_y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragMode {
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { mode: DragMode, last: (f64, f64) },
}

/// Pointer gesture state for the mask overlay, independent of any toolkit.
///
/// The host forwards discrete pointer events in display coordinates together
/// with the current preview size; each move applies the delta since the
/// previous event.
#[derive(Debug, Clone, Default)]
pub struct MaskInteraction {
    state: DragState,
}

impl MaskInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, point: (f64, f64), mode: DragMode) {
        self.state = DragState::Dragging { mode, last: point };
    }

    /// Returns true when the mask changed.
    pub fn pointer_move(
        &mut self,
        point: (f64, f64),
        display_size: (f64, f64),
        mask: &mut CaptureMask,
    ) -> bool {
        let DragState::Dragging { mode, last } = self.state else {
            return false;
        };
        if !mask.is_active() {
            return false;
        }

        let display_delta = (point.0 - last.0, point.1 - last.1);
        let (dx, dy) = to_native_delta(display_delta, display_size, mask.frame_size());

        match mode {
            DragMode::Move => mask.translate(dx, dy),
            DragMode::Resize => mask.resize(dx, dy),
        }

        self.state = DragState::Dragging { mode, last: point };
        true
    }

    /// Ends the gesture; also used when the pointer leaves the surface.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_delta_scales_per_axis() {
        let delta = to_native_delta((10.0, 10.0), (960.0, 270.0), (1920, 1080));
        assert_eq!(delta, (20.0, 40.0));
    }

    #[test]
    fn native_delta_ignores_empty_display() {
        assert_eq!(to_native_delta((5.0, 5.0), (0.0, 100.0), (1920, 1080)), (0.0, 0.0));
    }

    #[test]
    fn drag_moves_mask_in_native_pixels() {
        let mut mask = CaptureMask::new(1920, 1080, true);
        let mut interaction = MaskInteraction::new();

        interaction.pointer_down((100.0, 100.0), DragMode::Move);
        assert!(interaction.pointer_move((110.0, 105.0), (960.0, 540.0), &mut mask));
        assert!(interaction.pointer_move((120.0, 110.0), (960.0, 540.0), &mut mask));
        interaction.pointer_up();

        assert_eq!((mask.x(), mask.y()), (140.0, 120.0));
        assert_eq!(interaction.state(), DragState::Idle);
    }

    #[test]
    fn resize_drag_changes_size_only() {
        let mut mask = CaptureMask::new(1920, 1080, true);
        let mut interaction = MaskInteraction::new();

        interaction.pointer_down((0.0, 0.0), DragMode::Resize);
        interaction.pointer_move((-50.0, 25.0), (1920.0, 1080.0), &mut mask);

        assert_eq!((mask.x(), mask.y()), (100.0, 100.0));
        assert_eq!((mask.width(), mask.height()), (350.0, 425.0));
    }

    #[test]
    fn moves_without_drag_or_with_inactive_mask_are_ignored() {
        let mut mask = CaptureMask::new(1920, 1080, true);
        let mut interaction = MaskInteraction::new();
        assert!(!interaction.pointer_move((50.0, 50.0), (960.0, 540.0), &mut mask));

        mask.set_active(false);
        interaction.pointer_down((0.0, 0.0), DragMode::Move);
        assert!(!interaction.pointer_move((50.0, 50.0), (960.0, 540.0), &mut mask));
        assert_eq!((mask.x(), mask.y()), (100.0, 100.0));
    }
}
