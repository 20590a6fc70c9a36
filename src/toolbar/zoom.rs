use crate::surface::ZoomSurface;

pub const ZOOM_STEP: f32 = 0.1;
/// Zoom out stops before reaching this level.
pub const MIN_ZOOM: f32 = 0.2;

pub fn zoom_in<S: ZoomSurface + ?Sized>(surface: &mut S) {
    surface.set_zoom_level(surface.zoom_level() + ZOOM_STEP);
}

pub fn zoom_out<S: ZoomSurface + ?Sized>(surface: &mut S) {
    let next = surface.zoom_level() - ZOOM_STEP;
    if next > MIN_ZOOM {
        surface.set_zoom_level(next);
    }
}

/// Auto-zooms when either auto-zoom direction is enabled, otherwise resets to 1.0.
pub fn zoom_reset<S: ZoomSurface + ?Sized>(surface: &mut S) {
    if surface.auto_zoom_in() || surface.auto_zoom_out() {
        surface.auto_zoom();
    } else {
        surface.set_zoom_level(1.0);
    }
}
