use image::DynamicImage;

use crate::surface::{AnnotationState, MarkerView};
use crate::theme::Theme;
use crate::toolbar::ViewerToolbar;

/// Read-only shell: zoom toolbar over a display surface.
pub struct AnnotationViewer<V: MarkerView> {
    view: V,
    toolbar: ViewerToolbar,
    theme: Theme,
}

impl<V: MarkerView> AnnotationViewer<V> {
    /// The view fits its content in both directions by default.
    pub fn new(mut view: V) -> Self {
        view.set_auto_zoom(true, true);
        Self {
            view,
            toolbar: ViewerToolbar::new(),
            theme: Theme::default(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn target_image(&self) -> Option<&DynamicImage> {
        self.view.target_image()
    }

    pub fn set_target_image(&mut self, image: DynamicImage) {
        self.view.set_target_image(image);
        self.view.auto_zoom();
    }

    pub fn show(&mut self, state: &AnnotationState) -> anyhow::Result<()> {
        self.view.show(state)?;
        tracing::debug!(markers = state.markers.len(), "viewer showing state");
        Ok(())
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.theme.scope(ui, |ui| {
            egui::TopBottomPanel::top("annotate_viewer_toolbar").show_inside(ui, |ui| {
                self.toolbar.ui(ui, &mut self.view);
            });
            egui::CentralPanel::default().show_inside(ui, |ui| {
                self.view.ui(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::MemoryMarkerArea;
    use crate::surface::{MarkerKind, MarkerProperties, MarkerState, ZoomSurface};

    fn state() -> AnnotationState {
        let mut state = AnnotationState::empty(100.0, 50.0);
        state.markers.push(MarkerState {
            kind: MarkerKind::Ellipse,
            left: 10.0,
            top: 10.0,
            width: 20.0,
            height: 10.0,
            properties: MarkerProperties::default(),
            glyph: None,
        });
        state
    }

    #[test]
    fn auto_zoom_is_enabled_at_construction() {
        let viewer = AnnotationViewer::new(MemoryMarkerArea::view_only());
        assert!(viewer.view().auto_zoom_in());
        assert!(viewer.view().auto_zoom_out());
    }

    #[test]
    fn show_hands_the_state_to_the_view() {
        let mut viewer = AnnotationViewer::new(MemoryMarkerArea::view_only());
        viewer.set_target_image(DynamicImage::new_rgba8(200, 100));
        viewer.show(&state()).unwrap();

        assert_eq!(viewer.view().marker_count(), 1);
        assert!(viewer.target_image().is_some());
    }

    #[test]
    fn malformed_state_is_rejected() {
        let mut viewer = AnnotationViewer::new(MemoryMarkerArea::view_only());
        let mut bad = state();
        bad.height = f32::NAN;
        assert!(viewer.show(&bad).is_err());
        assert_eq!(viewer.view().marker_count(), 0);
    }

    #[test]
    fn theme_changes_keep_the_view() {
        let mut viewer = AnnotationViewer::new(MemoryMarkerArea::view_only());
        viewer.show(&state()).unwrap();
        viewer.set_theme(Theme::Dark);
        assert_eq!(viewer.theme().toggled(), Theme::Light);
        assert_eq!(viewer.view().marker_count(), 1);
    }
}
