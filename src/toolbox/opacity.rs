use crate::surface::{EditorFamily, MarkerArea};

use super::panel::{PanelFrame, ToolboxPanel, delegate_panel_frame};

pub struct OpacityPanel {
    frame: PanelFrame<f32>,
}

impl OpacityPanel {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            frame: PanelFrame::new(title, icon),
        }
    }

    fn applies(_family: EditorFamily) -> bool {
        true
    }

    pub fn opacity(&self) -> Option<f32> {
        self.frame.controls().copied()
    }
}

impl ToolboxPanel for OpacityPanel {
    delegate_panel_frame!();

    fn get_ui(&mut self) {
        self.frame.get_ui(|| 1.0);
    }

    fn update_content(&mut self, area: &dyn MarkerArea) {
        let Some(props) = self.frame.begin_sync(area, Self::applies) else {
            return;
        };
        if let Some(opacity) = self.frame.controls_mut() {
            *opacity = props.opacity;
        }
    }

    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool {
        let Some(opacity) = self.opacity() else {
            return false;
        };
        self.frame.apply_group(
            area,
            opacity.clamp(0.0, 1.0),
            |props| props.opacity,
            |props, opacity| props.opacity = opacity,
        )
    }

    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        let Some(opacity) = self.frame.controls_mut() else {
            return;
        };
        let changed = ui
            .add(egui::Slider::new(opacity, 0.0..=1.0).step_by(0.1))
            .changed();
        if changed {
            self.frame.mark_dirty();
            self.apply_values(area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MarkerKind;
    use crate::surface::memory::MemoryMarkerArea;

    #[test]
    fn visible_for_any_selected_marker() {
        let mut panel = OpacityPanel::new("Opacity", "◐");
        panel.get_ui();
        let mut area = MemoryMarkerArea::new();
        panel.update_visibility(&area);
        assert!(!panel.is_visible());

        area.create_marker(MarkerKind::CustomImage);
        panel.update_visibility(&area);
        assert!(panel.is_visible());
    }

    #[test]
    fn writes_clamped_opacity() {
        let mut panel = OpacityPanel::new("Opacity", "◐");
        panel.get_ui();
        let mut area = MemoryMarkerArea::new();
        let id = area.create_marker(MarkerKind::Frame).unwrap();
        panel.update_content(&area);

        *panel.frame.edit().unwrap() = 1.5;
        assert!(panel.apply_values(&mut area));
        assert_eq!(area.marker_properties(id).unwrap().opacity, 1.0);
    }
}
