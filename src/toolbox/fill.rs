use crate::color_picker::ColorPicker;
use crate::surface::{Color, EditorFamily, MarkerArea};

use super::panel::{PanelFrame, ToolboxPanel, delegate_panel_frame};

pub struct FillPanel {
    frame: PanelFrame<ColorPicker>,
}

impl FillPanel {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            frame: PanelFrame::new(title, icon),
        }
    }

    fn applies(family: EditorFamily) -> bool {
        matches!(
            family,
            EditorFamily::ShapeFilled
                | EditorFamily::Callout
                | EditorFamily::Polygon
                | EditorFamily::CaptionFrame
        )
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.frame.controls().map(ColorPicker::current_color)
    }
}

impl ToolboxPanel for FillPanel {
    delegate_panel_frame!();

    fn get_ui(&mut self) {
        self.frame.get_ui(ColorPicker::with_transparent);
    }

    fn update_content(&mut self, area: &dyn MarkerArea) {
        let Some(props) = self.frame.begin_sync(area, Self::applies) else {
            return;
        };
        if let Some(picker) = self.frame.controls_mut() {
            picker.set_current_color(props.fill_color);
        }
    }

    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool {
        let Some(color) = self.fill_color() else {
            return false;
        };
        self.frame.apply_group(
            area,
            color,
            |props| props.fill_color,
            |props, color| props.fill_color = color,
        )
    }

    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        let picked = self.frame.controls_mut().and_then(|picker| picker.ui(ui));
        if picked.is_some() {
            self.frame.mark_dirty();
            self.apply_values(area);
        }
    }
}
