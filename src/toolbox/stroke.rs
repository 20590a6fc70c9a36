use crate::color_picker::{ColorPicker, DEFAULT_COLORS};
use crate::surface::{Color, EditorFamily, MarkerArea, MarkerProperties};

use super::panel::{PanelFrame, ToolboxPanel, delegate_panel_frame};

const MAX_STROKE_WIDTH: f32 = 40.0;

/// Dash presets offered by the style picker, as SVG dasharrays.
const STROKE_STYLES: [(&str, &str, &str); 3] = [
    ("0", "━", "Solid"),
    ("4,4", "╍", "Dashed"),
    ("2,3", "┅", "Dotted"),
];

pub struct StrokeControls {
    width: f32,
    dasharray: String,
    picker: ColorPicker,
}

#[derive(Debug, Clone, PartialEq)]
struct StrokeValues {
    color: Color,
    width: f32,
    dasharray: String,
}

impl StrokeValues {
    fn read(props: &MarkerProperties) -> Self {
        Self {
            color: props.stroke_color,
            width: props.stroke_width,
            dasharray: props.stroke_dasharray.clone(),
        }
    }

    fn write(props: &mut MarkerProperties, values: Self) {
        props.stroke_color = values.color;
        props.stroke_width = values.width;
        props.stroke_dasharray = values.dasharray;
    }
}

/// Stroke width, dash style and color of outlined and linear markers.
pub struct StrokePanel {
    frame: PanelFrame<StrokeControls>,
}

impl StrokePanel {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            frame: PanelFrame::new(title, icon),
        }
    }

    fn applies(family: EditorFamily) -> bool {
        matches!(
            family,
            EditorFamily::ShapeOutline
                | EditorFamily::Linear
                | EditorFamily::Callout
                | EditorFamily::Freehand
                | EditorFamily::Polygon
                | EditorFamily::CaptionFrame
        )
    }

    pub fn stroke_width(&self) -> Option<f32> {
        self.frame.controls().map(|c| c.width)
    }
}

impl ToolboxPanel for StrokePanel {
    delegate_panel_frame!();

    fn get_ui(&mut self) {
        self.frame.get_ui(|| StrokeControls {
            width: 3.0,
            dasharray: STROKE_STYLES[0].0.to_string(),
            picker: ColorPicker::new(&DEFAULT_COLORS),
        });
    }

    fn update_content(&mut self, area: &dyn MarkerArea) {
        let Some(props) = self.frame.begin_sync(area, Self::applies) else {
            return;
        };
        if let Some(controls) = self.frame.controls_mut() {
            controls.width = props.stroke_width;
            controls.dasharray = props.stroke_dasharray;
            controls.picker.set_current_color(props.stroke_color);
        }
    }

    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool {
        let Some(values) = self.frame.controls().map(|c| StrokeValues {
            color: c.picker.current_color(),
            width: c.width,
            dasharray: c.dasharray.clone(),
        }) else {
            return false;
        };
        self.frame
            .apply_group(area, values, StrokeValues::read, StrokeValues::write)
    }

    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        let Some(controls) = self.frame.controls_mut() else {
            return;
        };
        let mut edited = false;

        ui.label("Width");
        edited |= ui
            .add(egui::Slider::new(&mut controls.width, 0.0..=MAX_STROKE_WIDTH).step_by(1.0))
            .changed();

        ui.horizontal(|ui| {
            ui.label("Style");
            for (dasharray, glyph, name) in STROKE_STYLES {
                let active = controls.dasharray == dasharray;
                if ui.selectable_label(active, glyph).on_hover_text(name).clicked() && !active {
                    controls.dasharray = dasharray.to_string();
                    edited = true;
                }
            }
        });

        ui.label("Stroke Color");
        edited |= controls.picker.ui(ui).is_some();

        if edited {
            self.frame.mark_dirty();
            self.apply_values(area);
        }
    }
}
