use crate::color_picker::{ColorPicker, DEFAULT_COLORS};
use crate::surface::{Color, EditorFamily, MarkerArea, MarkerProperties};

use super::panel::{PanelFrame, ToolboxPanel, delegate_panel_frame};

/// Font stacks offered by the family selector: (label, CSS font-family).
pub const FONT_FAMILIES: [(&str, &str); 5] = [
    ("Sans-serif", "Helvetica, Arial, sans-serif"),
    ("Serif", "Times, 'Times New Roman', serif"),
    ("Monospace", "Courier, monospace"),
    ("Cursive", "cursive"),
    ("Fantasy", "fantasy"),
];

pub struct FontControls {
    family: String,
    picker: ColorPicker,
}

#[derive(Debug, Clone, PartialEq)]
struct FontValues {
    family: String,
    color: Color,
}

impl FontValues {
    fn read(props: &MarkerProperties) -> Self {
        Self {
            family: props.font_family.clone(),
            color: props.color,
        }
    }

    fn write(props: &mut MarkerProperties, values: Self) {
        props.font_family = values.family;
        props.color = values.color;
    }
}

/// Font family and text color of text-bearing markers.
pub struct FontPanel {
    frame: PanelFrame<FontControls>,
}

impl FontPanel {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            frame: PanelFrame::new(title, icon),
        }
    }

    fn applies(family: EditorFamily) -> bool {
        matches!(
            family,
            EditorFamily::Text | EditorFamily::Callout | EditorFamily::CaptionFrame
        )
    }

    pub fn font_family(&self) -> Option<&str> {
        self.frame.controls().map(|c| c.family.as_str())
    }
}

fn family_label(family: &str) -> &str {
    FONT_FAMILIES
        .iter()
        .find(|(_, css)| *css == family)
        .map_or(family, |&(label, _)| label)
}

impl ToolboxPanel for FontPanel {
    delegate_panel_frame!();

    fn get_ui(&mut self) {
        self.frame.get_ui(|| FontControls {
            family: FONT_FAMILIES[0].1.to_string(),
            picker: ColorPicker::new(&DEFAULT_COLORS),
        });
    }

    fn update_content(&mut self, area: &dyn MarkerArea) {
        let Some(props) = self.frame.begin_sync(area, Self::applies) else {
            return;
        };
        if let Some(controls) = self.frame.controls_mut() {
            controls.family = props.font_family;
            controls.picker.set_current_color(props.color);
        }
    }

    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool {
        let Some(values) = self.frame.controls().map(|c| FontValues {
            family: c.family.clone(),
            color: c.picker.current_color(),
        }) else {
            return false;
        };
        self.frame
            .apply_group(area, values, FontValues::read, FontValues::write)
    }

    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        let Some(controls) = self.frame.controls_mut() else {
            return;
        };
        let mut edited = false;

        ui.label("Font");
        egui::ComboBox::from_id_salt("annotate_font_family")
            .selected_text(family_label(&controls.family).to_string())
            .show_ui(ui, |ui| {
                for (label, css) in FONT_FAMILIES {
                    let active = controls.family == css;
                    if ui.selectable_label(active, label).clicked() && !active {
                        controls.family = css.to_string();
                        edited = true;
                    }
                }
            });

        ui.label("Text Color");
        edited |= controls.picker.ui(ui).is_some();

        if edited {
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

    fn built() -> FontPanel {
        let mut panel = FontPanel::new("Font", "A");
        panel.get_ui();
        panel
    }

    #[test]
    fn family_label_falls_back_to_the_raw_stack() {
        assert_eq!(family_label("Courier, monospace"), "Monospace");
        assert_eq!(family_label("Comic Sans MS"), "Comic Sans MS");
    }

    #[test]
    fn visible_for_text_bearing_markers() {
        let mut panel = built();
        let mut area = MemoryMarkerArea::new();
        for (kind, visible) in [
            (MarkerKind::Text, true),
            (MarkerKind::Callout, true),
            (MarkerKind::CaptionFrame, true),
            (MarkerKind::Frame, false),
            (MarkerKind::CustomImage, false),
        ] {
            area.create_marker(kind);
            panel.update_visibility(&area);
            assert_eq!(panel.is_visible(), visible, "{kind:?}");
        }
    }

    #[test]
    fn applies_family_and_color_together() {
        let mut panel = built();
        let mut area = MemoryMarkerArea::new();
        let id = area.create_marker(MarkerKind::Text).unwrap();
        panel.update_content(&area);
        assert_eq!(panel.font_family(), Some(FONT_FAMILIES[0].1));

        let controls = panel.frame.edit().unwrap();
        controls.family = FONT_FAMILIES[2].1.to_string();
        controls.picker.select(DEFAULT_COLORS[5]);
        assert!(panel.apply_values(&mut area));

        let props = area.marker_properties(id).unwrap();
        assert_eq!(props.font_family, "Courier, monospace");
        assert_eq!(props.color, DEFAULT_COLORS[5]);
    }
}
