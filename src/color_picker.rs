use crate::surface::Color;

/// Palette offered by every color picker.
pub const DEFAULT_COLORS: [Color; 10] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0xf9, 0x73, 0x16),
    Color::rgb(0xea, 0xb3, 0x08),
    Color::rgb(0x22, 0xc5, 0x5e),
    Color::rgb(0x06, 0xb6, 0xd4),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x8b, 0x5c, 0xf6),
    Color::rgb(0xec, 0x48, 0x99),
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0xff, 0xff),
];

const SWATCH: f32 = 18.0;
const SWATCHES_PER_ROW: usize = 6;

/// Fixed-palette color selector.
pub struct ColorPicker {
    colors: Vec<Color>,
    current: Color,
}

impl ColorPicker {
    pub fn new(colors: &[Color]) -> Self {
        Self {
            colors: colors.to_vec(),
            current: colors.first().copied().unwrap_or(Color::TRANSPARENT),
        }
    }

    /// Default palette with a leading "no color" swatch.
    pub fn with_transparent() -> Self {
        let mut colors = vec![Color::TRANSPARENT];
        colors.extend_from_slice(&DEFAULT_COLORS);
        Self::new(&colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn current_color(&self) -> Color {
        self.current
    }

    /// Reflects an externally read color without reporting a selection.
    pub fn set_current_color(&mut self, color: Color) {
        self.current = color;
    }

    /// Picks `color`, returning it when it differs from the current one.
    pub fn select(&mut self, color: Color) -> Option<Color> {
        if self.current == color {
            return None;
        }
        self.current = color;
        Some(color)
    }

    /// Draws the swatch grid. Returns the color the user picked this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<Color> {
        let mut picked = None;
        egui::Grid::new(ui.next_auto_id())
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                for (idx, color) in self.colors.iter().copied().enumerate() {
                    let selected = color == self.current;
                    let label = if color.is_transparent() { "∅" } else { "" };
                    let stroke_color = if selected {
                        ui.visuals().selection.stroke.color
                    } else {
                        ui.visuals().widgets.noninteractive.bg_stroke.color
                    };
                    let button = egui::Button::new(label)
                        .fill(color.to_color32())
                        .stroke(egui::Stroke::new(if selected { 2.0 } else { 1.0 }, stroke_color))
                        .min_size(egui::vec2(SWATCH, SWATCH));
                    if ui.add(button).on_hover_text(color.to_hex()).clicked() {
                        picked = Some(color);
                    }
                    if (idx + 1) % SWATCHES_PER_ROW == 0 {
                        ui.end_row();
                    }
                }
            });
        picked.and_then(|color| self.select(color))
    }
}
