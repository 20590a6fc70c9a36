use crate::surface::MarkerKind;

/// Default size of glyph markers created from the emoji group.
pub const GLYPH_MARKER_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerTypeItem {
    pub icon: &'static str,
    pub name: &'static str,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTypeGroup {
    pub name: &'static str,
    pub items: Vec<MarkerTypeItem>,
}

const fn item(icon: &'static str, name: &'static str, kind: MarkerKind) -> MarkerTypeItem {
    MarkerTypeItem { icon, name, kind }
}

const EMOJIS: [(&str, &str); 8] = [
    ("😀", "Grinning face"),
    ("👍", "Thumbs up"),
    ("👎", "Thumbs down"),
    ("❤", "Heart"),
    ("⭐", "Star"),
    ("❗", "Exclamation mark"),
    ("❓", "Question mark"),
    ("✅", "Check mark"),
];

/// Marker types offered by the editor toolbar, grouped as they appear.
pub fn default_groups() -> Vec<MarkerTypeGroup> {
    vec![
        MarkerTypeGroup {
            name: "Basic shapes",
            items: vec![
                item("▭", "Rectangle", MarkerKind::Frame),
                item("■", "Cover (filled rectangle)", MarkerKind::Cover),
                item("▤", "Highlight", MarkerKind::Highlight),
                item("◯", "Ellipse", MarkerKind::EllipseFrame),
                item("⬤", "Ellipse (filled)", MarkerKind::Ellipse),
            ],
        },
        MarkerTypeGroup {
            name: "Lines",
            items: vec![
                item("➡", "Arrow", MarkerKind::Arrow),
                item("╱", "Line", MarkerKind::Line),
                item("📏", "Measure", MarkerKind::Measurement),
                item("〰", "Curve", MarkerKind::Curve),
            ],
        },
        MarkerTypeGroup {
            name: "Text",
            items: vec![
                item("T", "Text", MarkerKind::Text),
                item("💬", "Callout", MarkerKind::Callout),
                item("🗔", "Captioned frame", MarkerKind::CaptionFrame),
            ],
        },
        MarkerTypeGroup {
            name: "Advanced shapes",
            items: vec![
                item("✏", "Freehand", MarkerKind::Freehand),
                item("🖍", "Highlighter", MarkerKind::Highlighter),
                item("⬟", "Polygon", MarkerKind::Polygon),
            ],
        },
        MarkerTypeGroup {
            name: "Emojis",
            items: EMOJIS
                .iter()
                .map(|&(glyph, name)| item(glyph, name, MarkerKind::CustomImage))
                .collect(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_group_is_non_empty() {
        let groups = default_groups();
        assert_eq!(groups.len(), 5);
        assert!(groups.iter().all(|g| !g.items.is_empty()));
    }

    #[test]
    fn only_the_emoji_group_creates_glyph_markers() {
        for group in default_groups() {
            let glyphs = group
                .items
                .iter()
                .filter(|i| i.kind == MarkerKind::CustomImage)
                .count();
            if group.name == "Emojis" {
                assert_eq!(glyphs, group.items.len());
            } else {
                assert_eq!(glyphs, 0);
            }
        }
    }
}
