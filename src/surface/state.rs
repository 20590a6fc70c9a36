use serde::{Deserialize, Serialize};

/// Snapshot format version understood by the marker area.
pub const STATE_VERSION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// RGBA color, serialized as `#rrggbb`, `#rrggbbaa` or `transparent`.
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn from_hex(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("transparent") {
            return Some(Self::TRANSPARENT);
        }
        let hex = raw.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.is_transparent() {
            "transparent".to_string()
        } else if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scales alpha by `opacity` (clamped to 0..=1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn to_image_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Marker types the marker area can instantiate.
pub enum MarkerKind {
    #[serde(rename = "FrameMarker")]
    Frame,
    #[serde(rename = "CoverMarker")]
    Cover,
    #[serde(rename = "HighlightMarker")]
    Highlight,
    #[serde(rename = "EllipseFrameMarker")]
    EllipseFrame,
    #[serde(rename = "EllipseMarker")]
    Ellipse,
    #[serde(rename = "ArrowMarker")]
    Arrow,
    #[serde(rename = "LineMarker")]
    Line,
    #[serde(rename = "MeasurementMarker")]
    Measurement,
    #[serde(rename = "CurveMarker")]
    Curve,
    #[serde(rename = "TextMarker")]
    Text,
    #[serde(rename = "CalloutMarker")]
    Callout,
    #[serde(rename = "CaptionFrameMarker")]
    CaptionFrame,
    #[serde(rename = "FreehandMarker")]
    Freehand,
    #[serde(rename = "HighlighterMarker")]
    Highlighter,
    #[serde(rename = "PolygonMarker")]
    Polygon,
    #[serde(rename = "CustomImageMarker")]
    CustomImage,
}

impl MarkerKind {
    pub fn type_name(self) -> &'static str {
        match self {
            MarkerKind::Frame => "FrameMarker",
            MarkerKind::Cover => "CoverMarker",
            MarkerKind::Highlight => "HighlightMarker",
            MarkerKind::EllipseFrame => "EllipseFrameMarker",
            MarkerKind::Ellipse => "EllipseMarker",
            MarkerKind::Arrow => "ArrowMarker",
            MarkerKind::Line => "LineMarker",
            MarkerKind::Measurement => "MeasurementMarker",
            MarkerKind::Curve => "CurveMarker",
            MarkerKind::Text => "TextMarker",
            MarkerKind::Callout => "CalloutMarker",
            MarkerKind::CaptionFrame => "CaptionFrameMarker",
            MarkerKind::Freehand => "FreehandMarker",
            MarkerKind::Highlighter => "HighlighterMarker",
            MarkerKind::Polygon => "PolygonMarker",
            MarkerKind::CustomImage => "CustomImageMarker",
        }
    }

    /// The editor family that edits markers of this kind.
    pub fn family(self) -> EditorFamily {
        match self {
            MarkerKind::Frame | MarkerKind::EllipseFrame => EditorFamily::ShapeOutline,
            MarkerKind::Cover | MarkerKind::Highlight | MarkerKind::Ellipse => {
                EditorFamily::ShapeFilled
            }
            MarkerKind::Arrow | MarkerKind::Line | MarkerKind::Measurement | MarkerKind::Curve => {
                EditorFamily::Linear
            }
            MarkerKind::Text => EditorFamily::Text,
            MarkerKind::Callout => EditorFamily::Callout,
            MarkerKind::CaptionFrame => EditorFamily::CaptionFrame,
            MarkerKind::Freehand | MarkerKind::Highlighter => EditorFamily::Freehand,
            MarkerKind::Polygon => EditorFamily::Polygon,
            MarkerKind::CustomImage => EditorFamily::Image,
        }
    }

    /// Properties a freshly created marker of this kind starts with.
    pub fn default_properties(self) -> MarkerProperties {
        let mut props = MarkerProperties::default();
        match self {
            MarkerKind::Cover => props.fill_color = Color::BLACK,
            MarkerKind::Highlight => {
                props.fill_color = Color::rgb(255, 255, 0);
                props.opacity = 0.5;
            }
            MarkerKind::Ellipse => props.fill_color = props.stroke_color,
            MarkerKind::Highlighter => {
                props.stroke_color = Color::rgb(255, 255, 0);
                props.stroke_width = 10.0;
                props.opacity = 0.5;
            }
            MarkerKind::Callout | MarkerKind::CaptionFrame => props.fill_color = Color::WHITE,
            _ => {}
        }
        props
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Capability set of a marker editor; property panels decide applicability on it.
pub enum EditorFamily {
    ShapeOutline,
    ShapeFilled,
    Linear,
    Text,
    Callout,
    CaptionFrame,
    Freehand,
    Polygon,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Editable visual properties shared by all marker editors.
pub struct MarkerProperties {
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub stroke_dasharray: String,
    pub fill_color: Color,
    pub font_family: String,
    pub color: Color,
    pub opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for MarkerProperties {
    fn default() -> Self {
        Self {
            stroke_color: crate::color_picker::DEFAULT_COLORS[0],
            stroke_width: 3.0,
            stroke_dasharray: "0".to_string(),
            fill_color: Color::TRANSPARENT,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            color: crate::color_picker::DEFAULT_COLORS[0],
            opacity: 1.0,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One marker inside an [`AnnotationState`]. Linear markers store their end
/// point as `left + width`, `top + height`.
pub struct MarkerState {
    #[serde(rename = "typeName")]
    pub kind: MarkerKind,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub properties: MarkerProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Serialized annotation snapshot captured from and restored into a marker area.
pub struct AnnotationState {
    pub version: u32,
    pub width: f32,
    pub height: f32,
    pub markers: Vec<MarkerState>,
}

impl AnnotationState {
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            version: STATE_VERSION,
            width,
            height,
            markers: Vec::new(),
        }
    }

    /// Rejects snapshots the marker area cannot reconstruct.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version != STATE_VERSION {
            anyhow::bail!(
                "unsupported annotation state version {} (expected {})",
                self.version,
                STATE_VERSION
            );
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            anyhow::bail!(
                "annotation state has invalid dimensions {}x{}",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}
