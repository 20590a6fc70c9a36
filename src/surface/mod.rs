//! Contracts of the annotation engine the shell components drive.
//!
//! The editor and viewer shells never own annotation semantics: markers,
//! geometry, undo history and rasterization live behind [`MarkerArea`],
//! [`MarkerView`] and [`Rasterizer`]. [`memory`] and [`raster`] provide the
//! in-process engine used by the binary and the tests.

pub mod memory;
pub mod raster;
pub mod state;

use std::future::Future;
use std::sync::mpsc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

pub use state::{AnnotationState, Color, EditorFamily, MarkerKind, MarkerProperties, MarkerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Signals published by a marker area to its subscribers.
pub enum AreaEvent {
    MarkerSelect(MarkerId),
    MarkerDeselect(MarkerId),
    MarkerCreate(MarkerId),
    /// Undo/redo availability or marker content changed.
    AreaStateChange,
}

/// Zoom controls shared by the editing and the display surfaces.
pub trait ZoomSurface {
    fn zoom_level(&self) -> f32;
    fn set_zoom_level(&mut self, level: f32);
    fn auto_zoom_in(&self) -> bool;
    fn auto_zoom_out(&self) -> bool;
    fn set_auto_zoom(&mut self, zoom_in: bool, zoom_out: bool);
    /// Fits the target into the last known viewport, limited by the auto-zoom flags.
    fn auto_zoom(&mut self);
}

/// Editable annotation surface.
pub trait MarkerArea: ZoomSurface {
    /// Opens a new event stream. Every subscriber receives every event.
    fn subscribe(&mut self) -> mpsc::Receiver<AreaEvent>;

    fn switch_to_select_mode(&mut self);
    fn create_marker(&mut self, kind: MarkerKind) -> Option<MarkerId>;
    /// Sets the glyph and default size of a custom image marker.
    fn set_custom_image(&mut self, id: MarkerId, glyph: &str, width: f32, height: f32);
    fn delete_selected_markers(&mut self);

    fn is_undo_possible(&self) -> bool;
    fn is_redo_possible(&self) -> bool;
    fn undo(&mut self);
    fn redo(&mut self);

    fn current_marker(&self) -> Option<MarkerId>;
    fn marker_kind(&self, id: MarkerId) -> Option<MarkerKind>;
    fn marker_properties(&self, id: MarkerId) -> Option<MarkerProperties>;
    fn set_marker_properties(&mut self, id: MarkerId, properties: MarkerProperties);

    fn target_image(&self) -> Option<&DynamicImage>;
    fn set_target_image(&mut self, image: DynamicImage);

    fn get_state(&self) -> AnnotationState;
    fn restore_state(&mut self, state: &AnnotationState) -> anyhow::Result<()>;

    /// Draws the surface and handles its pointer interaction.
    fn ui(&mut self, ui: &mut egui::Ui);
}

/// Read-only annotation surface.
pub trait MarkerView: ZoomSurface {
    fn target_image(&self) -> Option<&DynamicImage>;
    fn set_target_image(&mut self, image: DynamicImage);
    fn show(&mut self, state: &AnnotationState) -> anyhow::Result<()>;
    fn ui(&mut self, ui: &mut egui::Ui);
}

/// Produces an encoded image from an annotation snapshot.
pub trait Rasterizer {
    fn rasterize(
        &self,
        state: &AnnotationState,
        target: Option<&DynamicImage>,
        settings: &RenderSettings,
    ) -> impl Future<Output = anyhow::Result<RenderedImage>>;
}

/// Editor family of the currently selected marker, if any.
pub fn selected_family<A: MarkerArea + ?Sized>(area: &A) -> Option<EditorFamily> {
    let id = area.current_marker()?;
    area.marker_kind(id).map(MarkerKind::family)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageType {
    #[default]
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ImageType {
    pub fn mime(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Rasterization options passed through to the [`Rasterizer`].
pub struct RenderSettings {
    /// Render at the target image's natural size instead of the surface size.
    pub natural_size: bool,
    pub image_type: ImageType,
    /// Encoder quality in `0.0..=1.0`; only lossy formats use it.
    pub image_quality: f32,
    pub markers_only: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            natural_size: false,
            image_type: ImageType::Png,
            image_quality: 1.0,
            markers_only: false,
            width: None,
            height: None,
        }
    }
}

impl RenderSettings {
    /// Explicit output size; width and height only apply together.
    pub fn explicit_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn mime(&self) -> &'static str {
        self.image_type.mime()
    }
}
