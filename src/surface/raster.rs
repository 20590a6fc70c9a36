use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_ellipse_mut, draw_filled_rect_mut, draw_hollow_ellipse_mut, draw_hollow_rect_mut,
    draw_line_segment_mut,
};
use imageproc::rect::Rect;

use super::{
    AnnotationState, EditorFamily, ImageType, MarkerKind, MarkerState, Rasterizer, RenderSettings,
    RenderedImage,
};

/// Flattens markers onto the target image (or a transparent canvas) and
/// encodes the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRasterizer;

impl Rasterizer for ImageRasterizer {
    async fn rasterize(
        &self,
        state: &AnnotationState,
        target: Option<&DynamicImage>,
        settings: &RenderSettings,
    ) -> anyhow::Result<RenderedImage> {
        state.validate()?;
        let (width, height) = output_size(state, target, settings);

        let mut canvas = if settings.markers_only {
            RgbaImage::new(width, height)
        } else {
            let target =
                target.ok_or_else(|| anyhow::anyhow!("no target image to render onto"))?;
            target
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgba8()
        };

        let sx = width as f32 / state.width;
        let sy = height as f32 / state.height;
        for marker in &state.markers {
            draw_marker(&mut canvas, marker, sx, sy);
        }

        let bytes = encode(canvas, settings)?;
        tracing::debug!(
            width,
            height,
            mime = settings.image_type.mime(),
            bytes = bytes.len(),
            "rasterized annotation"
        );
        Ok(RenderedImage {
            image_type: settings.image_type,
            bytes,
        })
    }
}

fn output_size(
    state: &AnnotationState,
    target: Option<&DynamicImage>,
    settings: &RenderSettings,
) -> (u32, u32) {
    if let Some(size) = settings.explicit_size() {
        return size;
    }
    if settings.natural_size {
        if let Some(target) = target {
            return (target.width().max(1), target.height().max(1));
        }
    }
    (
        (state.width.round() as u32).max(1),
        (state.height.round() as u32).max(1),
    )
}

fn draw_marker(canvas: &mut RgbaImage, marker: &MarkerState, sx: f32, sy: f32) {
    let props = &marker.properties;
    let stroke = props.stroke_color.with_opacity(props.opacity).to_image_rgba();
    let fill = props.fill_color.with_opacity(props.opacity).to_image_rgba();
    let x0 = marker.left * sx;
    let y0 = marker.top * sy;
    let x1 = (marker.left + marker.width) * sx;
    let y1 = (marker.top + marker.height) * sy;
    let thickness = ((props.stroke_width * sx.min(sy)).round() as i32).max(1);

    match marker.kind.family() {
        EditorFamily::Linear | EditorFamily::Freehand | EditorFamily::Polygon => {
            for offset in 0..thickness {
                let d = (offset - thickness / 2) as f32;
                draw_line_segment_mut(canvas, (x0, y0 + d), (x1, y1 + d), stroke);
            }
        }
        // Glyphs and embedded images have no frame of their own.
        EditorFamily::Text | EditorFamily::Image => {}
        _ => {
            let left = x0.min(x1).round() as i32;
            let top = y0.min(y1).round() as i32;
            let w = ((x1 - x0).abs().round() as u32).max(1);
            let h = ((y1 - y0).abs().round() as u32).max(1);
            let ellipse = matches!(marker.kind, MarkerKind::Ellipse | MarkerKind::EllipseFrame);

            if !props.fill_color.is_transparent() {
                if ellipse {
                    draw_filled_ellipse_mut(
                        canvas,
                        (left + w as i32 / 2, top + h as i32 / 2),
                        w as i32 / 2,
                        h as i32 / 2,
                        fill,
                    );
                } else {
                    draw_filled_rect_mut(canvas, Rect::at(left, top).of_size(w, h), fill);
                }
            }
            if marker.kind.family() == EditorFamily::ShapeFilled || stroke[3] == 0 {
                return;
            }
            for inset in 0..thickness {
                let iw = w.saturating_sub(2 * inset as u32);
                let ih = h.saturating_sub(2 * inset as u32);
                if iw == 0 || ih == 0 {
                    break;
                }
                if ellipse {
                    draw_hollow_ellipse_mut(
                        canvas,
                        (left + w as i32 / 2, top + h as i32 / 2),
                        iw as i32 / 2,
                        ih as i32 / 2,
                        stroke,
                    );
                } else {
                    draw_hollow_rect_mut(
                        canvas,
                        Rect::at(left + inset, top + inset).of_size(iw, ih),
                        stroke,
                    );
                }
            }
        }
    }
}

fn encode(canvas: RgbaImage, settings: &RenderSettings) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match settings.image_type {
        ImageType::Png => {
            DynamicImage::ImageRgba8(canvas).write_with_encoder(PngEncoder::new(&mut bytes))?;
        }
        ImageType::Jpeg => {
            let quality = (settings.image_quality.clamp(0.0, 1.0) * 100.0).round() as u8;
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.max(1));
            let flattened = flatten_on_white(&canvas);
            DynamicImage::ImageRgb8(flattened).write_with_encoder(encoder)?;
        }
    }
    Ok(bytes)
}

fn flatten_on_white(canvas: &RgbaImage) -> image::RgbImage {
    image::RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
        let alpha = a as f32 / 255.0;
        let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
