use std::path::Path;

use anyhow::Context;
use image::DynamicImage;

/// Targets larger than this on their longest edge are downscaled for editing.
pub const MAX_TARGET_EDGE: u32 = 4096;

static RAW_EXTS: &[&str] = &["raf", "dng", "nef", "cr2", "arw"];
static TARGET_EXTS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif", "raf", "dng", "nef", "cr2", "arw",
];

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return false;
    };
    exts.iter().any(|known| ext.eq_ignore_ascii_case(known))
}

pub fn is_raw_target(path: &Path) -> bool {
    has_extension(path, RAW_EXTS)
}

/// Whether `path` looks like something the editor can annotate.
pub fn is_supported_target(path: &Path) -> bool {
    has_extension(path, TARGET_EXTS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSource {
    Decoded,
    /// Preview or thumbnail embedded in a RAW file.
    EmbeddedPreview,
    RawDevelop,
}

/// Loads the image markers are drawn over.
pub fn open_target_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let (img, source) = open_target_with_hooks(path, open_embedded_preview, decode_target)
        .with_context(|| format!("failed to open target image {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        ?source,
        "target image loaded"
    );
    Ok(fit_to_max_edge(img))
}

fn fit_to_max_edge(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_TARGET_EDGE || img.height() > MAX_TARGET_EDGE {
        img.thumbnail(MAX_TARGET_EDGE, MAX_TARGET_EDGE)
    } else {
        img
    }
}

/// RAW files try their embedded preview first; everything else, and RAW
/// files without a usable preview, go through `decode`.
fn open_target_with_hooks<FEmbedded, FDecode>(
    path: &Path,
    open_embedded: FEmbedded,
    decode: FDecode,
) -> anyhow::Result<(DynamicImage, TargetSource)>
where
    FEmbedded: Fn(&Path) -> anyhow::Result<Option<DynamicImage>>,
    FDecode: Fn(&Path) -> anyhow::Result<(DynamicImage, TargetSource)>,
{
    if is_raw_target(path) {
        match open_embedded(path) {
            Ok(Some(img)) => return Ok((img, TargetSource::EmbeddedPreview)),
            Ok(None) => {}
            Err(err) => tracing::debug!(%err, "embedded raw preview unavailable"),
        }
    }
    decode(path)
}

fn decode_target(path: &Path) -> anyhow::Result<(DynamicImage, TargetSource)> {
    match image::open(path) {
        Ok(img) => Ok((img, TargetSource::Decoded)),
        Err(err) if !is_raw_target(path) => Err(err.into()),
        Err(_) => {
            let raw = rawler::decode_file(path)?;
            let develop = rawler::imgop::develop::RawDevelop::default();
            let intermediate = develop.develop_intermediate(&raw)?;
            let img = intermediate
                .to_dynamic_image()
                .ok_or_else(|| anyhow::anyhow!("raw develop produced invalid image"))?;
            Ok((img, TargetSource::RawDevelop))
        }
    }
}

fn open_embedded_preview(path: &Path) -> anyhow::Result<Option<DynamicImage>> {
    let source = rawler::rawsource::RawSource::new(path)?;
    let decoder = rawler::get_decoder(&source)?;
    let params = rawler::decoders::RawDecodeParams::default();

    if let Some(img) = decoder.preview_image(&source, &params)? {
        return Ok(Some(img));
    }
    Ok(decoder.thumbnail_image(&source, &params)?)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use image::{DynamicImage, ImageBuffer, Rgba};

    use super::*;

    fn img(px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(1, 1, Rgba(px)))
    }

    #[test]
    fn raw_target_uses_embedded_preview_when_present() {
        let embedded = Cell::new(0);
        let decoded = Cell::new(0);

        let (out, source) = open_target_with_hooks(
            Path::new("/tmp/shot.NEF"),
            |_: &Path| {
                embedded.set(embedded.get() + 1);
                Ok(Some(img([1, 2, 3, 255])))
            },
            |_: &Path| {
                decoded.set(decoded.get() + 1);
                Ok((img([9, 9, 9, 255]), TargetSource::RawDevelop))
            },
        )
        .unwrap();

        assert_eq!((embedded.get(), decoded.get()), (1, 0));
        assert_eq!(source, TargetSource::EmbeddedPreview);
        assert_eq!(out.to_rgba8().get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn raw_target_decodes_when_preview_is_missing_or_broken() {
        let decoded = Cell::new(0);
        let decode = |_: &Path| {
            decoded.set(decoded.get() + 1);
            Ok((img([5, 6, 7, 255]), TargetSource::RawDevelop))
        };

        let (_, source) =
            open_target_with_hooks(Path::new("/tmp/shot.raf"), |_: &Path| Ok(None), decode)
                .unwrap();
        assert_eq!(source, TargetSource::RawDevelop);

        let (_, source) = open_target_with_hooks(
            Path::new("/tmp/shot.raf"),
            |_: &Path| anyhow::bail!("no preview"),
            decode,
        )
        .unwrap();
        assert_eq!(source, TargetSource::RawDevelop);
        assert_eq!(decoded.get(), 2);
    }

    #[test]
    fn regular_targets_never_look_for_previews() {
        let embedded = Cell::new(0);
        let (_, source) = open_target_with_hooks(
            Path::new("/tmp/screen.png"),
            |_: &Path| {
                embedded.set(embedded.get() + 1);
                Ok(None)
            },
            |_: &Path| Ok((img([0, 0, 0, 255]), TargetSource::Decoded)),
        )
        .unwrap();
        assert_eq!(embedded.get(), 0);
        assert_eq!(source, TargetSource::Decoded);
    }

    #[test]
    fn oversized_targets_are_downscaled() {
        let big = DynamicImage::new_rgba8(MAX_TARGET_EDGE * 2, 16);
        let fitted = fit_to_max_edge(big);
        assert_eq!(fitted.width(), MAX_TARGET_EDGE);

        let small = fit_to_max_edge(DynamicImage::new_rgba8(64, 32));
        assert_eq!((small.width(), small.height()), (64, 32));
    }

    #[test]
    fn supported_extensions_ignore_case() {
        assert!(is_supported_target(Path::new("a.PNG")));
        assert!(is_supported_target(Path::new("a.dng")));
        assert!(!is_supported_target(Path::new("a.txt")));
        assert!(is_raw_target(Path::new("a.ARW")));
        assert!(!is_raw_target(Path::new("a.jpeg")));
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = open_target_image(Path::new("/nonexistent/target.png")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/target.png"));
    }
}
