use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;

use annotate::editor::{AnnotationEditor, EditorEvent, EditorSettings};
use annotate::registry::{ComponentKind, EDITOR_TAG, Registry, VIEWER_TAG, register_builtin};
use annotate::surface::memory::MemoryMarkerArea;
use annotate::surface::raster::ImageRasterizer;
use annotate::surface::{AnnotationState, RenderedImage};
use annotate::target::{is_supported_target, open_target_image};
use annotate::theme::Theme;
use annotate::viewer::AnnotationViewer;

use crate::config::AppConfig;

type Editor = AnnotationEditor<MemoryMarkerArea, ImageRasterizer>;
type Viewer = AnnotationViewer<MemoryMarkerArea>;

/// Host window: the editor in the middle, the viewer showing the last save
/// on the right.
pub struct AnnotateApp {
    registry: Registry,
    editor: Option<Editor>,
    viewer: Option<Viewer>,
    target: Option<DynamicImage>,
    target_path: Option<PathBuf>,
    last_saved: Option<AnnotationState>,
    theme: Theme,
    status: String,
    config: AppConfig,
}

impl AnnotateApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        theme: Theme,
        target_path: Option<PathBuf>,
    ) -> Self {
        let mut registry = Registry::new();
        register_builtin(&mut registry);

        let mut app = Self {
            registry,
            editor: None,
            viewer: None,
            target: None,
            target_path: None,
            last_saved: None,
            theme,
            status: String::new(),
            config,
        };
        if let Some(path) = target_path {
            app.load_target(&path);
        }
        app.open_editor();
        app.open_viewer();
        app
    }

    fn load_target(&mut self, path: &Path) {
        match open_target_image(path) {
            Ok(img) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_target_image(img.clone());
                }
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.set_target_image(img.clone());
                }
                self.target = Some(img);
                self.target_path = Some(path.to_path_buf());
                self.config.last_image = Some(path.to_path_buf());
                self.status = format!("Opened {}", path.display());
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "target image not loaded");
                self.status = format!("{err:#}");
            }
        }
    }

    fn open_editor(&mut self) {
        if self.registry.get(EDITOR_TAG) != Some(ComponentKind::Editor) {
            tracing::warn!(tag = EDITOR_TAG, "editor component is not defined");
            return;
        }
        let mut editor = AnnotationEditor::new(
            MemoryMarkerArea::new(),
            ImageRasterizer,
            self.config.editor.clone(),
        );
        editor.set_theme(self.theme);
        if let Some(img) = self.target.as_ref() {
            editor.set_target_image(img.clone());
        }
        self.editor = Some(editor);
    }

    fn open_viewer(&mut self) {
        if self.registry.get(VIEWER_TAG) != Some(ComponentKind::Viewer) {
            tracing::warn!(tag = VIEWER_TAG, "viewer component is not defined");
            return;
        }
        let mut viewer = AnnotationViewer::new(MemoryMarkerArea::view_only());
        viewer.set_theme(self.theme);
        if let Some(img) = self.target.as_ref() {
            viewer.set_target_image(img.clone());
        }
        self.viewer = Some(viewer);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.config.theme = theme;
        if let Some(editor) = self.editor.as_mut() {
            editor.set_theme(theme);
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.set_theme(theme);
        }
    }

    /// Changes the persisted editor settings and the open editor's together.
    fn update_editor_settings(&mut self, change: impl Fn(&mut EditorSettings)) {
        change(&mut self.config.editor);
        if let Some(editor) = self.editor.as_mut() {
            change(editor.settings_mut());
            editor.apply_settings();
        }
    }

    fn restore_last_save(&mut self) {
        let (Some(editor), Some(state)) = (self.editor.as_mut(), self.last_saved.as_ref()) else {
            return;
        };
        self.status = match editor.restore_state(state) {
            Ok(()) => "Restored last save".to_string(),
            Err(err) => {
                tracing::warn!(%err, "restore failed");
                format!("Restore failed: {err}")
            }
        };
    }

    fn poll_editor_events(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        for event in editor.drain_events() {
            match event {
                EditorEvent::Save { state, image } => self.handle_save(state, image),
                EditorEvent::Close => {
                    self.editor = None;
                    self.status = "Editor closed".to_string();
                }
            }
        }
    }

    fn handle_save(&mut self, state: AnnotationState, image: Option<RenderedImage>) {
        let stem = self
            .target_path
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("annotation")
            .to_string();
        let output_dir = self
            .config
            .output_dir
            .as_deref()
            .map(expand_home_prefix)
            .unwrap_or_else(default_output_dir);

        self.status = match write_save_output(&state, image.as_ref(), &stem, &output_dir) {
            Ok(written) => format!("Saved {}", written.display()),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "save output not written");
                format!("{err:#}")
            }
        };

        if let Some(viewer) = self.viewer.as_mut() {
            if let Err(err) = viewer.show(&state) {
                tracing::warn!(%err, "viewer rejected saved state");
            }
        }
        self.last_saved = Some(state);
    }
}

fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Annotations")
}

fn expand_home_prefix(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn build_output_path(stem: &str, output_dir: &Path, extension: &str) -> PathBuf {
    let base = output_dir.join(format!("{}.{}", stem, extension));
    if !base.exists() {
        return base;
    }
    for n in 2..10000 {
        let candidate = output_dir.join(format!("{}-{}.{}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
    }
    output_dir.join(format!("{}-final.{}", stem, extension))
}

/// Writes the state as `<stem>.annotation.json` and the rendered image, if
/// any, next to it. Returns the path of the last file written.
fn write_save_output(
    state: &AnnotationState,
    image: Option<&RenderedImage>,
    stem: &str,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let state_path = build_output_path(&format!("{stem}.annotation"), output_dir, "json");
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(&state_path, json)
        .with_context(|| format!("failed to write {}", state_path.display()))?;
    tracing::info!(path = %state_path.display(), "annotation state written");

    let Some(image) = image else {
        return Ok(state_path);
    };
    let image_path = build_output_path(stem, output_dir, image.image_type.extension());
    std::fs::write(&image_path, &image.bytes)
        .with_context(|| format!("failed to write {}", image_path.display()))?;
    tracing::info!(path = %image_path.display(), bytes = image.bytes.len(), "rendered image written");
    Ok(image_path)
}

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window size for saving on exit
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| is_supported_target(p))
        });
        if let Some(path) = dropped {
            self.load_target(&path);
        }

        egui::TopBottomPanel::top("main_menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = match self.theme {
                    Theme::Light => "🌙 Dark",
                    Theme::Dark => "☀ Light",
                };
                if ui.button(label).clicked() {
                    self.set_theme(self.theme.toggled());
                }
                if ui
                    .add_enabled(self.editor.is_none(), egui::Button::new("Open Editor"))
                    .clicked()
                {
                    self.open_editor();
                }
                let can_restore = self.editor.is_some() && self.last_saved.is_some();
                if ui
                    .add_enabled(can_restore, egui::Button::new("Restore Last Save"))
                    .clicked()
                {
                    self.restore_last_save();
                }
                ui.separator();

                let mut render_on_save = self.config.editor.render_on_save;
                if ui.checkbox(&mut render_on_save, "Render on save").changed() {
                    self.update_editor_settings(|s| s.render_on_save = render_on_save);
                }
                let settings = &self.config.editor;
                let mut auto_zoom = settings.auto_zoom_in && settings.auto_zoom_out;
                if ui.checkbox(&mut auto_zoom, "Auto zoom").changed() {
                    self.update_editor_settings(|s| {
                        s.auto_zoom_in = auto_zoom;
                        s.auto_zoom_out = auto_zoom;
                    });
                }
                ui.separator();
                ui.label(egui::RichText::new(&self.status).weak());
            });
        });

        if let Some(viewer) = self.viewer.as_mut() {
            egui::SidePanel::right("viewer_panel")
                .min_width(280.0)
                .default_width(420.0)
                .show(ctx, |ui| viewer.ui(ui));
        }

        let mut save_requested = false;
        egui::CentralPanel::default().show(ctx, |ui| match self.editor.as_mut() {
            Some(editor) => save_requested = editor.ui(ui),
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Editor closed");
                });
            }
        });

        if save_requested {
            if let Some(editor) = self.editor.as_mut() {
                if let Err(err) = pollster::block_on(editor.save()) {
                    tracing::warn!(%err, "save failed");
                    self.status = format!("Save failed: {err}");
                }
            }
        }
        self.poll_editor_events();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate::surface::ImageType;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("annotate-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn output_path_skips_existing_files() {
        let dir = scratch_dir("paths");
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(build_output_path("shot", &dir, "png"), dir.join("shot.png"));

        std::fs::write(dir.join("shot.png"), b"x").unwrap();
        std::fs::write(dir.join("shot-2.png"), b"x").unwrap();
        assert_eq!(build_output_path("shot", &dir, "png"), dir.join("shot-3.png"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_output_writes_state_and_image() {
        let dir = scratch_dir("save");
        let state = AnnotationState::empty(10.0, 10.0);
        let image = RenderedImage {
            image_type: ImageType::Jpeg,
            bytes: vec![0xff, 0xd8, 0xff],
        };

        let written = write_save_output(&state, Some(&image), "shot", &dir).unwrap();
        assert_eq!(written, dir.join("shot.jpg"));
        assert_eq!(std::fs::read(&written).unwrap(), image.bytes);

        let json = std::fs::read_to_string(dir.join("shot.annotation.json")).unwrap();
        let back: AnnotationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_output_without_image_returns_the_state_file() {
        let dir = scratch_dir("state-only");
        let state = AnnotationState::empty(4.0, 4.0);
        let written = write_save_output(&state, None, "annotation", &dir).unwrap();
        assert_eq!(written, dir.join("annotation.annotation.json"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn home_prefix_expands_only_at_the_start() {
        assert_eq!(expand_home_prefix("/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home_prefix("out/~/x"), PathBuf::from("out/~/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home_prefix("~/out"), home.join("out"));
        }
    }

}
