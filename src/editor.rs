use std::sync::mpsc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::surface::{AnnotationState, MarkerArea, Rasterizer, RenderSettings, RenderedImage};
use crate::theme::Theme;
use crate::toolbar::{EditorToolbar, ShellRequest, ToolbarCommand};
use crate::toolbox::EditorToolbox;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Presentation and save options of an [`AnnotationEditor`].
pub struct EditorSettings {
    /// Rasterize the annotation when saving.
    pub render_on_save: bool,
    pub renderer: RenderSettings,
    pub auto_zoom_in: bool,
    pub auto_zoom_out: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            render_on_save: true,
            renderer: RenderSettings::default(),
            auto_zoom_in: false,
            auto_zoom_out: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Notifications the editor hands to its host.
pub enum EditorEvent {
    Save {
        state: AnnotationState,
        /// Present only when rendering on save is enabled.
        image: Option<RenderedImage>,
    },
    Close,
}

/// Editor shell: toolbar on top, marker area in the middle, toolbox below.
pub struct AnnotationEditor<A: MarkerArea, R: Rasterizer> {
    area: A,
    rasterizer: R,
    toolbar: EditorToolbar,
    toolbox: EditorToolbox,
    theme: Theme,
    settings: EditorSettings,
    tx: mpsc::Sender<EditorEvent>,
    rx: mpsc::Receiver<EditorEvent>,
}

impl<A: MarkerArea, R: Rasterizer> AnnotationEditor<A, R> {
    pub fn new(area: A, rasterizer: R, settings: EditorSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut editor = Self {
            area,
            rasterizer,
            toolbar: EditorToolbar::new(),
            toolbox: EditorToolbox::new(),
            theme: Theme::default(),
            settings,
            tx,
            rx,
        };
        editor.apply_settings();
        editor.toolbox.get_ui(&mut editor.area);
        editor
    }

    pub fn area(&self) -> &A {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut A {
        &mut self.area
    }

    pub fn toolbox(&self) -> &EditorToolbox {
        &self.toolbox
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Only changes presentation; toolbar, toolbox and area are kept.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Call [`apply_settings`](Self::apply_settings) after changing the auto-zoom flags.
    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    pub fn apply_settings(&mut self) {
        self.area
            .set_auto_zoom(self.settings.auto_zoom_in, self.settings.auto_zoom_out);
    }

    pub fn set_target_image(&mut self, image: DynamicImage) {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "editor target image set"
        );
        self.area.set_target_image(image);
        self.toolbox.update_toolbar_buttons(&self.area);
    }

    pub fn restore_state(&mut self, state: &AnnotationState) -> anyhow::Result<()> {
        self.area.restore_state(state)?;
        tracing::info!(markers = state.markers.len(), "editor state restored");
        Ok(())
    }

    /// Captures the annotation state, rasterizes it when enabled and emits
    /// one [`EditorEvent::Save`]. A rasterization error is returned and no
    /// event is emitted.
    pub async fn save(&mut self) -> anyhow::Result<()> {
        self.toolbox.flush_pending_edits(&mut self.area);
        let state = self.area.get_state();
        let image = if self.settings.render_on_save {
            let rendered = self
                .rasterizer
                .rasterize(&state, self.area.target_image(), &self.settings.renderer)
                .await?;
            Some(rendered)
        } else {
            None
        };
        tracing::info!(
            markers = state.markers.len(),
            rendered = image.is_some(),
            "annotation saved"
        );
        let _ = self.tx.send(EditorEvent::Save { state, image });
        Ok(())
    }

    /// Emits [`EditorEvent::Close`]. Detaching the editor is up to the host.
    pub fn close(&mut self) {
        tracing::info!("editor closed");
        let _ = self.tx.send(EditorEvent::Close);
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.rx.try_iter().collect()
    }

    /// Runs a toolbar command after writing pending panel edits, so the
    /// edits land on the marker they were made for. Returns true for Save.
    pub fn run_toolbar_command(&mut self, command: ToolbarCommand) -> bool {
        self.toolbox.flush_pending_edits(&mut self.area);
        match self.toolbar.apply(command, &mut self.area) {
            Some(ShellRequest::Save) => true,
            Some(ShellRequest::Close) => {
                self.close();
                false
            }
            None => false,
        }
    }

    /// Draws the editor. Returns true when the user asked to save; the host
    /// then drives [`save`](Self::save).
    pub fn ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut command = None;
        self.theme.scope(ui, |ui| {
            egui::TopBottomPanel::top("annotate_editor_toolbar").show_inside(ui, |ui| {
                command = self.toolbar.ui(ui);
            });
            egui::TopBottomPanel::bottom("annotate_editor_toolbox").show_inside(ui, |ui| {
                self.toolbox.ui(ui, &mut self.area);
            });
            egui::CentralPanel::default().show_inside(ui, |ui| {
                self.area.ui(ui);
            });
        });

        command.is_some_and(|command| self.run_toolbar_command(command))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::surface::memory::MemoryMarkerArea;
    use crate::surface::raster::ImageRasterizer;
    use crate::surface::{ImageType, MarkerKind, ZoomSurface};
    use crate::toolbar::ToolbarAction;
    use crate::toolbar::marker_types::default_groups;
    use crate::toolbox::testing::with_shared_notes;

    struct FailingRasterizer<'a> {
        calls: &'a Cell<usize>,
    }

    impl Rasterizer for FailingRasterizer<'_> {
        async fn rasterize(
            &self,
            _state: &AnnotationState,
            _target: Option<&DynamicImage>,
            _settings: &RenderSettings,
        ) -> anyhow::Result<RenderedImage> {
            self.calls.set(self.calls.get() + 1);
            anyhow::bail!("renderer unavailable")
        }
    }

    fn target() -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            40,
            30,
            image::Rgba([200, 200, 200, 255]),
        ))
    }

    fn editor(settings: EditorSettings) -> AnnotationEditor<MemoryMarkerArea, ImageRasterizer> {
        let mut editor = AnnotationEditor::new(MemoryMarkerArea::new(), ImageRasterizer, settings);
        editor.set_target_image(target());
        editor
    }

    #[test]
    fn save_without_rendering_carries_no_image() {
        let mut editor = editor(EditorSettings {
            render_on_save: false,
            ..Default::default()
        });
        editor.area_mut().create_marker(MarkerKind::Frame);

        pollster::block_on(editor.save()).unwrap();
        let events = editor.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            EditorEvent::Save { state, image } => {
                assert_eq!(state.markers.len(), 1);
                assert!(image.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn save_with_png_rendering_carries_png_bytes() {
        let mut editor = editor(EditorSettings::default());
        pollster::block_on(editor.save()).unwrap();

        let events = editor.drain_events();
        let [EditorEvent::Save { image: Some(image), .. }] = events.as_slice() else {
            panic!("expected one rendered save event, got {events:?}");
        };
        assert_eq!(image.image_type, ImageType::Png);
        assert!(!image.bytes.is_empty());
        assert_eq!(image.bytes[..4], [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn failed_rasterization_propagates_and_emits_nothing() {
        let calls = Cell::new(0);
        let mut editor = AnnotationEditor::new(
            MemoryMarkerArea::new(),
            FailingRasterizer { calls: &calls },
            EditorSettings::default(),
        );

        let err = pollster::block_on(editor.save()).unwrap_err();
        assert_eq!(err.to_string(), "renderer unavailable");
        assert_eq!(calls.get(), 1);
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn close_emits_once_and_leaves_state_alone() {
        let mut editor = editor(EditorSettings::default());
        editor.area_mut().create_marker(MarkerKind::Arrow);
        let before = editor.area().get_state();
        let revision = editor.area().revision();

        editor.close();
        assert_eq!(editor.drain_events(), vec![EditorEvent::Close]);
        assert_eq!(editor.area().get_state(), before);
        assert_eq!(editor.area().revision(), revision);
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn restore_errors_come_back_unchanged() {
        let mut editor = editor(EditorSettings::default());
        let mut state = AnnotationState::empty(40.0, 30.0);
        state.width = 0.0;
        assert!(editor.restore_state(&state).is_err());

        let mut state = AnnotationState::empty(40.0, 30.0);
        state.markers = editor.area().get_state().markers;
        editor.restore_state(&state).unwrap();
    }

    #[test]
    fn toolbar_delete_keeps_pending_edits_in_history() {
        let mut editor = editor(EditorSettings::default());
        let notes = with_shared_notes(&mut editor.toolbox);
        let id = editor.area_mut().create_marker(MarkerKind::Frame).unwrap();
        editor.toolbox.poll(&mut editor.area);
        notes.borrow_mut().set_text("keep me");

        assert!(!editor.run_toolbar_command(ToolbarCommand::Action(ToolbarAction::Delete)));
        assert_eq!(editor.area().marker_count(), 0);

        editor.toolbox.handle_action(ToolbarAction::Undo, &mut editor.area);
        assert_eq!(
            editor.area().marker_properties(id).unwrap().notes.as_deref(),
            Some("keep me")
        );
    }

    #[test]
    fn picking_a_marker_type_writes_pending_edits_first() {
        let mut editor = editor(EditorSettings::default());
        let notes = with_shared_notes(&mut editor.toolbox);
        let first = editor.area_mut().create_marker(MarkerKind::Frame).unwrap();
        editor.toolbox.poll(&mut editor.area);
        notes.borrow_mut().set_text("first");

        let (idx, arrow) = default_groups()
            .iter()
            .enumerate()
            .find_map(|(idx, group)| {
                group
                    .items
                    .iter()
                    .find(|item| item.kind == MarkerKind::Arrow)
                    .map(|item| (idx, *item))
            })
            .unwrap();
        editor.run_toolbar_command(ToolbarCommand::MarkerType(idx, arrow));
        editor.toolbox.poll(&mut editor.area);

        assert_eq!(editor.area().marker_count(), 2);
        assert_eq!(
            editor.area().marker_properties(first).unwrap().notes.as_deref(),
            Some("first")
        );

        editor.toolbox.handle_action(ToolbarAction::Undo, &mut editor.area);
        assert_eq!(editor.area().marker_count(), 1);
        assert_eq!(
            editor.area().marker_properties(first).unwrap().notes.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn save_includes_pending_panel_edits() {
        let mut editor = editor(EditorSettings {
            render_on_save: false,
            ..Default::default()
        });
        let notes = with_shared_notes(&mut editor.toolbox);
        editor.area_mut().create_marker(MarkerKind::Frame);
        editor.toolbox.poll(&mut editor.area);
        notes.borrow_mut().set_text("ship it");

        pollster::block_on(editor.save()).unwrap();
        let events = editor.drain_events();
        let [EditorEvent::Save { state, .. }] = events.as_slice() else {
            panic!("expected one save event, got {events:?}");
        };
        assert_eq!(state.markers[0].properties.notes.as_deref(), Some("ship it"));
    }

    #[test]
    fn theme_toggle_keeps_child_components() {
        let mut editor = editor(EditorSettings::default());
        editor.area_mut().create_marker(MarkerKind::Frame);
        editor.toolbox.poll(&mut editor.area);
        assert!(editor.toolbox().panel("Stroke").unwrap().is_visible());

        editor.set_theme(Theme::Dark);
        editor.set_theme(editor.theme().toggled());
        assert_eq!(editor.theme(), Theme::Light);
        assert!(editor.toolbox().is_built());
        assert!(editor.toolbox().panel("Stroke").unwrap().is_visible());
    }

    #[test]
    fn settings_drive_area_auto_zoom() {
        let mut editor = editor(EditorSettings {
            auto_zoom_in: true,
            ..Default::default()
        });
        assert!(editor.area().auto_zoom_in());
        assert!(!editor.area().auto_zoom_out());

        editor.settings_mut().auto_zoom_out = true;
        editor.apply_settings();
        assert!(editor.area().auto_zoom_out());
    }
}
