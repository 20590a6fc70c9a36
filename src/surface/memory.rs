use std::sync::mpsc;

use image::DynamicImage;

use super::{
    AnnotationState, AreaEvent, EditorFamily, MarkerArea, MarkerId, MarkerKind, MarkerProperties,
    MarkerState, MarkerView, ZoomSurface, state::STATE_VERSION,
};

/// Surface size used until a target image is set.
const DEFAULT_SIZE: (f32, f32) = (800.0, 600.0);
const HIT_SLOP: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    id: MarkerId,
    marker: MarkerState,
}

/// In-process annotation engine: keeps markers in memory, snapshots them for
/// undo and paints them with the egui painter.
pub struct MemoryMarkerArea {
    entries: Vec<Entry>,
    next_id: u64,
    selected: Option<MarkerId>,
    undo_stack: Vec<Vec<Entry>>,
    redo_stack: Vec<Vec<Entry>>,
    revision: u64,
    zoom: f32,
    auto_zoom_in: bool,
    auto_zoom_out: bool,
    width: f32,
    height: f32,
    target: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    viewport: Option<egui::Vec2>,
    dragging: Option<MarkerId>,
    interactive: bool,
    subscribers: Vec<mpsc::Sender<AreaEvent>>,
}

impl Default for MemoryMarkerArea {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMarkerArea {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            revision: 0,
            zoom: 1.0,
            auto_zoom_in: false,
            auto_zoom_out: false,
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            target: None,
            texture: None,
            viewport: None,
            dragging: None,
            interactive: true,
            subscribers: Vec::new(),
        }
    }

    /// A surface that only displays markers.
    pub fn view_only() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    /// Number of committed marker mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn marker_count(&self) -> usize {
        self.entries.len()
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Selects `id` (or clears the selection), publishing deselect before select.
    pub fn select(&mut self, id: Option<MarkerId>) {
        let id = id.filter(|id| self.entry(*id).is_some());
        if self.selected == id {
            return;
        }
        if let Some(old) = self.selected.take() {
            self.publish(AreaEvent::MarkerDeselect(old));
        }
        if let Some(new) = id {
            self.selected = Some(new);
            self.publish(AreaEvent::MarkerSelect(new));
        }
    }

    /// Remembers the viewport size `auto_zoom` fits into.
    pub fn set_viewport(&mut self, size: egui::Vec2) {
        self.viewport = Some(size);
    }

    fn entry(&self, id: MarkerId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: MarkerId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    fn publish(&mut self, event: AreaEvent) {
        tracing::debug!(?event, "marker area event");
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn checkpoint(&mut self) {
        self.undo_stack.push(self.entries.clone());
        self.redo_stack.clear();
    }

    fn committed(&mut self) {
        self.revision += 1;
        self.publish(AreaEvent::AreaStateChange);
    }

    fn allocate_id(&mut self) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn load(&mut self, state: &AnnotationState) -> anyhow::Result<()> {
        state.validate()?;
        self.select(None);
        let sx = self.width / state.width;
        let sy = self.height / state.height;
        let mut entries = Vec::with_capacity(state.markers.len());
        for marker in &state.markers {
            let mut marker = marker.clone();
            marker.left *= sx;
            marker.top *= sy;
            marker.width *= sx;
            marker.height *= sy;
            entries.push(Entry {
                id: self.allocate_id(),
                marker,
            });
        }
        self.entries = entries;
        self.undo_stack.clear();
        self.redo_stack.clear();
        Ok(())
    }

    fn hit_test(&self, pos: egui::Pos2) -> Option<MarkerId> {
        self.entries
            .iter()
            .rev()
            .find(|e| marker_bounds(&e.marker).expand(HIT_SLOP).contains(pos))
            .map(|e| e.id)
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let rgba = target.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let img = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture(
            "annotate_target",
            img,
            egui::TextureOptions::LINEAR,
        ));
    }

    fn paint(&mut self, ui: &mut egui::Ui) {
        self.set_viewport(ui.available_size());
        self.ensure_texture(ui.ctx());

        let zoom = self.zoom;
        let display = egui::vec2(self.width, self.height) * zoom;
        let sense = if self.interactive {
            egui::Sense::click_and_drag()
        } else {
            egui::Sense::hover()
        };

        egui::ScrollArea::both()
            .id_salt("marker_area_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(display, sense);
                let origin = response.rect.min;
                let to_screen = |p: egui::Pos2| origin + (p.to_vec2() * zoom);
                let to_surface = |p: egui::Pos2| ((p - origin) / zoom).to_pos2();

                if let Some(tex) = &self.texture {
                    painter.image(
                        tex.id(),
                        response.rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                } else {
                    painter.rect_filled(response.rect, 0.0, ui.visuals().extreme_bg_color);
                }

                for entry in &self.entries {
                    paint_marker(&painter, &entry.marker, zoom, to_screen);
                    if self.selected == Some(entry.id) {
                        let bounds = marker_bounds(&entry.marker).expand(HIT_SLOP);
                        painter.rect_stroke(
                            egui::Rect::from_min_max(to_screen(bounds.min), to_screen(bounds.max)),
                            2.0,
                            egui::Stroke::new(1.0, ui.visuals().selection.stroke.color),
                            egui::StrokeKind::Outside,
                        );
                    }
                }

                if !self.interactive {
                    return;
                }
                let pointer = response.interact_pointer_pos().map(to_surface);
                if response.drag_started() {
                    let hit = pointer.and_then(|p| self.hit_test(p));
                    self.select(hit);
                    if let Some(id) = hit {
                        self.checkpoint();
                        self.dragging = Some(id);
                    }
                } else if response.clicked() {
                    let hit = pointer.and_then(|p| self.hit_test(p));
                    self.select(hit);
                }
                if response.dragged() {
                    if let Some(id) = self.dragging {
                        let delta = response.drag_delta() / zoom;
                        if let Some(entry) = self.entry_mut(id) {
                            entry.marker.left += delta.x;
                            entry.marker.top += delta.y;
                        }
                    }
                }
                if response.drag_stopped() && self.dragging.take().is_some() {
                    self.committed();
                }
            });
    }
}

fn marker_bounds(marker: &MarkerState) -> egui::Rect {
    egui::Rect::from_two_pos(
        egui::pos2(marker.left, marker.top),
        egui::pos2(marker.left + marker.width, marker.top + marker.height),
    )
}

fn paint_marker(
    painter: &egui::Painter,
    marker: &MarkerState,
    zoom: f32,
    to_screen: impl Fn(egui::Pos2) -> egui::Pos2,
) {
    let props = &marker.properties;
    let stroke = egui::Stroke::new(
        (props.stroke_width * zoom).max(0.5),
        props.stroke_color.with_opacity(props.opacity).to_color32(),
    );
    let fill = props.fill_color.with_opacity(props.opacity).to_color32();
    let bounds = marker_bounds(marker);
    let rect = egui::Rect::from_min_max(to_screen(bounds.min), to_screen(bounds.max));
    let start = to_screen(egui::pos2(marker.left, marker.top));
    let end = to_screen(egui::pos2(
        marker.left + marker.width,
        marker.top + marker.height,
    ));

    match marker.kind.family() {
        EditorFamily::ShapeOutline | EditorFamily::ShapeFilled => {
            if matches!(marker.kind, MarkerKind::Ellipse | MarkerKind::EllipseFrame) {
                painter.add(egui::Shape::ellipse_filled(
                    rect.center(),
                    rect.size() / 2.0,
                    fill,
                ));
                painter.add(egui::Shape::ellipse_stroke(
                    rect.center(),
                    rect.size() / 2.0,
                    stroke,
                ));
            } else {
                painter.rect_filled(rect, 0.0, fill);
                if marker.kind.family() == EditorFamily::ShapeOutline {
                    painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Middle);
                }
            }
        }
        EditorFamily::Linear | EditorFamily::Freehand | EditorFamily::Polygon => {
            if marker.kind == MarkerKind::Arrow {
                painter.arrow(start, end - start, stroke);
            } else {
                painter.line_segment([start, end], stroke);
            }
        }
        EditorFamily::Text | EditorFamily::Callout | EditorFamily::CaptionFrame => {
            if marker.kind != MarkerKind::Text {
                painter.rect_filled(rect, 4.0, fill);
                painter.rect_stroke(rect, 4.0, stroke, egui::StrokeKind::Middle);
            }
            painter.text(
                rect.left_top() + egui::vec2(4.0, 4.0) * zoom,
                egui::Align2::LEFT_TOP,
                marker.properties.notes.as_deref().unwrap_or("Text"),
                egui::FontId::proportional(16.0 * zoom),
                props.color.with_opacity(props.opacity).to_color32(),
            );
        }
        EditorFamily::Image => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                marker.glyph.as_deref().unwrap_or("?"),
                egui::FontId::proportional(rect.height().max(8.0)),
                egui::Color32::WHITE.gamma_multiply(props.opacity),
            );
        }
    }
}

fn default_extent(kind: MarkerKind) -> (f32, f32) {
    match kind.family() {
        EditorFamily::Linear | EditorFamily::Freehand => (120.0, 0.0),
        EditorFamily::Text => (160.0, 40.0),
        EditorFamily::Image => (32.0, 32.0),
        _ => (120.0, 80.0),
    }
}

impl ZoomSurface for MemoryMarkerArea {
    fn zoom_level(&self) -> f32 {
        self.zoom
    }

    fn set_zoom_level(&mut self, level: f32) {
        self.zoom = level;
    }

    fn auto_zoom_in(&self) -> bool {
        self.auto_zoom_in
    }

    fn auto_zoom_out(&self) -> bool {
        self.auto_zoom_out
    }

    fn set_auto_zoom(&mut self, zoom_in: bool, zoom_out: bool) {
        self.auto_zoom_in = zoom_in;
        self.auto_zoom_out = zoom_out;
    }

    fn auto_zoom(&mut self) {
        let Some(viewport) = self.viewport else {
            self.zoom = 1.0;
            return;
        };
        let mut fit = (viewport.x / self.width).min(viewport.y / self.height);
        if !fit.is_finite() || fit <= 0.0 {
            return;
        }
        if !self.auto_zoom_in {
            fit = fit.min(1.0);
        }
        if !self.auto_zoom_out {
            fit = fit.max(1.0);
        }
        self.zoom = fit;
    }
}

impl MarkerArea for MemoryMarkerArea {
    fn subscribe(&mut self) -> mpsc::Receiver<AreaEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn switch_to_select_mode(&mut self) {
        self.dragging = None;
    }

    fn create_marker(&mut self, kind: MarkerKind) -> Option<MarkerId> {
        self.checkpoint();
        let (w, h) = default_extent(kind);
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            marker: MarkerState {
                kind,
                left: (self.width - w) / 2.0,
                top: (self.height - h) / 2.0,
                width: w,
                height: h,
                properties: kind.default_properties(),
                glyph: None,
            },
        });
        self.publish(AreaEvent::MarkerCreate(id));
        self.committed();
        self.select(Some(id));
        Some(id)
    }

    fn set_custom_image(&mut self, id: MarkerId, glyph: &str, width: f32, height: f32) {
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let Some(entry) = self.entry_mut(id) else {
            return;
        };
        if entry.marker.kind != MarkerKind::CustomImage {
            return;
        }
        entry.marker.glyph = Some(glyph.to_string());
        entry.marker.width = width;
        entry.marker.height = height;
        entry.marker.left = cx - width / 2.0;
        entry.marker.top = cy - height / 2.0;
    }

    fn delete_selected_markers(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        self.select(None);
        self.checkpoint();
        self.entries.retain(|e| e.id != id);
        self.committed();
    }

    fn is_undo_possible(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn is_redo_possible(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn undo(&mut self) {
        let Some(previous) = self.undo_stack.pop() else {
            return;
        };
        self.select(None);
        self.redo_stack
            .push(std::mem::replace(&mut self.entries, previous));
        self.committed();
    }

    fn redo(&mut self) {
        let Some(next) = self.redo_stack.pop() else {
            return;
        };
        self.select(None);
        self.undo_stack
            .push(std::mem::replace(&mut self.entries, next));
        self.committed();
    }

    fn current_marker(&self) -> Option<MarkerId> {
        self.selected
    }

    fn marker_kind(&self, id: MarkerId) -> Option<MarkerKind> {
        self.entry(id).map(|e| e.marker.kind)
    }

    fn marker_properties(&self, id: MarkerId) -> Option<MarkerProperties> {
        self.entry(id).map(|e| e.marker.properties.clone())
    }

    fn set_marker_properties(&mut self, id: MarkerId, properties: MarkerProperties) {
        match self.entry(id) {
            Some(entry) if entry.marker.properties != properties => {}
            _ => return,
        }
        self.checkpoint();
        if let Some(entry) = self.entry_mut(id) {
            entry.marker.properties = properties;
        }
        self.committed();
    }

    fn target_image(&self) -> Option<&DynamicImage> {
        self.target.as_ref()
    }

    fn set_target_image(&mut self, image: DynamicImage) {
        self.width = image.width().max(1) as f32;
        self.height = image.height().max(1) as f32;
        self.target = Some(image);
        self.texture = None;
    }

    fn get_state(&self) -> AnnotationState {
        AnnotationState {
            version: STATE_VERSION,
            width: self.width,
            height: self.height,
            markers: self.entries.iter().map(|e| e.marker.clone()).collect(),
        }
    }

    fn restore_state(&mut self, state: &AnnotationState) -> anyhow::Result<()> {
        self.load(state)?;
        self.committed();
        Ok(())
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        self.paint(ui);
    }
}

impl MarkerView for MemoryMarkerArea {
    fn target_image(&self) -> Option<&DynamicImage> {
        self.target.as_ref()
    }

    fn set_target_image(&mut self, image: DynamicImage) {
        MarkerArea::set_target_image(self, image);
    }

    fn show(&mut self, state: &AnnotationState) -> anyhow::Result<()> {
        self.load(state)
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        self.paint(ui);
    }
}
