use crate::surface::{EditorFamily, MarkerArea, MarkerId, MarkerProperties, selected_family};

/// A togglable property panel in the editor toolbox.
///
/// Call order is owned by the toolbox: on selection `update_visibility` then
/// `update_content`; on deselection `apply_values` then `update_visibility`.
pub trait ToolboxPanel {
    fn title(&self) -> &str;
    fn icon(&self) -> &str;
    fn is_visible(&self) -> bool;
    fn is_built(&self) -> bool;

    /// Builds the panel's controls on the first call; later calls keep them.
    fn get_ui(&mut self);

    /// Shows the panel when the selected marker's editor family applies.
    fn update_visibility(&mut self, area: &dyn MarkerArea);

    /// Reads the selected marker's properties into the controls.
    fn update_content(&mut self, area: &dyn MarkerArea);

    /// Writes pending control edits onto the marker last read by
    /// `update_content`. Returns whether the marker changed.
    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool;

    /// Draws the dropdown content.
    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea);
}

/// Draws a panel's trigger button with its content in a dropdown. Hidden
/// panels draw nothing.
pub fn show_panel(panel: &mut dyn ToolboxPanel, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
    panel.get_ui();
    if !panel.is_visible() {
        return;
    }
    let icon = panel.icon().to_string();
    let title = panel.title().to_string();
    ui.menu_button(icon, |ui| {
        ui.set_min_width(200.0);
        ui.label(egui::RichText::new(title).strong());
        ui.separator();
        panel.show_content(ui, area);
    });
}

/// State every panel shares: labels, visibility, lazily built controls and
/// the marker the controls were last synced from.
pub struct PanelFrame<C> {
    title: String,
    icon: &'static str,
    visible: bool,
    controls: Option<C>,
    builds: usize,
    synced: Option<MarkerId>,
    dirty: bool,
}

impl<C> PanelFrame<C> {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            title: title.to_string(),
            icon,
            visible: false,
            controls: None,
            builds: 0,
            synced: None,
            dirty: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &'static str {
        self.icon
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_built(&self) -> bool {
        self.controls.is_some()
    }

    /// How many times the controls were built.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn synced(&self) -> Option<MarkerId> {
        self.synced
    }

    pub fn get_ui(&mut self, build: impl FnOnce() -> C) -> &mut C {
        let builds = &mut self.builds;
        self.controls.get_or_insert_with(|| {
            *builds += 1;
            build()
        })
    }

    pub fn controls(&self) -> Option<&C> {
        self.controls.as_ref()
    }

    /// Mutable controls for a user edit; marks the panel as having pending edits.
    pub fn edit(&mut self) -> Option<&mut C> {
        let controls = self.controls.as_mut()?;
        self.dirty = true;
        Some(controls)
    }

    pub fn controls_mut(&mut self) -> Option<&mut C> {
        self.controls.as_mut()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn update_visibility(&mut self, area: &dyn MarkerArea, applies: fn(EditorFamily) -> bool) {
        self.visible = selected_family(area).is_some_and(applies);
    }

    /// Starts a content sync. Returns the selected marker's properties when
    /// the panel is built and applies to it. A non-applicable selection
    /// drops the previously synced marker.
    pub fn begin_sync(
        &mut self,
        area: &dyn MarkerArea,
        applies: fn(EditorFamily) -> bool,
    ) -> Option<MarkerProperties> {
        if self.controls.is_none() {
            return None;
        }
        let id = area.current_marker()?;
        let family = area.marker_kind(id).map(|kind| kind.family());
        if !family.is_some_and(applies) {
            self.synced = None;
            self.dirty = false;
            return None;
        }
        self.synced = Some(id);
        self.dirty = false;
        area.marker_properties(id)
    }

    /// Writes `values` into the synced marker's property group when there are
    /// pending edits and the group actually differs.
    pub fn apply_group<V: PartialEq>(
        &mut self,
        area: &mut dyn MarkerArea,
        values: V,
        read: impl Fn(&MarkerProperties) -> V,
        write: impl FnOnce(&mut MarkerProperties, V),
    ) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        let Some(id) = self.synced else {
            return false;
        };
        let Some(mut props) = area.marker_properties(id) else {
            return false;
        };
        if read(&props) == values {
            return false;
        }
        write(&mut props, values);
        area.set_marker_properties(id, props);
        true
    }
}

/// Implements [`ToolboxPanel`]'s bookkeeping methods by delegating to a
/// `frame: PanelFrame<_>` field.
macro_rules! delegate_panel_frame {
    () => {
        fn title(&self) -> &str {
            self.frame.title()
        }

        fn icon(&self) -> &str {
            self.frame.icon()
        }

        fn is_visible(&self) -> bool {
            self.frame.is_visible()
        }

        fn is_built(&self) -> bool {
            self.frame.is_built()
        }

        fn update_visibility(&mut self, area: &dyn MarkerArea) {
            self.frame.update_visibility(area, Self::applies);
        }
    };
}

pub(crate) use delegate_panel_frame;
