use super::marker_types::{MarkerTypeGroup, MarkerTypeItem};

/// Split button: the main half creates the group's current marker type, the
/// dropdown half picks another type from the group.
pub struct MarkerTypeGroupButton {
    group: MarkerTypeGroup,
    current: usize,
    active: bool,
    wide: bool,
}

impl MarkerTypeGroupButton {
    pub fn new(group: MarkerTypeGroup, wide: bool) -> Self {
        Self {
            group,
            current: 0,
            active: false,
            wide,
        }
    }

    pub fn name(&self) -> &'static str {
        self.group.name
    }

    pub fn current(&self) -> Option<&MarkerTypeItem> {
        self.group.items.get(self.current)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Makes `item` current. Items outside the group (or `None`) only
    /// deactivate the button.
    pub fn set_current(&mut self, item: Option<&MarkerTypeItem>, suppress_active: bool) {
        let position = item.and_then(|item| self.group.items.iter().position(|i| i == item));
        match position {
            Some(idx) => {
                self.current = idx;
                if !suppress_active {
                    self.active = true;
                }
            }
            None => self.active = false,
        }
    }

    /// Draws the button. Returns the marker type to create, if one was clicked.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<MarkerTypeItem> {
        let current = *self.current()?;
        let mut clicked = None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            let main = egui::Button::new(current.icon)
                .selected(self.active)
                .min_size(egui::vec2(28.0, 28.0));
            if ui.add(main).on_hover_text(current.name).clicked() {
                clicked = Some(current);
            }

            let columns = if self.wide { 8 } else { 3 };
            ui.menu_button("⏷", |ui| {
                ui.label(egui::RichText::new(self.group.name).weak());
                egui::Grid::new(("marker_type_group", self.group.name)).show(ui, |ui| {
                    for (idx, item) in self.group.items.iter().enumerate() {
                        let button = egui::Button::new(item.icon).min_size(egui::vec2(28.0, 28.0));
                        if ui.add(button).on_hover_text(item.name).clicked() {
                            clicked = Some(*item);
                            ui.close_menu();
                        }
                        if (idx + 1) % columns == 0 {
                            ui.end_row();
                        }
                    }
                });
            });
        });

        if let Some(item) = clicked {
            self.set_current(Some(&item), false);
        }
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MarkerKind;
    use crate::toolbar::marker_types::default_groups;

    fn lines() -> MarkerTypeGroupButton {
        let group = default_groups()
            .into_iter()
            .find(|g| g.name == "Lines")
            .unwrap();
        MarkerTypeGroupButton::new(group, false)
    }

    #[test]
    fn starts_inactive_on_the_first_type() {
        let button = lines();
        assert!(!button.is_active());
        assert_eq!(button.current().unwrap().kind, MarkerKind::Arrow);
    }

    #[test]
    fn picking_a_member_makes_it_current_and_active() {
        let mut button = lines();
        let curve = *button
            .group
            .items
            .iter()
            .find(|i| i.kind == MarkerKind::Curve)
            .unwrap();
        button.set_current(Some(&curve), false);
        assert!(button.is_active());
        assert_eq!(button.current().unwrap().kind, MarkerKind::Curve);
    }

    #[test]
    fn suppressed_pick_changes_type_without_activating() {
        let mut button = lines();
        let line = button.group.items[1];
        button.set_current(Some(&line), true);
        assert!(!button.is_active());
        assert_eq!(button.current().unwrap().kind, MarkerKind::Line);
    }

    #[test]
    fn foreign_item_deactivates_but_keeps_current() {
        let mut button = lines();
        let arrow = button.group.items[0];
        button.set_current(Some(&arrow), false);

        let foreign = MarkerTypeItem {
            icon: "▭",
            name: "Rectangle",
            kind: MarkerKind::Frame,
        };
        button.set_current(Some(&foreign), false);
        assert!(!button.is_active());
        assert_eq!(button.current().unwrap().kind, MarkerKind::Arrow);

        button.set_current(Some(&arrow), false);
        button.set_current(None, false);
        assert!(!button.is_active());
    }
}
