use std::collections::BTreeMap;

pub const EDITOR_TAG: &str = "annotate-editor";
pub const VIEWER_TAG: &str = "annotate-viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Editor,
    Viewer,
}

/// Shell components known to the host, by tag name.
#[derive(Debug, Default)]
pub struct Registry {
    components: BTreeMap<String, ComponentKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` under `tag`. An existing definition is kept and
    /// `false` is returned.
    pub fn define(&mut self, tag: &str, kind: ComponentKind) -> bool {
        if self.components.contains_key(tag) {
            return false;
        }
        tracing::debug!(tag, ?kind, "component defined");
        self.components.insert(tag.to_string(), kind);
        true
    }

    pub fn get(&self, tag: &str) -> Option<ComponentKind> {
        self.components.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Defines the editor and viewer shells. Safe to call more than once.
pub fn register_builtin(registry: &mut Registry) {
    registry.define(EDITOR_TAG, ComponentKind::Editor);
    registry.define(VIEWER_TAG, ComponentKind::Viewer);
}
