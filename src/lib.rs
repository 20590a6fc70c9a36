//! Toolbar, toolbox, editor and viewer shells around an annotation surface.

pub mod color_picker;
pub mod editor;
pub mod registry;
pub mod surface;
pub mod target;
pub mod theme;
pub mod toolbar;
pub mod toolbox;
pub mod viewer;
