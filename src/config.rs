use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use annotate::editor::EditorSettings;
use annotate::theme::Theme;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
/// Persisted settings of the annotate host.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub theme: Theme,
    pub editor: EditorSettings,
    /// Where saved annotations go; `~/` is expanded.
    pub output_dir: Option<String>,
    pub last_image: Option<PathBuf>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("annotate").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring malformed config");
            Self::default()
        })
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate::surface::ImageType;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            theme = "dark"

            [editor]
            auto_zoom_out = true

            [editor.renderer]
            image_type = "image/jpeg"
            width = 640
            "#,
        );
        assert_eq!(config.theme, Theme::Dark);
        assert!(config.editor.render_on_save);
        assert!(config.editor.auto_zoom_out);
        assert_eq!(config.editor.renderer.image_type, ImageType::Jpeg);
        assert_eq!(config.editor.renderer.width, Some(640));
        assert_eq!(config.editor.renderer.height, None);
        assert_eq!(config.window_width, None);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let config = AppConfig::parse("theme = [");
        assert_eq!(config.theme, Theme::Light);
        assert!(config.last_image.is_none());
    }

    #[test]
    fn config_survives_a_toml_round_trip() {
        let config = AppConfig {
            window_width: Some(1400.0),
            output_dir: Some("~/Pictures/annotations".to_string()),
            last_image: Some(PathBuf::from("/tmp/shot.png")),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back = AppConfig::parse(&text);
        assert_eq!(back.window_width, Some(1400.0));
        assert_eq!(back.output_dir.as_deref(), Some("~/Pictures/annotations"));
        assert_eq!(back.editor, config.editor);
    }
}
