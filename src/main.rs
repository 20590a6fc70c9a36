mod app;
mod config;

use std::path::PathBuf;

use annotate::theme::Theme;
use app::AnnotateApp;
use config::AppConfig;

const THEME_ENV: &str = "ANNOTATE_THEME";

/// `ANNOTATE_THEME` wins over the config; unknown values are ignored.
fn resolve_theme(env_value: Option<&str>, config: &AppConfig) -> Theme {
    env_value.and_then(Theme::parse).unwrap_or(config.theme)
}

fn resolve_target_path(arg: Option<String>, config: &AppConfig) -> Option<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| config.last_image.clone().filter(|p| p.exists()))
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let theme = resolve_theme(std::env::var(THEME_ENV).ok().as_deref(), &config);
    let target_path = resolve_target_path(std::env::args().nth(1), &config);
    tracing::info!(theme = theme.as_str(), target = ?target_path, "starting annotate");

    let width = config.window_width.unwrap_or(1280.0);
    let height = config.window_height.unwrap_or(800.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Annotate")
            .with_app_id("annotate")
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "annotate",
        native_options,
        Box::new(move |cc| Ok(Box::new(AnnotateApp::new(cc, config, theme, target_path)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_theme_overrides_config() {
        let config = AppConfig {
            theme: Theme::Dark,
            ..Default::default()
        };
        assert_eq!(resolve_theme(Some("light"), &config), Theme::Light);
        assert_eq!(resolve_theme(Some(" DARK "), &AppConfig::default()), Theme::Dark);
    }

    #[test]
    fn unknown_env_theme_falls_back_to_config() {
        let config = AppConfig {
            theme: Theme::Dark,
            ..Default::default()
        };
        assert_eq!(resolve_theme(Some("sepia"), &config), Theme::Dark);
        assert_eq!(resolve_theme(None, &config), Theme::Dark);
    }

    #[test]
    fn cli_target_wins_over_missing_last_image() {
        let config = AppConfig {
            last_image: Some(PathBuf::from("/nonexistent/last.png")),
            ..Default::default()
        };
        assert_eq!(
            resolve_target_path(Some("shot.png".to_string()), &config),
            Some(PathBuf::from("shot.png"))
        );
        assert_eq!(resolve_target_path(None, &config), None);
    }
}
