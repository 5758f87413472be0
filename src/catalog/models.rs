use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::infra::config::AppConfig;

/// Per-wallpaper config fragments, located by the wallpaper's file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSet {
    pub waybar: PathBuf,
    pub hyprland: PathBuf,
    pub rofi: PathBuf,
    pub gtk_theme_name: String,
}

impl ThemeSet {
    pub fn for_name(config: &AppConfig, name: &str) -> Self {
        Self {
            waybar: config.waybar_themes_dir.join(format!("{name}.css")),
            hyprland: config.hyprland_themes_dir.join(format!("{name}.conf")),
            rofi: config.rofi_themes_dir.join(format!("{name}.rasi")),
            gtk_theme_name: format!("{}{name}", config.gtk_theme_prefix),
        }
    }

    pub fn present_components(&self) -> Vec<Component> {
        let mut found = Vec::new();
        if self.waybar.exists() {
            found.push(Component::Waybar);
        }
        if self.hyprland.exists() {
            found.push(Component::Hyprland);
        }
        if self.rofi.exists() {
            found.push(Component::Rofi);
        }
        found
    }

    pub fn gtk4_source(&self, config: &AppConfig) -> PathBuf {
        config
            .gtk_themes_dir
            .join(&self.gtk_theme_name)
            .join("gtk-4.0")
            .join("gtk.css")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperEntry {
    pub path: PathBuf,
    pub name: String,
    pub themes: ThemeSet,
    pub components: Vec<Component>,
}

impl WallpaperEntry {
    pub fn new(config: &AppConfig, path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let themes = ThemeSet::for_name(config, &name);
        Self {
            path: path.to_path_buf(),
            components: themes.present_components(),
            themes,
            name,
        }
    }

    // The GTK theme is not counted here.
    pub fn has_themes(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn label(&self) -> String {
        if self.has_themes() {
            self.name.clone()
        } else {
            format!("{}\n(No themes)", self.name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Waybar,
    Hyprland,
    Rofi,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waybar => "waybar",
            Self::Hyprland => "hyprland",
            Self::Rofi => "rofi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub wallpaper_path: String,
    pub name: String,
    pub applied_at: i64,
    pub report_json: String,
}
