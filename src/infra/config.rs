use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "wallpaper-switcher";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub wallpaper_dir: PathBuf,
    pub current_wallpaper_name: String,
    pub waybar_themes_dir: PathBuf,
    pub waybar_style: PathBuf,
    pub hyprland_themes_dir: PathBuf,
    pub hyprland_colors: PathBuf,
    pub rofi_themes_dir: PathBuf,
    pub rofi_colors: PathBuf,
    pub gtk4_config_dir: PathBuf,
    pub gtk_themes_dir: PathBuf,
    pub gtk_theme_prefix: String,
    pub cache_dir: PathBuf,
    pub history_db: PathBuf,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub columns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let mut config = Self::rooted_at(&home);
        if let Some(cache) = dirs::cache_dir() {
            config.cache_dir = cache.join(APP_DIR_NAME);
        }
        if let Some(data) = dirs::data_dir() {
            config.history_db = data.join(APP_DIR_NAME).join("history.sqlite3");
        }
        config
    }
}

impl AppConfig {
    /// Builds the stock layout below `home`, the same tree a Hyprland
    /// desktop keeps under `~/.config`.
    pub fn rooted_at(home: &Path) -> Self {
        let config = home.join(".config");
        Self {
            wallpaper_dir: config.join("hypr").join("bg"),
            current_wallpaper_name: "bg.jpg".to_string(),
            waybar_themes_dir: config.join("waybar").join("themes"),
            waybar_style: config.join("waybar").join("style.css"),
            hyprland_themes_dir: config.join("hypr").join("themes"),
            hyprland_colors: config.join("hypr").join("colors.conf"),
            rofi_themes_dir: config.join("rofi").join("themes"),
            rofi_colors: config.join("rofi").join("launcher").join("colors.rasi"),
            gtk4_config_dir: config.join("gtk-4.0"),
            gtk_themes_dir: home.join(".themes"),
            gtk_theme_prefix: "oomox-".to_string(),
            cache_dir: home.join(".cache").join(APP_DIR_NAME),
            history_db: home
                .join(".local")
                .join("share")
                .join(APP_DIR_NAME)
                .join("history.sqlite3"),
            thumbnail_width: 150,
            thumbnail_height: 100,
            columns: 4,
        }
    }

    /// Reads the TOML config. An explicit path must exist; the default
    /// location falls back to built-in values when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::NotFound(format!(
                        "config file does not exist: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path).map_err(|error| {
            AppError::Io(format!("failed to read config {}: {error}", path.display()))
        })?;
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config = Self::parse(&content, &home)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str, home: &Path) -> Result<Self, AppError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|error| AppError::Config(format!("failed to parse config: {error}")))?;
        config.expand_home(home);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.current_wallpaper_name.trim().is_empty() {
            return Err(AppError::Config(
                "current_wallpaper_name must not be empty".to_string(),
            ));
        }
        if self.columns == 0 {
            return Err(AppError::Config("columns must be positive".to_string()));
        }
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(AppError::Config(
                "thumbnail dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn current_wallpaper(&self) -> PathBuf {
        self.wallpaper_dir.join(&self.current_wallpaper_name)
    }

    pub fn gtk4_css(&self) -> PathBuf {
        self.gtk4_config_dir.join("gtk.css")
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.cache_dir.join("thumbs")
    }

    fn expand_home(&mut self, home: &Path) {
        for path in [
            &mut self.wallpaper_dir,
            &mut self.waybar_themes_dir,
            &mut self.waybar_style,
            &mut self.hyprland_themes_dir,
            &mut self.hyprland_colors,
            &mut self.rofi_themes_dir,
            &mut self.rofi_colors,
            &mut self.gtk4_config_dir,
            &mut self.gtk_themes_dir,
            &mut self.cache_dir,
            &mut self.history_db,
        ] {
            if let Ok(rest) = path.strip_prefix("~") {
                *path = home.join(rest);
            }
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}
