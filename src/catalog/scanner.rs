use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::catalog::models::WallpaperEntry;
use crate::infra::config::AppConfig;
use crate::infra::error::AppError;

const WALLPAPER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

pub fn is_wallpaper_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WALLPAPER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(file_name: &OsStr) -> bool {
    file_name.to_string_lossy().starts_with('.')
}

/// Lists the wallpapers sitting directly in the wallpaper directory, sorted
/// by path. Symlinked images are followed and dotfiles are ignored. The live
/// wallpaper file itself is never offered.
pub fn scan_wallpapers(config: &AppConfig) -> Result<Vec<WallpaperEntry>, AppError> {
    let dir = &config.wallpaper_dir;
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|error| {
            AppError::Io(format!(
                "failed to create wallpaper directory {}: {error}",
                dir.display()
            ))
        })?;
        log::info!("created empty wallpaper directory {}", dir.display());
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "wallpaper path is not a directory: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() || is_hidden(entry.file_name()) {
            continue;
        }
        let path = entry.path();
        if !is_wallpaper_file(path) {
            continue;
        }
        if entry.file_name() == config.current_wallpaper_name.as_str() {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    paths.sort();

    log::debug!("found {} wallpapers in {}", paths.len(), dir.display());
    Ok(paths
        .iter()
        .map(|path| WallpaperEntry::new(config, path))
        .collect())
}

pub fn find_wallpaper(config: &AppConfig, name: &str) -> Result<WallpaperEntry, AppError> {
    scan_wallpapers(config)?
        .into_iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| AppError::NotFound(format!("no wallpaper named {name}")))
}
