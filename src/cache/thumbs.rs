use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::infra::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    fn from_image(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            rgba: image.to_rgba8().into_raw(),
        }
    }
}

pub fn thumbnail_path(thumbs_dir: &Path, source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    thumbs_dir.join(format!("{file_name}.png"))
}

/// Fits `source` inside `width x height`, keeping its aspect ratio. A cached
/// PNG is reused while it is at least as new as the source and was made for
/// the same bounds.
pub fn load_thumbnail(
    source: &Path,
    thumbs_dir: &Path,
    width: u32,
    height: u32,
) -> Result<Thumbnail, AppError> {
    let cached = thumbnail_path(thumbs_dir, source);
    if is_fresh(&cached, source) {
        match decode(&cached) {
            Ok(image) if fits_bounds(&image, width, height) => {
                return Ok(Thumbnail::from_image(&image));
            }
            Ok(_) => log::debug!("cached thumbnail {} has stale size", cached.display()),
            Err(error) => log::warn!("ignoring unreadable thumbnail: {error}"),
        }
    }

    let thumb = decode(source)?.thumbnail(width, height);
    if let Err(error) = store(&thumb, &cached) {
        log::warn!("failed to cache thumbnail for {}: {error}", source.display());
    }

    Ok(Thumbnail::from_image(&thumb))
}

// A fitted thumbnail fills at least one of the two bounds.
fn fits_bounds(image: &DynamicImage, width: u32, height: u32) -> bool {
    image.width() <= width
        && image.height() <= height
        && (image.width() == width || image.height() == height)
}

fn decode(path: &Path) -> Result<DynamicImage, AppError> {
    ImageReader::open(path)
        .map_err(|error| AppError::Io(format!("failed to open {}: {error}", path.display())))?
        .with_guessed_format()
        .map_err(|error| {
            AppError::Decode(format!("failed to detect format of {}: {error}", path.display()))
        })?
        .decode()
        .map_err(|error| AppError::Decode(format!("failed to decode {}: {error}", path.display())))
}

fn store(thumb: &DynamicImage, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| AppError::Io(format!("failed to create thumbnail directory: {error}")))?;
    }
    thumb
        .save_with_format(path, ImageFormat::Png)
        .map_err(|error| AppError::Io(format!("failed to write {}: {error}", path.display())))
}

fn is_fresh(cached: &Path, source: &Path) -> bool {
    let modified = |path: &Path| path.metadata().and_then(|meta| meta.modified()).ok();
    match (modified(cached), modified(source)) {
        (Some(cached), Some(source)) => cached >= source,
        _ => false,
    }
}
