use std::path::PathBuf;

use crate::catalog::models::WallpaperEntry;
use crate::engine::apply::ApplyReport;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Select(usize),
    Refresh,
    Apply,
    ApplyFinished {
        entry: WallpaperEntry,
        result: Result<ApplyReport, String>,
    },
    ThumbnailFailed(PathBuf),
}
