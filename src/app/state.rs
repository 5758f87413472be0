use std::path::PathBuf;

use crate::catalog::models::WallpaperEntry;
use crate::engine::apply::ApplyReport;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub entries: Vec<WallpaperEntry>,
    pub selected: Option<PathBuf>,
    pub status: Option<String>,
    pub applying: bool,
    pub last_report: Option<ApplyReport>,
}

impl AppState {
    pub fn selected_entry(&self) -> Option<&WallpaperEntry> {
        let selected = self.selected.as_ref()?;
        self.entries.iter().find(|entry| &entry.path == selected)
    }

    pub fn is_selected(&self, entry: &WallpaperEntry) -> bool {
        self.selected.as_ref() == Some(&entry.path)
    }
}
