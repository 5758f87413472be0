use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::app::events::AppEvent;
use crate::app::state::AppState;
use crate::catalog::db::HistoryDb;
use crate::catalog::models::{HistoryRecord, WallpaperEntry};
use crate::catalog::scanner;
use crate::engine::apply::{ApplyReport, ThemeApplier};
use crate::engine::commands::CommandRunner;
use crate::infra::config::AppConfig;
use crate::infra::error::AppError;

pub struct ApplicationController {
    config: AppConfig,
    state: AppState,
    history: HistoryDb,
    applier: ThemeApplier,
    events_tx: Sender<AppEvent>,
    events_rx: Receiver<AppEvent>,
}

impl ApplicationController {
    pub fn new(config: AppConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            history: HistoryDb::new(config.history_db.clone()),
            applier: ThemeApplier::new(config.clone(), runner),
            config,
            state: AppState::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn bootstrap(&mut self) -> Result<(), AppError> {
        self.history.initialize()?;
        self.reload_entries()?;

        match self.history.last_applied_name() {
            Ok(Some(name)) => {
                self.state.selected = self
                    .state
                    .entries
                    .iter()
                    .find(|entry| entry.name == name)
                    .map(|entry| entry.path.clone());
            }
            Ok(None) => {}
            Err(error) => log::warn!("failed to read apply history: {error}"),
        }
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn can_apply(&self) -> bool {
        !self.state.applying && self.state.selected_entry().is_some()
    }

    pub fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Select(index) => {
                if let Some(entry) = self.state.entries.get(index) {
                    self.state.selected = Some(entry.path.clone());
                }
            }
            AppEvent::Refresh => {
                if let Err(error) = self.reload_entries() {
                    log::error!("failed to rescan wallpapers: {error}");
                    self.state.status = Some(format!("Error: {error}"));
                }
            }
            AppEvent::Apply => self.start_apply(),
            AppEvent::ApplyFinished { entry, result } => self.finish_apply(&entry, result),
            AppEvent::ThumbnailFailed(path) => {
                self.state.entries.retain(|entry| entry.path != path);
                if self.state.selected.as_ref() == Some(&path) {
                    self.state.selected = None;
                }
            }
        }
    }

    /// Drains events posted by background work. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let pending: Vec<AppEvent> = self.events_rx.try_iter().collect();
        let handled = pending.len();
        for event in pending {
            self.dispatch(event);
        }
        handled
    }

    /// Runs the whole apply sequence on the calling thread.
    pub fn apply_named(&mut self, name: &str) -> Result<ApplyReport, AppError> {
        let entry = scanner::find_wallpaper(&self.config, name)?;
        let report = self.applier.apply(&entry)?;
        self.history.record_application(&entry, &report)?;
        self.state.last_report = Some(report.clone());
        Ok(report)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<HistoryRecord>, AppError> {
        self.history.recent_applications(limit)
    }

    fn reload_entries(&mut self) -> Result<(), AppError> {
        self.state.entries = scanner::scan_wallpapers(&self.config)?;
        if self.state.selected_entry().is_none() {
            self.state.selected = None;
        }
        log::info!(
            "loaded {} wallpapers from {}",
            self.state.entries.len(),
            self.config.wallpaper_dir.display()
        );
        Ok(())
    }

    fn start_apply(&mut self) {
        if !self.can_apply() {
            return;
        }
        let Some(entry) = self.state.selected_entry().cloned() else {
            return;
        };

        self.state.applying = true;
        self.state.status = Some(format!("Applying {}...", entry.name));

        let applier = self.applier.clone();
        let events_tx = self.events_tx.clone();
        thread::spawn(move || {
            let result = applier.apply(&entry).map_err(|error| error.to_string());
            let _ = events_tx.send(AppEvent::ApplyFinished { entry, result });
        });
    }

    fn finish_apply(&mut self, entry: &WallpaperEntry, result: Result<ApplyReport, String>) {
        self.state.applying = false;
        match result {
            Ok(report) => {
                if let Err(error) = self.history.record_application(entry, &report) {
                    log::warn!("failed to record apply history: {error}");
                }
                self.state.status = Some(format!("Applied {}", entry.name));
                self.state.last_report = Some(report);
            }
            Err(error) => {
                log::error!("error applying wallpaper: {error}");
                self.state.status = Some(format!("Error applying wallpaper: {error}"));
            }
        }
    }
}
