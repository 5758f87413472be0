use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::models::WallpaperEntry;
use crate::engine::commands::CommandRunner;
use crate::infra::config::AppConfig;
use crate::infra::error::AppError;

const GSETTINGS_SCHEMA: &str = "org.gnome.desktop.interface";
const GSETTINGS_KEYS: &[&str] = &["gtk-theme", "icon-theme", "cursor-theme"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Applied,
    Missing,
    Skipped,
    Failed(String),
}

impl StepOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Applied => "applied".to_string(),
            Self::Missing => "not found".to_string(),
            Self::Skipped => "skipped".to_string(),
            Self::Failed(message) => format!("failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub wallpaper: String,
    pub waybar: StepOutcome,
    pub hyprland: StepOutcome,
    pub rofi: StepOutcome,
    pub gtk4: StepOutcome,
    pub gsettings: StepOutcome,
    pub waybar_restart: StepOutcome,
    pub hyprland_reload: StepOutcome,
}

impl ApplyReport {
    pub fn summary(&self) -> Vec<String> {
        [
            ("waybar", &self.waybar),
            ("hyprland", &self.hyprland),
            ("rofi", &self.rofi),
            ("gtk4", &self.gtk4),
            ("gsettings", &self.gsettings),
            ("waybar restart", &self.waybar_restart),
            ("hyprland reload", &self.hyprland_reload),
        ]
        .into_iter()
        .map(|(step, outcome)| format!("{step}: {}", outcome.describe()))
        .collect()
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|error| AppError::Persistence(error.to_string()))
    }
}

/// Copies a wallpaper and its fragments into place, then drives the
/// external tools that pick them up.
///
/// Only the wallpaper copy, `swww` and `wal` abort the sequence. Component
/// fragments and service restarts are best effort and land in the report.
#[derive(Clone)]
pub struct ThemeApplier {
    config: AppConfig,
    runner: Arc<dyn CommandRunner>,
}

impl ThemeApplier {
    pub fn new(config: AppConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn apply(&self, entry: &WallpaperEntry) -> Result<ApplyReport, AppError> {
        log::info!("applying themes for {}", entry.name);
        let current = self.config.current_wallpaper();
        let current_arg = current.to_string_lossy().to_string();

        log::info!("step 1: copying theme files");
        if let Some(parent) = current.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Io(format!("failed to create {}: {error}", parent.display()))
            })?;
        }
        copy_file(&entry.path, &current).map_err(|error| {
            AppError::Io(format!(
                "failed to copy {} to {}: {error}",
                entry.path.display(),
                current.display()
            ))
        })?;
        log::info!("copied wallpaper to {}", current.display());

        let waybar = copy_fragment("waybar", &entry.themes.waybar, &self.config.waybar_style);
        let hyprland = copy_fragment(
            "hyprland",
            &entry.themes.hyprland,
            &self.config.hyprland_colors,
        );
        let rofi = copy_fragment("rofi", &entry.themes.rofi, &self.config.rofi_colors);
        let gtk4 = self.apply_gtk4(entry);

        log::info!("step 2: applying visual changes");
        self.runner.run("swww", &["img", &current_arg])?;
        log::info!("applied wallpaper with swww");
        self.runner.run("wal", &["-i", &current_arg, "--cols16"])?;
        log::info!("generated palette with wal");
        let gsettings = self.apply_gsettings(&entry.themes.gtk_theme_name);

        log::info!("step 3: restarting services");
        let waybar_restart = if waybar.is_applied() {
            self.restart_waybar()
        } else {
            StepOutcome::Skipped
        };
        let hyprland_reload = if hyprland.is_applied() {
            self.reload_hyprland()
        } else {
            StepOutcome::Skipped
        };

        log::info!("theme application completed for {}", entry.name);
        Ok(ApplyReport {
            wallpaper: entry.name.clone(),
            waybar,
            hyprland,
            rofi,
            gtk4,
            gsettings,
            waybar_restart,
            hyprland_reload,
        })
    }

    fn apply_gtk4(&self, entry: &WallpaperEntry) -> StepOutcome {
        let source = entry.themes.gtk4_source(&self.config);
        if !source.exists() {
            log::info!("gtk-4.0 theme file not found: {}", source.display());
            return StepOutcome::Missing;
        }

        let target = self.config.gtk4_css();
        let result = fs::create_dir_all(&self.config.gtk4_config_dir)
            .and_then(|()| {
                if target.exists() {
                    fs::remove_file(&target)?;
                    log::debug!("removed existing {}", target.display());
                }
                Ok(())
            })
            .and_then(|()| copy_file(&source, &target));

        match result {
            Ok(_) => {
                log::info!("gtk-4.0 theme applied to {}", target.display());
                StepOutcome::Applied
            }
            Err(error) => {
                log::error!("failed to apply gtk-4.0 theme: {error}");
                StepOutcome::Failed(error.to_string())
            }
        }
    }

    fn apply_gsettings(&self, theme_name: &str) -> StepOutcome {
        for &key in GSETTINGS_KEYS {
            if let Err(error) = self
                .runner
                .run("gsettings", &["set", GSETTINGS_SCHEMA, key, theme_name])
            {
                log::error!("failed to set {key}: {error}");
                return StepOutcome::Failed(error.to_string());
            }
        }
        log::info!("gtk theme set to {theme_name}");
        StepOutcome::Applied
    }

    fn restart_waybar(&self) -> StepOutcome {
        self.runner.run_quiet("pkill", &["waybar"]);
        match self.runner.spawn_detached("waybar", &[]) {
            Ok(()) => {
                log::info!("waybar restarted");
                StepOutcome::Applied
            }
            Err(error) => {
                log::error!("failed to restart waybar: {error}");
                StepOutcome::Failed(error.to_string())
            }
        }
    }

    fn reload_hyprland(&self) -> StepOutcome {
        match self.runner.run("hyprctl", &["reload"]) {
            Ok(()) => {
                log::info!("hyprland reloaded");
                StepOutcome::Applied
            }
            Err(error) => {
                log::error!("failed to reload hyprland: {error}");
                StepOutcome::Failed(error.to_string())
            }
        }
    }
}

// Keeps the source's modification time on the copy.
fn copy_file(source: &Path, target: &Path) -> io::Result<u64> {
    let copied = fs::copy(source, target)?;
    let modified = fs::metadata(source)?.modified()?;
    fs::File::options()
        .write(true)
        .open(target)?
        .set_modified(modified)?;
    Ok(copied)
}

fn copy_fragment(component: &str, source: &Path, target: &Path) -> StepOutcome {
    if !source.exists() {
        log::info!("{component} theme not found: {}", source.display());
        return StepOutcome::Missing;
    }

    let result = match target.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
    .and_then(|()| copy_file(source, target));

    match result {
        Ok(_) => {
            log::info!("{component} theme applied to {}", target.display());
            StepOutcome::Applied
        }
        Err(error) => {
            log::error!("failed to apply {component} theme: {error}");
            StepOutcome::Failed(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::commands::RecordingRunner;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (AppConfig, WallpaperEntry) {
        let config = AppConfig::rooted_at(dir.path());
        fs::create_dir_all(&config.wallpaper_dir).expect("wallpaper dir should exist");
        let path = config.wallpaper_dir.join("aurora.png");
        fs::write(&path, b"aurora-pixels").expect("wallpaper should be written");
        let entry = WallpaperEntry::new(&config, &path);
        (config, entry)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().expect("parent")).expect("parent should exist");
        fs::write(path, content).expect("file should be written");
    }

    #[test]
    fn apply_copies_everything_and_restarts_services() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        write(&entry.themes.waybar, "waybar-css");
        write(&entry.themes.hyprland, "hypr-conf");
        write(&entry.themes.rofi, "rofi-rasi");
        write(&entry.themes.gtk4_source(&config), "gtk-css");

        let runner = Arc::new(RecordingRunner::default());
        let applier = ThemeApplier::new(config.clone(), runner.clone());
        let report = applier.apply(&entry).expect("apply should succeed");

        assert_eq!(
            fs::read(config.current_wallpaper()).expect("current wallpaper"),
            b"aurora-pixels"
        );
        assert_eq!(fs::read_to_string(&config.waybar_style).expect("style"), "waybar-css");
        assert_eq!(fs::read_to_string(&config.hyprland_colors).expect("colors"), "hypr-conf");
        assert_eq!(fs::read_to_string(&config.rofi_colors).expect("rasi"), "rofi-rasi");
        assert_eq!(fs::read_to_string(config.gtk4_css()).expect("gtk"), "gtk-css");

        assert!(report.waybar.is_applied());
        assert!(report.gsettings.is_applied());
        assert!(report.waybar_restart.is_applied());
        assert!(report.hyprland_reload.is_applied());

        let current = config.current_wallpaper().to_string_lossy().to_string();
        assert_eq!(
            runner.calls(),
            vec![
                format!("run:swww img {current}"),
                format!("run:wal -i {current} --cols16"),
                "run:gsettings set org.gnome.desktop.interface gtk-theme oomox-aurora".to_string(),
                "run:gsettings set org.gnome.desktop.interface icon-theme oomox-aurora".to_string(),
                "run:gsettings set org.gnome.desktop.interface cursor-theme oomox-aurora"
                    .to_string(),
                "quiet:pkill waybar".to_string(),
                "spawn:waybar".to_string(),
                "run:hyprctl reload".to_string(),
            ]
        );
    }

    #[test]
    fn missing_fragments_skip_service_restarts() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);

        let runner = Arc::new(RecordingRunner::default());
        let report = ThemeApplier::new(config.clone(), runner.clone())
            .apply(&entry)
            .expect("apply should succeed");

        assert_eq!(report.waybar, StepOutcome::Missing);
        assert_eq!(report.hyprland, StepOutcome::Missing);
        assert_eq!(report.rofi, StepOutcome::Missing);
        assert_eq!(report.gtk4, StepOutcome::Missing);
        assert_eq!(report.waybar_restart, StepOutcome::Skipped);
        assert_eq!(report.hyprland_reload, StepOutcome::Skipped);
        assert!(!config.waybar_style.exists());

        let calls = runner.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls.iter().all(|call| !call.contains("waybar") && !call.contains("hyprctl")));
    }

    #[test]
    fn swww_failure_aborts_after_copies() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        write(&entry.themes.waybar, "waybar-css");

        let runner = Arc::new(RecordingRunner::failing(&["swww"]));
        let result = ThemeApplier::new(config.clone(), runner.clone()).apply(&entry);

        assert!(matches!(result, Err(AppError::Command(_))));
        assert!(config.current_wallpaper().exists());
        assert!(config.waybar_style.exists());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn gsettings_failure_is_reported_but_not_fatal() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        write(&entry.themes.hyprland, "hypr-conf");

        let runner = Arc::new(RecordingRunner::failing(&["gsettings"]));
        let report = ThemeApplier::new(config, runner.clone())
            .apply(&entry)
            .expect("apply should succeed");

        assert!(matches!(report.gsettings, StepOutcome::Failed(_)));
        assert!(report.hyprland_reload.is_applied());
        let gsettings_calls = runner
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("run:gsettings"))
            .count();
        assert_eq!(gsettings_calls, 1);
    }

    #[test]
    fn unwritable_fragment_target_is_recorded_as_failure() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (mut config, entry) = setup(&dir);
        write(&entry.themes.waybar, "waybar-css");
        let blocker = dir.path().join("blocker");
        write(&blocker, "not a directory");
        config.waybar_style = blocker.join("style.css");

        let runner = Arc::new(RecordingRunner::default());
        let report = ThemeApplier::new(config, runner.clone())
            .apply(&entry)
            .expect("apply should still succeed");

        assert!(matches!(report.waybar, StepOutcome::Failed(_)));
        assert_eq!(report.waybar_restart, StepOutcome::Skipped);
        assert!(runner.calls().iter().all(|call| !call.contains("pkill")));
    }

    #[test]
    fn hyprctl_failure_is_reported_but_not_fatal() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        write(&entry.themes.hyprland, "hypr-conf");

        let runner = Arc::new(RecordingRunner::failing(&["hyprctl"]));
        let report = ThemeApplier::new(config, runner)
            .apply(&entry)
            .expect("apply should still succeed");

        assert!(report.hyprland.is_applied());
        assert!(matches!(report.hyprland_reload, StepOutcome::Failed(_)));
    }

    #[test]
    fn copies_keep_source_modification_time() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&entry.path)
            .expect("wallpaper should open")
            .set_modified(old)
            .expect("mtime should be set");

        ThemeApplier::new(config.clone(), Arc::new(RecordingRunner::default()))
            .apply(&entry)
            .expect("apply should succeed");

        let copied = fs::metadata(config.current_wallpaper())
            .and_then(|meta| meta.modified())
            .expect("copy should have an mtime");
        assert_eq!(copied, old);
    }

    #[test]
    fn gtk4_theme_replaces_existing_css() {
        let dir = TempDir::new().expect("tempdir should be created");
        let (config, entry) = setup(&dir);
        write(&config.gtk4_css(), "old");
        write(&entry.themes.gtk4_source(&config), "new");

        let runner = Arc::new(RecordingRunner::default());
        let report = ThemeApplier::new(config.clone(), runner)
            .apply(&entry)
            .expect("apply should succeed");

        assert!(report.gtk4.is_applied());
        assert_eq!(fs::read_to_string(config.gtk4_css()).expect("gtk"), "new");
    }

    #[test]
    fn report_serializes_outcomes_with_status_tags() {
        let report = ApplyReport {
            wallpaper: "aurora".to_string(),
            waybar: StepOutcome::Applied,
            hyprland: StepOutcome::Missing,
            rofi: StepOutcome::Skipped,
            gtk4: StepOutcome::Failed("denied".to_string()),
            gsettings: StepOutcome::Applied,
            waybar_restart: StepOutcome::Applied,
            hyprland_reload: StepOutcome::Skipped,
        };

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("json")).expect("valid json");
        assert_eq!(value["waybar"]["status"], "applied");
        assert_eq!(value["gtk4"]["status"], "failed");
        assert_eq!(value["gtk4"]["detail"], "denied");

        let summary = report.summary();
        assert_eq!(summary[0], "waybar: applied");
        assert_eq!(summary[1], "hyprland: not found");
        assert_eq!(summary[3], "gtk4: failed: denied");
    }
}
