use std::path::PathBuf;

use crate::engine::commands::CommandRunner;
use crate::infra::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteTool {
    Responding,
    OnPath(PathBuf),
    NotFound,
}

/// Verifies the hard requirements before the window opens. `swww` and
/// `gsettings` are mandatory; a missing `wal` only produces a warning.
pub fn check_environment(runner: &dyn CommandRunner) -> Result<PaletteTool, AppError> {
    if !runner.succeeds("swww", &["--version"]) {
        return Err(AppError::NotFound(
            "swww is not installed or not in PATH".to_string(),
        ));
    }

    if !runner.succeeds("gsettings", &["--version"]) {
        return Err(AppError::NotFound("gsettings is not available".to_string()));
    }

    let palette = locate_palette_tool(runner, || which::which("wal").ok());
    match &palette {
        PaletteTool::Responding => log::info!("pywal16 found"),
        PaletteTool::OnPath(path) => log::info!("pywal16 found at: {}", path.display()),
        PaletteTool::NotFound => log::warn!("wal command not found, but continuing anyway"),
    }
    Ok(palette)
}

fn locate_palette_tool(
    runner: &dyn CommandRunner,
    lookup: impl FnOnce() -> Option<PathBuf>,
) -> PaletteTool {
    if runner.succeeds("wal", &["--help"]) {
        return PaletteTool::Responding;
    }
    match lookup() {
        Some(path) => PaletteTool::OnPath(path),
        None => PaletteTool::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::commands::RecordingRunner;

    #[test]
    fn missing_swww_is_fatal() {
        let runner = RecordingRunner::failing(&["swww"]);
        let result = check_environment(&runner);
        assert!(matches!(result, Err(AppError::NotFound(message)) if message.contains("swww")));
        assert_eq!(runner.calls(), vec!["check:swww --version".to_string()]);
    }

    #[test]
    fn missing_gsettings_is_fatal() {
        let runner = RecordingRunner::failing(&["gsettings"]);
        let result = check_environment(&runner);
        assert!(matches!(result, Err(AppError::NotFound(message)) if message.contains("gsettings")));
    }

    #[test]
    fn responding_wal_is_reported() {
        let runner = RecordingRunner::default();
        assert_eq!(
            check_environment(&runner).expect("checks should pass"),
            PaletteTool::Responding
        );
    }

    #[test]
    fn wal_falls_back_to_path_lookup() {
        let runner = RecordingRunner::failing(&["wal"]);
        let found = locate_palette_tool(&runner, || Some(PathBuf::from("/usr/bin/wal")));
        assert_eq!(found, PaletteTool::OnPath(PathBuf::from("/usr/bin/wal")));

        let missing = locate_palette_tool(&runner, || None);
        assert_eq!(missing, PaletteTool::NotFound);
    }
}
