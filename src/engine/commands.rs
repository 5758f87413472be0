use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use crate::infra::error::AppError;

/// Seam over process spawning so the apply sequence can be exercised
/// without a running desktop session.
pub trait CommandRunner: Send + Sync {
    /// Runs to completion and fails on a non-zero exit status.
    fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// Runs to completion with output captured; the exit status is ignored.
    fn run_quiet(&self, program: &str, args: &[&str]);

    /// Starts the program and returns immediately, stdio discarded.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// True when the program could be started and exited successfully.
    fn succeeds(&self, program: &str, args: &[&str]) -> bool;
}

#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        log::debug!("running {program} {}", args.join(" "));
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|error| AppError::Command(format!("failed to start {program}: {error}")))?;

        if !status.success() {
            return Err(AppError::Command(format!(
                "{program} {} exited with {status}",
                args.join(" ")
            )));
        }
        Ok(())
    }

    fn run_quiet(&self, program: &str, args: &[&str]) {
        log::debug!("running {program} {} (status ignored)", args.join(" "));
        if let Err(error) = Command::new(program).args(args).output() {
            log::debug!("failed to start {program}: {error}");
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        log::debug!("spawning {program} {}", args.join(" "));
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|child| {
                reap_in_background(child);
            })
            .map_err(|error| AppError::Command(format!("failed to spawn {program}: {error}")))
    }

    fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        Command::new(program)
            .args(args)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Waits on a detached child so it does not linger as a zombie once it exits.
fn reap_in_background(mut child: Child) -> JoinHandle<Option<ExitStatus>> {
    thread::spawn(move || match child.wait() {
        Ok(status) => {
            log::debug!("detached process {} exited with {status}", child.id());
            Some(status)
        }
        Err(error) => {
            log::debug!("failed to wait on detached process {}: {error}", child.id());
            None
        }
    })
}

#[cfg(test)]
pub use fake::RecordingRunner;

#[cfg(test)]
mod fake {
    use std::sync::Mutex;

    use super::CommandRunner;
    use crate::infra::error::AppError;

    /// Records every invocation as `program arg arg` and fails the programs
    /// listed in `failing`.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        calls: Mutex<Vec<String>>,
        failing: Vec<String>,
    }

    impl RecordingRunner {
        pub fn failing(programs: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: programs.iter().map(|program| program.to_string()).collect(),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn record(&self, kind: &str, program: &str, args: &[&str]) -> bool {
            let mut line = format!("{kind}:{program}");
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            self.calls.lock().expect("calls lock").push(line);
            !self.failing.iter().any(|failing| failing == program)
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
            if self.record("run", program, args) {
                Ok(())
            } else {
                Err(AppError::Command(format!("{program} exited with status 1")))
            }
        }

        fn run_quiet(&self, program: &str, args: &[&str]) {
            self.record("quiet", program, args);
        }

        fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
            if self.record("spawn", program, args) {
                Ok(())
            } else {
                Err(AppError::Command(format!("failed to spawn {program}")))
            }
        }

        fn succeeds(&self, program: &str, args: &[&str]) -> bool {
            self.record("check", program, args)
        }
    }
}
