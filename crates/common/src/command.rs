//! External command execution.
//!
//! Package managers, the bundler scaffolder, `git` and the hosting CLI are
//! all driven through [`CommandRunner`]. Every call blocks until the child
//! exits; there is no timeout.

use std::{
    fmt,
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::error::{Error, Result};

/// A single external command: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command as a user would type it, e.g. `git commit -m init`.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Runs external commands in one of three modes.
pub trait CommandRunner {
    /// Inherit mode: output goes to the terminal and a non-zero exit is an
    /// error the caller is expected to propagate.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Suppressed mode for optional or probing calls: output is discarded and
    /// any failure is reported as `false`.
    fn try_run(&self, invocation: &Invocation) -> bool;

    /// Capture mode: returns trimmed stdout, or `None` if the command could
    /// not be started, failed, or printed nothing.
    fn output(&self, invocation: &Invocation) -> Option<String>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        debug!(cmd = %invocation, cwd = %invocation.cwd.display(), "running command");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .map_err(|source| Error::command_execution(invocation.command_line(), source))?;

        if !status.success() {
            return Err(Error::command_failed(
                invocation.command_line(),
                status.to_string(),
            ));
        }
        Ok(())
    }

    fn try_run(&self, invocation: &Invocation) -> bool {
        debug!(cmd = %invocation, "probing command");
        Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    fn output(&self, invocation: &Invocation) -> Option<String> {
        debug!(cmd = %invocation, "capturing command output");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!stdout.is_empty()).then_some(stdout)
    }
}

/// Scripted runner for tests: records every invocation instead of spawning
/// processes.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use std::cell::RefCell;

    use super::{CommandRunner, Invocation};
    use crate::error::{Error, Result};

    type Hook = Box<dyn Fn(&Invocation) -> std::io::Result<()>>;

    /// Matches invocations by command-line prefix.
    ///
    /// - `fail(prefix)` makes matching commands exit non-zero.
    /// - `respond(prefix, stdout)` sets the captured output.
    /// - `on(prefix, hook)` runs a side effect, e.g. writing the files a
    ///   scaffolder would have produced.
    #[derive(Default)]
    pub struct ScriptedRunner {
        calls: RefCell<Vec<Invocation>>,
        failing: Vec<String>,
        outputs: Vec<(String, String)>,
        hooks: Vec<(String, Hook)>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn fail(mut self, prefix: impl Into<String>) -> Self {
            self.failing.push(prefix.into());
            self
        }

        #[must_use]
        pub fn respond(mut self, prefix: impl Into<String>, stdout: impl Into<String>) -> Self {
            self.outputs.push((prefix.into(), stdout.into()));
            self
        }

        #[must_use]
        pub fn on<F>(mut self, prefix: impl Into<String>, hook: F) -> Self
        where
            F: Fn(&Invocation) -> std::io::Result<()> + 'static,
        {
            self.hooks.push((prefix.into(), Box::new(hook)));
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }

        fn dispatch(&self, invocation: &Invocation) -> Result<()> {
            self.calls.borrow_mut().push(invocation.clone());
            let line = invocation.command_line();

            if self.failing.iter().any(|p| line.starts_with(p.as_str())) {
                return Err(Error::command_failed(line, "exit status: 1"));
            }
            for (prefix, hook) in &self.hooks {
                if line.starts_with(prefix.as_str()) {
                    hook(invocation).map_err(|e| Error::command_execution(line.clone(), e))?;
                }
            }
            Ok(())
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, invocation: &Invocation) -> Result<()> {
            self.dispatch(invocation)
        }

        fn try_run(&self, invocation: &Invocation) -> bool {
            self.dispatch(invocation).is_ok()
        }

        fn output(&self, invocation: &Invocation) -> Option<String> {
            self.dispatch(invocation).ok()?;
            let line = invocation.command_line();
            self.outputs
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, stdout)| stdout.clone())
        }
    }
}
