//! Compile rendered programs with an external toolchain.
//!
//! Each compilation gets a private scratch directory holding exactly one
//! source file. The compiler runs with that directory as its working
//! directory, so parallel evaluations never share build artifacts. The
//! exit status is ignored: the diagnostic stream alone is the signal.
//!
//! ```text
//! ┌──────────────┐  write   ┌───────────────────────┐
//! │ rendered src │ ───────► │ <tmp>/gencode-XXXX/   │
//! └──────────────┘          │       main.cpp        │
//!                           └──────────┬────────────┘
//!                                      │ gcc -pipe main.cpp
//!                                      ▼
//!                               stderr → diagnostic
//! ```

use crate::error::FitnessError;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// How often a running compiler is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Produces diagnostic text for a rendered program.
///
/// Implementations must be callable from many evaluation threads at once.
pub trait Compiler: Send + Sync {
    /// Compile `source` and return the raw diagnostic text.
    ///
    /// An empty string means the compiler reported nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when the compiler could not be run to completion.
    fn compile(&self, source: &str) -> Result<String, FitnessError>;
}

/// Serializable settings for [`ExternalCompiler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable.
    pub program: String,
    /// Arguments placed before the source path.
    pub args: Vec<String>,
    /// Name of the scratch source file.
    pub file_name: String,
    /// Per-invocation time limit in seconds.
    pub timeout_secs: u64,
    /// Parent directory for scratch directories; system temp dir if unset.
    pub scratch_root: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "gcc".to_string(),
            args: vec!["-pipe".to_string()],
            file_name: "main.cpp".to_string(),
            timeout_secs: 10,
            scratch_root: None,
        }
    }
}

/// A compiler run as a child process.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    /// Compiler executable.
    pub program: String,
    /// Arguments placed before the source path.
    pub args: Vec<String>,
    /// Name of the scratch source file.
    pub file_name: String,
    /// Per-invocation time limit.
    pub timeout: Duration,
    /// Parent directory for scratch directories; system temp dir if unset.
    pub scratch_root: Option<PathBuf>,
}

impl Default for ExternalCompiler {
    fn default() -> Self {
        Self::from(CompilerConfig::default())
    }
}

impl From<CompilerConfig> for ExternalCompiler {
    fn from(config: CompilerConfig) -> Self {
        Self {
            program: config.program,
            args: config.args,
            file_name: config.file_name,
            timeout: Duration::from_secs(config.timeout_secs),
            scratch_root: config.scratch_root,
        }
    }
}

impl ExternalCompiler {
    /// Create a compiler invoking `program` with no extra arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            ..Self::default()
        }
    }

    /// Replace the arguments placed before the source path.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-invocation time limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the parent directory for scratch directories.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn scratch_dir(&self) -> io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("gencode-");
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    fn launch_error(&self, source: io::Error) -> FitnessError {
        FitnessError::CompilerLaunch {
            program: self.program.clone(),
            source,
        }
    }
}

impl Compiler for ExternalCompiler {
    fn compile(&self, source: &str) -> Result<String, FitnessError> {
        let dir = self.scratch_dir().map_err(FitnessError::ScratchFile)?;
        let path = dir.path().join(&self.file_name);
        std::fs::write(&path, source).map_err(FitnessError::ScratchFile)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&path)
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group, so a timeout also reaches cc1plus and as.
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|e| self.launch_error(e))?;

        // Stderr is drained on its own thread while the child is polled.
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FitnessError::DiagnosticRead(io::Error::other("stderr not captured")))?;
        let reader = thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes).map(|_| bytes)
        });

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "compiler finished");
                    break;
                }
                Ok(None) if Instant::now() >= deadline => {
                    // The reader thread is left detached; it ends once the
                    // pipe closes.
                    kill_process_group(&mut child);
                    let _ = child.wait();
                    return Err(FitnessError::CompilerTimeout(self.timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    kill_process_group(&mut child);
                    return Err(self.launch_error(e));
                }
            }
        }

        let bytes = reader
            .join()
            .map_err(|_| {
                FitnessError::DiagnosticRead(io::Error::other("diagnostic reader panicked"))
            })?
            .map_err(FitnessError::DiagnosticRead)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Kill the compiler and every process it started.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    if let Ok(pid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: kill(2) takes plain integers and touches no memory.
        let rc = unsafe { libc::kill(-pid, libc::SIGKILL) };
        if rc != 0 {
            debug!(pid, error = %io::Error::last_os_error(), "process group kill failed");
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}
