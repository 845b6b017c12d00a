//! Module graph acquisition
//!
//! Extracting the graph from a build tool is not done in-process. Instead an
//! ordered list of extractors is consulted at startup and the first one that
//! applies to the root is used:
//!
//! 1. [`CommandExtractor`] - runs a configured command that prints the JSON model
//! 2. [`ManifestExtractor`] - reads a previously exported JSON model file

use super::{Module, parse_modules};
use crate::core::cancel::CancellationToken;
use crate::core::config::AnalysisOptions;
use crate::core::error::{AcquisitionError, InputError, PathsResult};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// How often a running model command is checked for exit or cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Environment variable carrying the absolute analysis root to the model command
pub const GIT_ROOT_ENV: &str = "AFFECTED_PATHS_GIT_ROOT";

/// Environment variable telling the model command whether included builds are wanted
pub const INCLUDE_BUILDS_ENV: &str = "AFFECTED_PATHS_INCLUDE_BUILDS";

/// A source of the module graph.
pub trait ModelExtractor: Send + Sync {
  /// Short name used in logs
  fn name(&self) -> &'static str;

  /// Whether this extractor can serve the given root
  fn detect(&self, root: &Path) -> bool;

  /// Produce the module list. Long-running implementations must honour `cancel`.
  fn extract(&self, root: &Path, cancel: &CancellationToken) -> PathsResult<Vec<Module>>;
}

/// Build systems recognised at the root (used for diagnostics only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
  Gradle,
}

impl BuildSystem {
  pub fn detect(root: &Path) -> Option<Self> {
    const GRADLE_FILES: [&str; 4] = ["settings.gradle", "settings.gradle.kts", "build.gradle", "build.gradle.kts"];

    if GRADLE_FILES.iter().any(|f| root.join(f).is_file()) {
      return Some(BuildSystem::Gradle);
    }
    None
  }
}

impl fmt::Display for BuildSystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildSystem::Gradle => write!(f, "Gradle"),
    }
  }
}

/// Pick the first extractor that applies to the configured root.
pub fn select_extractor(options: &AnalysisOptions) -> PathsResult<Box<dyn ModelExtractor>> {
  let candidates: Vec<Box<dyn ModelExtractor>> = vec![
    Box::new(CommandExtractor::from_options(options)),
    Box::new(ManifestExtractor::new(options.model_path())),
  ];

  if let Some(extractor) = candidates.into_iter().find(|c| c.detect(&options.root)) {
    debug!(extractor = extractor.name(), "Selected module graph extractor");
    return Ok(extractor);
  }

  Err(
    InputError::NoModelSource {
      root: options.root.clone(),
      build_system: BuildSystem::detect(&options.root).map(|b| b.to_string()),
    }
    .into(),
  )
}

/// Reads an exported JSON model from disk.
pub struct ManifestExtractor {
  path: PathBuf,
}

impl ManifestExtractor {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl ModelExtractor for ManifestExtractor {
  fn name(&self) -> &'static str {
    "manifest"
  }

  fn detect(&self, _root: &Path) -> bool {
    self.path.is_file()
  }

  fn extract(&self, _root: &Path, cancel: &CancellationToken) -> PathsResult<Vec<Module>> {
    cancel.check()?;

    let content = fs::read_to_string(&self.path).map_err(|e| AcquisitionError::Read {
      path: self.path.clone(),
      reason: e.to_string(),
    })?;

    let modules = parse_modules(&content).map_err(|e| AcquisitionError::Malformed {
      origin: self.path.display().to_string(),
      reason: e.to_string(),
    })?;

    info!(modules = modules.len(), path = %self.path.display(), "Loaded module graph");
    Ok(modules)
  }
}

/// Runs an external command (typically a build-tool task) that prints the JSON model.
///
/// The child is polled rather than waited on so a cancelled run kills it promptly.
pub struct CommandExtractor {
  command: Vec<String>,
  include_included_builds: bool,
  log_build_tool: bool,
}

impl CommandExtractor {
  pub fn new(command: Vec<String>) -> Self {
    Self {
      command,
      include_included_builds: true,
      log_build_tool: false,
    }
  }

  pub fn from_options(options: &AnalysisOptions) -> Self {
    Self {
      command: options.model.command.clone(),
      include_included_builds: options.include_included_builds,
      log_build_tool: options.model.log_build_tool,
    }
  }

  fn command_line(&self) -> String {
    self.command.join(" ")
  }
}

impl ModelExtractor for CommandExtractor {
  fn name(&self) -> &'static str {
    "command"
  }

  fn detect(&self, _root: &Path) -> bool {
    !self.command.is_empty()
  }

  fn extract(&self, root: &Path, cancel: &CancellationToken) -> PathsResult<Vec<Module>> {
    cancel.check()?;

    let command_line = self.command_line();
    let Some((program, args)) = self.command.split_first() else {
      return Err(
        AcquisitionError::Launch {
          command: command_line,
          source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        }
        .into(),
      );
    };

    // The child sees an absolute root whatever `--dir` looked like
    let root = root.canonicalize().map_err(|source| AcquisitionError::Launch {
      command: command_line.clone(),
      source,
    })?;

    info!(command = %command_line, root = %root.display(), "Running model command");

    let mut child = Command::new(program)
      .args(args)
      .current_dir(&root)
      .env(GIT_ROOT_ENV, &root)
      .env(INCLUDE_BUILDS_ENV, self.include_included_builds.to_string())
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(if self.log_build_tool {
        Stdio::inherit()
      } else {
        Stdio::piped()
      })
      .spawn()
      .map_err(|source| AcquisitionError::Launch {
        command: command_line.clone(),
        source,
      })?;

    // Drain both pipes off-thread so a chatty child never blocks on a full pipe
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
      if cancel.is_cancelled() {
        debug!(command = %command_line, "Cancelling model command");
        let _ = child.kill();
        let _ = child.wait();
        return Err(AcquisitionError::Cancelled.into());
      }

      match child.try_wait()? {
        Some(status) => break status,
        None => thread::sleep(POLL_INTERVAL),
      }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
      return Err(
        AcquisitionError::CommandFailed {
          command: command_line,
          status: status.to_string(),
          stderr,
          stderr_shown: self.log_build_tool,
        }
        .into(),
      );
    }

    let modules = parse_modules(&stdout).map_err(|e| AcquisitionError::Malformed {
      origin: format!("`{}`", command_line),
      reason: e.to_string(),
    })?;

    info!(modules = modules.len(), "Model command produced module graph");
    Ok(modules)
  }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
  thread::spawn(move || {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
      let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
  })
}
