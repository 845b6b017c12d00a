//! Error types for affected-paths with contextual messages and exit codes
//!
//! Errors are split along the lines the analysis cares about: bad local input
//! (wrong directory, broken config, no model source), git access failures and
//! failures acquiring the module graph. Everything else is an execution error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for affected-paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Unexpected execution failure (I/O, internal errors)
  Execution = 1,
  /// Domain failure (input, git access, model acquisition)
  Domain = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for affected-paths
#[derive(Debug)]
pub enum PathsError {
  /// Local misconfiguration
  Input(InputError),

  /// Repository state could not be read
  GitAccess(GitError),

  /// Module graph could not be obtained
  ExternalAcquisition(AcquisitionError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PathsError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PathsError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PathsError::Message { message, context, help } => PathsError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      PathsError::Input(_) => ExitCode::Domain,
      PathsError::GitAccess(_) => ExitCode::Domain,
      PathsError::ExternalAcquisition(_) => ExitCode::Domain,
      PathsError::Io(_) => ExitCode::Execution,
      PathsError::Message { .. } => ExitCode::Execution,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PathsError::Input(e) => e.help_message(),
      PathsError::GitAccess(e) => e.help_message(),
      PathsError::ExternalAcquisition(e) => e.help_message(),
      PathsError::Message { help, .. } => help.clone(),
      PathsError::Io(_) => None,
    }
  }

  /// True when the error only reports that the run was cancelled
  pub fn is_cancelled(&self) -> bool {
    matches!(self, PathsError::ExternalAcquisition(AcquisitionError::Cancelled))
  }
}

impl fmt::Display for PathsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathsError::Input(e) => write!(f, "{}", e),
      PathsError::GitAccess(e) => write!(f, "{}", e),
      PathsError::ExternalAcquisition(e) => write!(f, "{}", e),
      PathsError::Io(e) => write!(f, "I/O error: {}", e),
      PathsError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PathsError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PathsError::Io(e) => Some(e),
      PathsError::ExternalAcquisition(AcquisitionError::Launch { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for PathsError {
  fn from(err: io::Error) -> Self {
    PathsError::Io(err)
  }
}

impl From<InputError> for PathsError {
  fn from(err: InputError) -> Self {
    PathsError::Input(err)
  }
}

impl From<GitError> for PathsError {
  fn from(err: GitError) -> Self {
    PathsError::GitAccess(err)
  }
}

impl From<AcquisitionError> for PathsError {
  fn from(err: AcquisitionError) -> Self {
    PathsError::ExternalAcquisition(err)
  }
}

impl From<serde_json::Error> for PathsError {
  fn from(err: serde_json::Error) -> Self {
    PathsError::message(format!("JSON error: {}", err))
  }
}

/// Input and local configuration errors
#[derive(Debug)]
pub enum InputError {
  /// `--dir` (or the configured root) is not a directory
  InvalidDirectory { path: PathBuf },

  /// The root is not inside a git repository
  RepositoryNotFound { path: PathBuf },

  /// Config file exists but cannot be read or parsed
  InvalidConfig { path: PathBuf, reason: String },

  /// No model extractor applies to this root
  NoModelSource { root: PathBuf, build_system: Option<String> },
}

impl InputError {
  fn help_message(&self) -> Option<String> {
    match self {
      InputError::InvalidDirectory { .. } => Some("Pass an existing directory with --dir.".to_string()),
      InputError::RepositoryNotFound { path } => Some(format!(
        "Run from inside a git checkout, or pass the changed files explicitly with --changed-files (root: {})",
        path.display()
      )),
      InputError::NoModelSource { build_system, .. } => match build_system {
        Some(system) => Some(format!(
          "Detected a {} build. Configure `model.command` to export the module graph, or point --model at an exported file.",
          system
        )),
        None => Some("Provide the module graph with --model <PATH> or --model-command <CMD>.".to_string()),
      },
      _ => None,
    }
  }
}

impl fmt::Display for InputError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InputError::InvalidDirectory { path } => write!(f, "Not a valid directory: {}", path.display()),
      InputError::RepositoryNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      InputError::InvalidConfig { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      InputError::NoModelSource { root, .. } => {
        write!(f, "No module graph source found for {}", root.display())
      }
    }
  }
}

/// Git access errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// HEAD does not point at a commit
  UnresolvableHead { stderr: String },

  /// `git diff` produced output we cannot classify
  MalformedDiff { record: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::UnresolvableHead { .. } => {
        Some("The repository has no commits yet. Commit something or pass --changed-files.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::UnresolvableHead { stderr } => {
        write!(f, "Unable to resolve HEAD to a commit\n{}", stderr)
      }
      GitError::MalformedDiff { record } => {
        write!(f, "Unexpected git diff record: {}", record)
      }
    }
  }
}

/// Module graph acquisition errors
#[derive(Debug)]
pub enum AcquisitionError {
  /// The model command could not be started
  Launch { command: String, source: io::Error },

  /// The model command exited unsuccessfully
  CommandFailed {
    command: String,
    status: String,
    stderr: String,
    /// The build tool's stderr was already streamed to ours
    stderr_shown: bool,
  },

  /// The model file could not be read
  Read { path: PathBuf, reason: String },

  /// The model JSON did not parse
  Malformed { origin: String, reason: String },

  /// Acquisition was abandoned because the run was cancelled
  Cancelled,
}

impl AcquisitionError {
  fn help_message(&self) -> Option<String> {
    match self {
      AcquisitionError::Launch { .. } => Some("Check that `model.command` names an executable on PATH.".to_string()),
      AcquisitionError::CommandFailed { stderr_shown: false, .. } => {
        Some("Re-run with --log-build-tool to see the build tool output.".to_string())
      }
      AcquisitionError::Malformed { .. } => {
        Some("The module graph must be a JSON array of modules (address, variants, ...).".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for AcquisitionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AcquisitionError::Launch { command, source } => {
        write!(f, "Failed to launch model command `{}`: {}", command, source)
      }
      AcquisitionError::CommandFailed { command, status, stderr, .. } => {
        write!(f, "Model command `{}` failed ({})", command, status)?;
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
      AcquisitionError::Read { path, reason } => {
        write!(f, "Failed to read module graph from {}: {}", path.display(), reason)
      }
      AcquisitionError::Malformed { origin, reason } => {
        write!(f, "Malformed module graph from {}: {}", origin, reason)
      }
      AcquisitionError::Cancelled => write!(f, "Module graph acquisition was cancelled"),
    }
  }
}

/// Result type alias for affected-paths
pub type PathsResult<T> = Result<T, PathsError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PathsResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PathsError>,
{
  fn context(self, ctx: impl Into<String>) -> PathsResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PathsError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("help: {}\n", help);
  }
}
