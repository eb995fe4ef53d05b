use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the shell reports to the user before returning to the prompt.
///
/// None of these terminate the shell. They are printed by [`report`] and the
/// loop carries on with the next line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `!n` asked for an entry that does not exist.
    #[error("No such command in history.")]
    OutOfRange { index: i64, count: usize },

    /// A redirection target could not be opened; nothing was spawned.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The program could not be found or started.
    #[error("{program}: {reason}")]
    SpawnFailure { program: String, reason: SpawnReason },

    /// `cd` could not switch to the requested directory.
    #[error("cd: {}: {source}", .target.display())]
    DirectoryChange {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The line uses operators in a combination the shell does not run.
    #[error("syntax error: {0}")]
    Syntax(&'static str),
}

#[derive(Debug, Error)]
pub enum SpawnReason {
    #[error("command not found")]
    NotFound,
    #[error("{0}")]
    Os(#[from] io::Error),
}

impl ShellError {
    pub(crate) fn spawn(program: &str, reason: impl Into<SpawnReason>) -> Self {
        ShellError::SpawnFailure {
            program: program.to_string(),
            reason: reason.into(),
        }
    }
}

/// Print a diagnostic on stderr.
///
/// History misses are printed on stdout without a prefix, the way the prompt
/// loop has always shown them.
pub fn report(err: &ShellError) {
    match err {
        ShellError::OutOfRange { .. } => println!("{err}"),
        _ => eprintln!("mysh: {err}"),
    }
}
