use crate::session::Session;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

/// One program invocation with its optional redirections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleCommand {
    /// Command name, `argv[0]`.
    pub program: String,
    /// Arguments following the command name.
    pub args: Vec<String>,
    /// File to read standard input from (`< path`).
    pub stdin: Option<PathBuf>,
    /// File to truncate and write standard output to (`> path`).
    pub stdout: Option<PathBuf>,
}

impl SimpleCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ..Self::default()
        }
    }

    pub fn has_redirection(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some()
    }
}

/// Shape of a resolved line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stages {
    /// Nothing to run, e.g. a line made of operators only.
    Empty,
    Single(SimpleCommand),
    /// `left | right`.
    Pipe(SimpleCommand, SimpleCommand),
}

/// Everything the launchers need to run one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub stages: Stages,
    /// Started with a trailing `&`.
    pub background: bool,
}

impl CommandLine {
    /// The command a builtin lookup is made against: the only command, or the
    /// left side of a pipe.
    pub fn head(&self) -> Option<&SimpleCommand> {
        match &self.stages {
            Stages::Empty => None,
            Stages::Single(cmd) | Stages::Pipe(cmd, _) => Some(cmd),
        }
    }
}

/// What the prompt loop does after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

/// Object-safe trait for a command executed inside the shell process.
pub trait ExecutableCommand {
    /// Run the command, writing user-visible output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, session: &mut Session) -> Result<Flow>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
