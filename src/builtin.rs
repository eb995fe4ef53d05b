use crate::command::{CommandFactory, ExecutableCommand, Flow, SimpleCommand};
use crate::error::{self, ShellError};
use crate::session::Session;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use colored::Colorize;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Text printed by `help`.
pub const HELP_TEXT: &str = "\
MySH Help:
  cd <dir>         Change directory
  exit             Exit the shell
  history          Show command history
  !n               Execute nth command from history
  setprompt <name> Set custom prompt
  ls               List the current directory
  cmd1 | cmd2      Pipe output of cmd1 to input of cmd2
  cmd > file       Redirect output to file
  cmd < file       Redirect input from file
  &                Run command in background
";

/// Outcome of offering a command to the builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// `exit` was run.
    Terminate,
    /// A builtin ran to completion, or there was nothing to run.
    Handled,
    /// The command has to be launched as a process.
    NotBuiltin,
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "history".
    fn name() -> &'static str;

    /// Whether this builtin handles the given arguments at all. When it
    /// does not, the line is launched as an external program instead.
    fn claims(_args: &[&str]) -> bool {
        true
    }

    /// Build the command from its arguments. Builtins whose arguments are
    /// free-form words override this so that `-x` or `help` is never read
    /// as a flag.
    fn parse(name: &str, args: &[&str]) -> Result<Self, EarlyExit> {
        Self::from_args(&[name], args)
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, session: &mut Session) -> Result<Flow> {
        match T::execute(*self, stdout, session) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                match e.downcast_ref::<ShellError>() {
                    Some(err) => error::report(err),
                    None => eprintln!("mysh: {}: {e:#}", T::name()),
                }
                Ok(Flow::Continue)
            }
        }
    }
}

/// Help or usage text produced by argh instead of a parsed command.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _session: &mut Session) -> Result<Flow> {
        if self.is_error {
            eprintln!("{}", self.output.trim_end());
        } else {
            writeln!(stdout, "{}", self.output.trim_end())?;
        }
        Ok(Flow::Continue)
    }
}

/// Factory allows creating instances of a [`BuiltinCommand`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() || !T::claims(args) {
            return None;
        }
        Some(match T::parse(name, args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

/// The set of commands run inside the shell process.
pub struct Builtins {
    factories: Vec<Box<dyn CommandFactory>>,
}

impl Builtins {
    pub fn new(factories: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { factories }
    }

    /// Run `cmd` if it names a builtin.
    ///
    /// `None` (a line with nothing left to run) counts as handled.
    pub fn dispatch(
        &self,
        cmd: Option<&SimpleCommand>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Dispatch> {
        let Some(cmd) = cmd else {
            return Ok(Dispatch::Handled);
        };
        let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
        let Some(builtin) = self
            .factories
            .iter()
            .find_map(|factory| factory.try_create(&cmd.program, &args))
        else {
            return Ok(Dispatch::NotBuiltin);
        };
        Ok(match builtin.execute(stdout, session)? {
            Flow::Terminate => Dispatch::Terminate,
            Flow::Continue => Dispatch::Handled,
        })
    }
}

impl Default for Builtins {
    /// `exit`, `cd`, `history`, `help`, `setprompt` and `ls`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<HistoryCmd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<SetPrompt>::default()),
            Box::new(Factory::<Ls>::default()),
        ])
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn parse(_name: &str, args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            _args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    fn execute(self, _stdout: &mut dyn Write, _session: &mut Session) -> Result<Flow> {
        Ok(Flow::Terminate)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    /// Only the first word is the target; the rest are ignored.
    fn parse(_name: &str, args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            target: args.first().map(|t| t.to_string()),
        })
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<Flow> {
        let target = match self.target.filter(|t| !t.is_empty()) {
            Some(t) => PathBuf::from(t),
            None => session.home_dir().ok_or_else(|| ShellError::DirectoryChange {
                target: PathBuf::from("$HOME"),
                source: io::Error::new(io::ErrorKind::NotFound, "HOME not set"),
            })?,
        };
        env::set_current_dir(&target)
            .map_err(|source| ShellError::DirectoryChange { target, source })?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Show command history.
pub struct HistoryCmd {}

impl BuiltinCommand for HistoryCmd {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<Flow> {
        for (index, line) in session.history.list() {
            writeln!(stdout, "{index}: {line}")?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Show the list of shell features.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<Flow> {
        stdout.write_all(HELP_TEXT.as_bytes())?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Set the prompt shown before each command.
pub struct SetPrompt {
    #[argh(positional, greedy)]
    /// new prompt text; only the first word is used.
    pub words: Vec<String>,
}

impl BuiltinCommand for SetPrompt {
    fn name() -> &'static str {
        "setprompt"
    }

    fn parse(_name: &str, args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            words: args.iter().map(|w| w.to_string()).collect(),
        })
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<Flow> {
        match self.words.first() {
            Some(prompt) => session.set_prompt(prompt),
            None => writeln!(stdout, "Usage: setprompt <new_prompt>")?,
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// List the current directory, hiding dotfiles.
pub struct Ls {}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    /// `ls` with arguments (`ls -l`, `ls /tmp`) runs the real program.
    fn claims(args: &[&str]) -> bool {
        args.is_empty()
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<Flow> {
        list_directory(&env::current_dir()?, stdout)?;
        Ok(Flow::Continue)
    }
}

/// Write the visible entries of `dir`, sorted by name, one per line.
///
/// Directories are blue, symlinks cyan, executables green.
fn list_directory(dir: &Path, stdout: &mut dyn Write) -> Result<()> {
    let mut entries: Vec<(String, EntryKind)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            (!name.starts_with('.')).then(|| (name, EntryKind::of(&entry.path())))
        })
        .collect();
    entries.sort();

    for (name, kind) in entries {
        match kind {
            EntryKind::Directory => writeln!(stdout, "{}", name.blue().bold())?,
            EntryKind::Symlink => writeln!(stdout, "{}", name.cyan())?,
            EntryKind::Executable => writeln!(stdout, "{}", name.green())?,
            EntryKind::Other => writeln!(stdout, "{name}")?,
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EntryKind {
    Directory,
    Symlink,
    Executable,
    Other,
}

impl EntryKind {
    fn of(path: &Path) -> Self {
        let Ok(meta) = fs::symlink_metadata(path) else {
            return EntryKind::Other;
        };
        if meta.file_type().is_symlink() {
            EntryKind::Symlink
        } else if meta.is_dir() {
            EntryKind::Directory
        } else if is_executable(&meta) {
            EntryKind::Executable
        } else {
            EntryKind::Other
        }
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}
