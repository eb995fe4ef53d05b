//! Starting external programs: one command, or two joined by a pipe.
//!
//! Every descriptor a child needs (redirection files, pipe ends) is handed to
//! [`Command`] as a [`Stdio`] and dropped in the parent as soon as the child
//! is spawned, so neither the shell nor a later child keeps a stray copy.

use crate::command::SimpleCommand;
use crate::error::{ShellError, SpawnReason};
use crate::external::{exit_code, find_command_path};
use crate::session::Session;
use std::env;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// How a single command ended up running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// Ran in the foreground and exited with this code.
    Finished(i32),
    /// Left running in the background with this pid.
    Background(u32),
}

/// Run one command, honoring its redirections.
///
/// Redirection files are opened before anything is spawned; if one cannot be
/// opened the command does not run. A foreground command is waited for and
/// its exit code is only logged. A background command is handed to the
/// session's job table.
pub fn launch(
    cmd: &SimpleCommand,
    background: bool,
    session: &mut Session,
) -> Result<Launched, ShellError> {
    let stdin = match &cmd.stdin {
        Some(path) => Stdio::from(open_input(path)?),
        None => Stdio::inherit(),
    };
    let stdout = match &cmd.stdout {
        Some(path) => Stdio::from(open_output(path)?),
        None => Stdio::inherit(),
    };

    let mut child = spawn(cmd, stdin, stdout)?;
    if background {
        let pid = child.id();
        session.jobs.track(child);
        return Ok(Launched::Background(pid));
    }

    let status = child
        .wait()
        .map_err(|e| ShellError::spawn(&cmd.program, e))?;
    let code = exit_code(status);
    debug!(program = %cmd.program, code, "command finished");
    Ok(Launched::Finished(code))
}

/// Run `left | right` in the foreground and wait for both.
///
/// A side that cannot be started is reported on its own; the other side
/// still runs to completion. Returns the failures, in spawn order.
pub fn run_pipeline(left: &SimpleCommand, right: &SimpleCommand) -> Vec<ShellError> {
    let (first, second) = spawn_pipeline(left, right, Stdio::inherit());

    let mut failures = Vec::new();
    for (cmd, child) in [(left, first), (right, second)] {
        match child.and_then(|mut child| {
            child
                .wait()
                .map_err(|e| ShellError::spawn(&cmd.program, e))
        }) {
            Ok(status) => debug!(program = %cmd.program, code = exit_code(status), "stage finished"),
            Err(err) => failures.push(err),
        }
    }
    failures
}

/// Spawn both sides of a pipe. The right side writes to `tail`.
///
/// If the left side fails to start, the right side reads an empty input. If
/// the right side fails, the read end is closed with it and the left side
/// sees a broken pipe.
pub(crate) fn spawn_pipeline(
    left: &SimpleCommand,
    right: &SimpleCommand,
    tail: Stdio,
) -> (Result<Child, ShellError>, Result<Child, ShellError>) {
    let mut first = spawn(left, Stdio::inherit(), Stdio::piped());
    let upstream = first
        .as_mut()
        .ok()
        .and_then(|child| child.stdout.take())
        .map_or_else(Stdio::null, Stdio::from);

    let second = spawn(right, upstream, tail);
    (first, second)
}

fn spawn(cmd: &SimpleCommand, stdin: Stdio, stdout: Stdio) -> Result<Child, ShellError> {
    let search_paths = env::var_os("PATH").unwrap_or_default();
    let executable = find_command_path(&search_paths, &cmd.program)
        .ok_or_else(|| ShellError::spawn(&cmd.program, SpawnReason::NotFound))?;

    let mut command = Command::new(&*executable);
    command.args(&cmd.args).stdin(stdin).stdout(stdout);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.arg0(&cmd.program);
    }

    let child = command
        .spawn()
        .map_err(|e| ShellError::spawn(&cmd.program, e))?;
    debug!(program = %cmd.program, pid = child.id(), "spawned");
    Ok(child)
}

fn open_input(path: &Path) -> Result<File, ShellError> {
    File::open(path).map_err(|source| ShellError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn open_output(path: &Path) -> Result<File, ShellError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path).map_err(|source| ShellError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    fn cmd(line: &str) -> SimpleCommand {
        let mut words = line.split(' ').map(str::to_string);
        let program = words.next().unwrap();
        SimpleCommand::new(program, words.collect())
    }

    #[test]
    fn output_redirection_truncates_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "previous contents that are much longer\n").unwrap();

        let mut echo = cmd("echo hi");
        echo.stdout = Some(out.clone());
        let launched = launch(&echo, false, &mut Session::default()).unwrap();

        assert_eq!(launched, Launched::Finished(0));
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
    }

    #[test]
    fn input_redirection_feeds_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let copy = dir.path().join("copy.txt");
        fs::write(&input, "line one\nline two\n").unwrap();

        let mut cat = cmd("cat");
        cat.stdin = Some(input);
        cat.stdout = Some(copy.clone());
        launch(&cat, false, &mut Session::default()).unwrap();

        assert_eq!(fs::read_to_string(&copy).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn unopenable_input_aborts_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never.txt");

        let mut cat = cmd("cat");
        cat.stdin = Some(dir.path().join("missing.txt"));
        cat.stdout = Some(out.clone());
        let err = launch(&cat, false, &mut Session::default()).unwrap_err();

        assert!(matches!(err, ShellError::Io { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn unknown_program_is_a_spawn_failure() {
        let err = launch(&cmd("notacommand123"), false, &mut Session::default()).unwrap_err();
        assert!(matches!(
            err,
            ShellError::SpawnFailure { reason: SpawnReason::NotFound, .. }
        ));
    }

    #[test]
    fn exit_code_is_reported_not_propagated() {
        let launched = launch(&cmd("false"), false, &mut Session::default()).unwrap();
        assert_eq!(launched, Launched::Finished(1));
    }

    #[test]
    fn background_launch_returns_immediately() {
        let mut session = Session::default();
        let started = Instant::now();
        let launched = launch(&cmd("sleep 1"), true, &mut session).unwrap();

        assert!(started.elapsed() < Duration::from_millis(900));
        let Launched::Background(pid) = launched else {
            panic!("expected a background launch, got {launched:?}");
        };
        assert_eq!(session.jobs.pids(), vec![pid]);
    }

    #[test]
    fn pipeline_matches_a_manually_connected_stream() {
        let (first, second) =
            spawn_pipeline(&cmd("echo hello"), &cmd("wc"), Stdio::piped());
        let output = second.unwrap().wait_with_output().unwrap();
        first.unwrap().wait().unwrap();

        let expected = Command::new("/bin/sh")
            .args(["-c", "echo hello | wc"])
            .output()
            .unwrap();
        assert_eq!(output.stdout, expected.stdout);
    }

    #[test]
    fn failed_left_side_leaves_right_side_running() {
        let (first, second) =
            spawn_pipeline(&cmd("notacommand123"), &cmd("wc -l"), Stdio::piped());
        assert!(first.is_err());

        let output = second.unwrap().wait_with_output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "0");
    }

    #[test]
    fn failed_right_side_is_reported_alone() {
        let failures = run_pipeline(&cmd("true"), &cmd("notacommand123"));
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            ShellError::SpawnFailure { program, .. } if program == "notacommand123"
        ));
    }
}
