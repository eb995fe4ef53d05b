//! Turning an argument vector into a [`CommandLine`].
//!
//! The operators are recognized only as whole tokens: `&` (background),
//! `|` (pipe), `<` and `>` (redirection). `a>b` is an ordinary argument.

use crate::command::{CommandLine, SimpleCommand, Stages};
use crate::error::ShellError;
use std::path::PathBuf;
use tracing::debug;

const BACKGROUND: &str = "&";
const PIPE: &str = "|";
const REDIRECT_IN: &str = "<";
const REDIRECT_OUT: &str = ">";

/// Extract the operators from `argv` in a single pass per operator class.
///
/// - Everything after the first `&` is dropped and the line runs in the
///   background.
/// - The first `|` splits the line in two. Any later `|` is an argument of
///   the right side.
/// - `<` and `>` are honored only when there is no pipe. An operator that is
///   the last token has no operand and stays a plain argument.
pub fn resolve(mut argv: Vec<String>) -> Result<CommandLine, ShellError> {
    let background = match argv.iter().position(|arg| arg == BACKGROUND) {
        Some(pos) => {
            if pos + 1 < argv.len() {
                debug!(dropped = ?&argv[pos + 1..], "arguments after '&' ignored");
            }
            argv.truncate(pos);
            true
        }
        None => false,
    };

    let stages = match argv.iter().position(|arg| arg == PIPE) {
        None => split_redirections(argv).map_or(Stages::Empty, Stages::Single),
        Some(pos) => {
            let right = argv.split_off(pos + 1);
            argv.truncate(pos);
            if background {
                return Err(ShellError::Syntax("a pipeline cannot run in the background"));
            }
            Stages::Pipe(pipe_side(argv)?, pipe_side(right)?)
        }
    };

    Ok(CommandLine { stages, background })
}

fn pipe_side(words: Vec<String>) -> Result<SimpleCommand, ShellError> {
    if words.iter().any(|w| w == REDIRECT_IN || w == REDIRECT_OUT) {
        return Err(ShellError::Syntax("redirection is not supported inside a pipeline"));
    }
    let mut words = words.into_iter();
    let program = words
        .next()
        .ok_or(ShellError::Syntax("missing command on one side of '|'"))?;
    Ok(SimpleCommand::new(program, words.collect()))
}

/// Pull `< path` and `> path` out of `words`. `None` when no program is left.
fn split_redirections(words: Vec<String>) -> Option<SimpleCommand> {
    let mut stdin: Option<PathBuf> = None;
    let mut stdout: Option<PathBuf> = None;
    let mut rest = Vec::with_capacity(words.len());

    let mut words = words.into_iter();
    while let Some(word) = words.next() {
        let slot = match word.as_str() {
            REDIRECT_IN => &mut stdin,
            REDIRECT_OUT => &mut stdout,
            _ => {
                rest.push(word);
                continue;
            }
        };
        match words.next() {
            Some(target) => *slot = Some(target.into()),
            None => rest.push(word),
        }
    }

    let mut rest = rest.into_iter();
    let Some(program) = rest.next() else {
        if stdin.is_some() || stdout.is_some() {
            debug!("redirection without a command ignored");
        }
        return None;
    };
    Some(SimpleCommand {
        program,
        args: rest.collect(),
        stdin,
        stdout,
    })
}
