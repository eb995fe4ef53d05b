//! A small interactive line shell.
//!
//! Each input line is split on spaces, optionally replaced by a history entry
//! (`!n`), and then either run by a builtin (`exit`, `cd`, `history`, `help`,
//! `setprompt`, `ls`) or launched as one external program or two programs
//! joined by a pipe. A single `<` and `>` redirect a lone command's standard
//! streams and a trailing `&` leaves it running in the background.
//!
//! The main entry point is [`Shell`]. [`Shell::execute_line`] runs one line;
//! [`Shell::repl`] drives the whole prompt loop.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
pub mod history;
pub mod jobs;
pub mod launcher;
pub mod resolver;
mod session;
mod shell;
mod signal;
pub mod tokenizer;

pub use builtin::Dispatch;
pub use command::{CommandLine, Flow, SimpleCommand, Stages};
pub use config::ShellConfig;
pub use error::ShellError;
pub use session::Session;
pub use shell::Shell;
