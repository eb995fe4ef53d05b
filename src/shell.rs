use crate::builtin::{Builtins, Dispatch};
use crate::command::{Flow, Stages};
use crate::config::ShellConfig;
use crate::error::{self, ShellError};
use crate::history;
use crate::launcher::{self, Launched};
use crate::resolver;
use crate::session::Session;
use crate::signal::Interrupts;
use crate::tokenizer;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use tracing::{debug, warn};

/// An interactive shell: one session plus the builtins it can run in-process.
///
/// Example
/// ```
/// use mysh::{Flow, Shell, ShellConfig};
/// let mut sh = Shell::new(ShellConfig::default());
/// let mut out = Vec::new();
/// assert_eq!(sh.execute_with_output("setprompt demo", &mut out), Flow::Continue);
/// assert_eq!(sh.session().render_prompt(), "demo> ");
/// ```
pub struct Shell {
    session: Session,
    builtins: Builtins,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            session: Session::new(config),
            builtins: Builtins::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run one line of input, writing shell output to stdout.
    pub fn execute_line(&mut self, line: &str) -> Flow {
        self.execute_with_output(line, &mut io::stdout())
    }

    /// Run one line of input, writing shell output (builtin output, recall
    /// echoes, background pids) to `out`. Programs write to the real stdout
    /// unless redirected.
    ///
    /// Failures are reported and swallowed; only `exit` stops the shell.
    pub fn execute_with_output(&mut self, line: &str, out: &mut dyn Write) -> Flow {
        match self.try_execute(line, out) {
            Ok(flow) => flow,
            Err(e) => {
                match e.downcast_ref::<ShellError>() {
                    Some(err) => error::report(err),
                    None => eprintln!("mysh: {e:#}"),
                }
                Flow::Continue
            }
        }
    }

    fn try_execute(&mut self, line: &str, out: &mut dyn Write) -> anyhow::Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let text = match history::recall_index(line) {
            Some(index) => {
                let recalled = self.session.history.recall(index)?.to_string();
                writeln!(out, "Executing: {recalled}")?;
                recalled
            }
            None => {
                self.session.history.record(line);
                line.to_string()
            }
        };

        let argv = tokenizer::tokenize(&text, self.session.config.max_args);
        let command_line = resolver::resolve(argv)?;

        match self
            .builtins
            .dispatch(command_line.head(), out, &mut self.session)?
        {
            Dispatch::Terminate => return Ok(Flow::Terminate),
            Dispatch::Handled => return Ok(Flow::Continue),
            Dispatch::NotBuiltin => {}
        }

        out.flush()?;
        match &command_line.stages {
            Stages::Single(cmd) => {
                let launched = launcher::launch(cmd, command_line.background, &mut self.session)?;
                if let Launched::Background(pid) = launched {
                    writeln!(out, "[Background pid {pid}]")?;
                }
            }
            Stages::Pipe(left, right) => {
                for failure in launcher::run_pipeline(left, right) {
                    error::report(&failure);
                }
            }
            Stages::Empty => {}
        }
        Ok(Flow::Continue)
    }

    /// Read-eval loop over the terminal until `exit` or end of input.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let interrupts = Interrupts::install()?;
        self.load_history();

        let mut rl = DefaultEditor::new()?;
        for (_, line) in self.session.history.list() {
            rl.add_history_entry(line)?;
        }

        println!("Welcome to MySH! Type 'help' or 'exit'.");
        loop {
            self.session.jobs.reap();
            let prompt = self.session.render_prompt().green().to_string();
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    let flow = self.execute_line(&line);
                    if interrupts.take() {
                        println!();
                    }
                    if flow == Flow::Terminate {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    interrupts.take();
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "line input failed");
                    eprintln!("mysh: {err}");
                    break;
                }
            }
        }

        self.save_history();
        println!("Goodbye!");
        Ok(())
    }

    fn load_history(&mut self) {
        let Some(path) = self.session.config.history_file.clone() else {
            return;
        };
        if let Err(e) = self.session.history.load(&path) {
            debug!(path = %path.display(), error = %e, "history not loaded");
        }
    }

    fn save_history(&self) {
        let Some(path) = &self.session.config.history_file else {
            return;
        };
        if let Err(e) = self.session.history.save(path) {
            debug!(path = %path.display(), error = %e, "history not saved");
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}
