use crate::config::ShellConfig;
use crate::history::History;
use crate::jobs::BackgroundJobs;
use std::env;
use std::path::PathBuf;

/// State that lives as long as the shell does.
///
/// Every component receives the session explicitly; nothing is kept in
/// globals. Only the prompt loop mutates it, so there is no locking. A
/// second reader (say, a status line redrawn from another thread) would have
/// to wrap it first.
#[derive(Debug)]
pub struct Session {
    pub config: ShellConfig,
    pub history: History,
    pub jobs: BackgroundJobs,
    prompt: String,
}

impl Session {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            history: History::with_capacity(config.history_capacity),
            jobs: BackgroundJobs::default(),
            prompt: config.default_prompt.clone(),
            config,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the prompt, keeping at most `prompt_limit` characters.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.chars().take(self.config.prompt_limit).collect();
    }

    /// Text shown before each line is read.
    pub fn render_prompt(&self) -> String {
        format!("{}> ", self.prompt)
    }

    /// Target of a bare `cd`.
    pub fn home_dir(&self) -> Option<PathBuf> {
        env::var_os("HOME").map(PathBuf::from)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_starts_at_default() {
        let session = Session::default();
        assert_eq!(session.prompt(), "mysh");
        assert_eq!(session.render_prompt(), "mysh> ");
    }

    #[test]
    fn prompt_is_capped() {
        let mut session = Session::default();
        session.set_prompt(&"x".repeat(200));
        assert_eq!(session.prompt().chars().count(), 63);
    }

    #[test]
    fn history_capacity_follows_config() {
        let config = ShellConfig {
            history_capacity: 2,
            ..ShellConfig::default()
        };
        let mut session = Session::new(config);
        for line in ["a", "b", "c"] {
            session.history.record(line);
        }
        assert_eq!(session.history.len(), 2);
    }
}
