use std::env;
use std::path::PathBuf;

/// Name of the history file kept in the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".mysh_history";

/// Limits and paths the shell runs with.
///
/// The numbers are the caps the shell has always enforced. Exceeding any of
/// them truncates or drops silently, it never errors.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Maximum number of tokens kept from one line.
    pub max_args: usize,
    /// Maximum number of lines the history store accepts.
    pub history_capacity: usize,
    /// Maximum prompt length in characters.
    pub prompt_limit: usize,
    /// Prompt shown until `setprompt` replaces it.
    pub default_prompt: String,
    /// Where history is loaded from and saved to. `None` disables persistence.
    pub history_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_args: 63,
            history_capacity: 100,
            prompt_limit: 63,
            default_prompt: "mysh".to_string(),
            history_file: None,
        }
    }
}

impl ShellConfig {
    /// Default limits with the history file placed under `$HOME`, or in the
    /// current directory when `HOME` is unset.
    pub fn from_env() -> Self {
        let base = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            history_file: Some(base.join(HISTORY_FILE_NAME)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = ShellConfig::default();
        assert_eq!(config.max_args, 63);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.prompt_limit, 63);
        assert_eq!(config.default_prompt, "mysh");
        assert!(config.history_file.is_none());
    }

    #[test]
    fn history_file_lives_in_home() {
        let config = ShellConfig::from_env();
        let path = config.history_file.expect("history path");
        assert!(path.ends_with(HISTORY_FILE_NAME));
    }
}
