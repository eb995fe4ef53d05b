//! Keeping Ctrl-C from killing the shell.
//!
//! The handler only sets an atomic flag, which is safe at any point a
//! signal may land. Children start with the default disposition (exec resets
//! handled signals), so a foreground program is still interrupted while the
//! shell survives and redraws its prompt.

use signal_hook::consts::SIGINT;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct Interrupts {
    pending: Arc<AtomicBool>,
}

impl Interrupts {
    /// Route SIGINT to a flag instead of the default "terminate".
    pub fn install() -> io::Result<Self> {
        let pending = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGINT, Arc::clone(&pending))?;
        Ok(Self { pending })
    }

    /// Whether an interrupt arrived since the last call. Clears the flag.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_sets_flag_and_take_clears_it() {
        let interrupts = Interrupts::install().unwrap();
        interrupts.take();

        signal_hook::low_level::raise(SIGINT).unwrap();
        assert!(interrupts.take());
        assert!(!interrupts.take());
    }
}
