//! Children started with `&`.
//!
//! The shell never waits on these. The table only exists so that finished
//! children get reaped instead of lingering as defunct entries.

use crate::external::exit_code;
use std::process::Child;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct BackgroundJobs {
    children: Vec<Child>,
}

impl BackgroundJobs {
    pub fn track(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Collect every child that has exited, without blocking.
    ///
    /// Returns the pids that were reaped.
    pub fn reap(&mut self) -> Vec<u32> {
        let mut reaped = Vec::new();
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), code = exit_code(status), "background job finished");
                reaped.push(child.id());
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "cannot poll background job");
                false
            }
        });
        reaped
    }

    /// Pids of the children still running as of the last [`reap`](Self::reap).
    pub fn pids(&self) -> Vec<u32> {
        self.children.iter().map(Child::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn finished_children_are_reaped() {
        let mut jobs = BackgroundJobs::default();
        let child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        jobs.track(child);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reaped = Vec::new();
        while reaped.is_empty() && Instant::now() < deadline {
            reaped = jobs.reap();
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(reaped, vec![pid]);
        assert!(jobs.is_empty());
    }

    #[test]
    fn running_children_stay_tracked() {
        let mut jobs = BackgroundJobs::default();
        let child = Command::new("sleep").arg("5").spawn().unwrap();
        let pid = child.id();
        jobs.track(child);

        assert!(jobs.reap().is_empty());
        assert_eq!(jobs.pids(), vec![pid]);

        for mut child in jobs.children.drain(..) {
            child.kill().unwrap();
            child.wait().unwrap();
        }
    }
}
