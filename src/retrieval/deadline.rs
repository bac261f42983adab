use std::time::{Duration, Instant};

/// Wall-clock budget for one strategy run or resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    /// `0` means unbounded.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::none()
        } else {
            Self::after(Duration::from_millis(ms))
        }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
