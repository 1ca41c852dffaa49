use crate::config::CompletionPolicy;

/// Per-stitch bookkeeping of requested, loaded and failed textures.
#[derive(Debug, Clone)]
pub struct LoadSession {
    requested: usize,
    loaded: usize,
    failed: usize,
    policy: CompletionPolicy,
    completed: bool,
}

impl LoadSession {
    pub fn new(requested: usize, policy: CompletionPolicy) -> Self {
        Self {
            requested,
            loaded: 0,
            failed: 0,
            policy,
            completed: false,
        }
    }

    /// Count a successful copy. Returns true if this completed the session.
    pub fn record_loaded(&mut self) -> bool {
        debug_assert!(self.settled() < self.requested, "more completions than requests");
        self.loaded += 1;
        self.check_completion()
    }

    /// Count a failed fetch. Returns true if this completed the session.
    pub fn record_failed(&mut self) -> bool {
        debug_assert!(self.settled() < self.requested, "more completions than requests");
        self.failed += 1;
        self.check_completion()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Fetches that finished either way.
    pub fn settled(&self) -> usize {
        self.loaded + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn check_completion(&mut self) -> bool {
        if self.completed || self.requested == 0 {
            return false;
        }
        let done = match self.policy {
            CompletionPolicy::LoadedOnly => self.loaded == self.requested,
            CompletionPolicy::Settled => self.settled() == self.requested,
        };
        self.completed = done;
        done
    }
}
