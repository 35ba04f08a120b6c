//! Progressive disclosure of catalog groups

/// Counts how many category groups are revealed. Only ever grows.
#[derive(Clone, Debug)]
pub struct FeedReveal {
    revealed: usize,
    total: usize,
    /// Revealed count when the sentinel was last reported visible. A sighting
    /// counts once per revealed count.
    seen_at: Option<usize>,
}

impl FeedReveal {
    pub fn new(initial: usize, total: usize) -> Self {
        Self {
            revealed: initial.min(total),
            total,
            seen_at: None,
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the end-of-list sentinel is rendered at all
    pub fn has_sentinel(&self) -> bool {
        self.revealed < self.total
    }

    /// Report sentinel visibility after a render. Returns true when a group
    /// was revealed.
    pub fn observe_sentinel(&mut self, visible: bool) -> bool {
        if !visible {
            self.seen_at = None;
            return false;
        }
        if !self.has_sentinel() || self.seen_at == Some(self.revealed) {
            return false;
        }
        self.seen_at = Some(self.revealed);
        self.revealed += 1;
        tracing::debug!(revealed = self.revealed, total = self.total, "Revealed next category group");
        true
    }
}
