//! Wrong-flash revert scheduling.
//!
//! A wrong click schedules a revert for that chip; the page posts a `tick`
//! once the delay has passed and every revert that is due gets drained.
//! A second wrong click on the same chip adds another entry instead of
//! replacing the first one, so the earlier revert may clear the newer flash
//! early. Reverts are idempotent in the game, so that is harmless.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRevert {
    pub token: usize,
    pub due_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RevertQueue {
    pending: Vec<PendingRevert>,
}

impl RevertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, token: usize, now_ms: u64, delay_ms: u64) {
        self.pending.push(PendingRevert {
            token,
            due_ms: now_ms.saturating_add(delay_ms),
        });
    }

    /// Remove and return every token whose revert is due, in scheduling order.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<usize> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(p.token);
                false
            } else {
                true
            }
        });
        due
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_entries() {
        let mut q = RevertQueue::new();
        q.schedule(1, 1_000, 500);
        q.schedule(2, 1_200, 500);
        assert!(q.take_due(1_499).is_empty());
        assert_eq!(q.take_due(1_500), vec![1]);
        assert_eq!(q.next_due(), Some(1_700));
        assert_eq!(q.take_due(5_000), vec![2]);
        assert!(q.is_empty());
    }

    #[test]
    fn overlapping_schedules_are_kept() {
        let mut q = RevertQueue::new();
        q.schedule(3, 0, 500);
        q.schedule(3, 200, 500);
        assert_eq!(q.len(), 2);
        assert_eq!(q.take_due(500), vec![3]);
        assert_eq!(q.take_due(700), vec![3]);
    }
}
