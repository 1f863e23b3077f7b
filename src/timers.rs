//! Single-shot timer queue driven by the host's elapsed-time ticks.
//!
//! The controller never blocks; deferred work (arming the close affordance,
//! coalescing a menu double click) is scheduled here and fired from the same
//! `advance` call that steps motion and fades.

use std::collections::BTreeMap;

/// What a fired timer means to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerId {
    /// Close affordance becomes clickable after the arm delay.
    CloseButtonArm,
    /// Menu button waited out the double-click interval; treat as a click.
    MenuSingleClick,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    /// Remaining milliseconds per armed timer.
    pending: BTreeMap<TimerId, u64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `id` to fire after `delay_ms`. Re-scheduling an armed timer
    /// restarts it.
    pub fn schedule(&mut self, id: TimerId, delay_ms: u64) {
        self.pending.insert(id, delay_ms);
    }

    /// Disarms `id`; fine to call when it is not armed.
    pub fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Advances every armed timer by `elapsed_ms` and returns the ones that
    /// fired, each at most once.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<TimerId> {
        let mut fired = Vec::new();
        self.pending.retain(|id, remaining| {
            if *remaining <= elapsed_ms {
                fired.push(*id);
                false
            } else {
                *remaining -= elapsed_ms;
                true
            }
        });
        fired
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut q = TimerQueue::new();
        q.schedule(TimerId::CloseButtonArm, 100);
        assert!(q.advance(60).is_empty());
        assert_eq!(q.advance(60), vec![TimerId::CloseButtonArm]);
        assert!(q.advance(60).is_empty());
    }

    #[test]
    fn reschedule_restarts_the_countdown() {
        let mut q = TimerQueue::new();
        q.schedule(TimerId::MenuSingleClick, 100);
        q.advance(90);
        q.schedule(TimerId::MenuSingleClick, 100);
        assert!(q.advance(90).is_empty());
        assert_eq!(q.advance(10), vec![TimerId::MenuSingleClick]);
    }

    #[test]
    fn cancel_disarms() {
        let mut q = TimerQueue::new();
        q.schedule(TimerId::CloseButtonArm, 50);
        q.cancel(TimerId::CloseButtonArm);
        assert!(!q.is_armed(TimerId::CloseButtonArm));
        assert!(q.advance(1000).is_empty());
    }
}
