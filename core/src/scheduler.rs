use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Deferred work the game asks its shell to hand back later through [`Game::fire`].
///
/// Every timer carries the [`Generation`] that was current when it was scheduled; a timer whose
/// generation no longer matches is dropped on delivery.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timer {
    /// Flash step `index` of the sequence and play its note.
    ShowStep { generation: Generation, index: usize },
    /// Revert step `index` to its default look.
    HideStep { generation: Generation, index: usize },
    /// Whole sequence has been shown.
    PlaybackDone { generation: Generation },
    /// End of the short confirmation flash after a correct click.
    EndPulse { generation: Generation, tile: Tile },
    NextLevel { generation: Generation },
    Retry { generation: Generation },
    GameOver { generation: Generation },
}

impl Timer {
    pub const fn generation(self) -> Generation {
        use Timer::*;
        match self {
            ShowStep { generation, .. }
            | HideStep { generation, .. }
            | PlaybackDone { generation }
            | EndPulse { generation, .. }
            | NextLevel { generation }
            | Retry { generation }
            | GameOver { generation } => generation,
        }
    }

    pub(crate) const fn is_playback(self) -> bool {
        use Timer::*;
        matches!(
            self,
            ShowStep { .. } | HideStep { .. } | PlaybackDone { .. } | EndPulse { .. }
        )
    }
}

/// One-shot "after `delay`, deliver `timer`" capability provided by the shell.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule(&mut self, delay: Duration, timer: Timer) {
        (**self).schedule(delay, timer)
    }
}

#[derive(Clone, Debug)]
struct Pending {
    due: Duration,
    seq: u64,
    timer: Timer,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Virtual-time scheduler: timers fire in due order, ties in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Pending>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.peek().map(|Reverse(pending)| pending.due)
    }

    /// Jumps the clock to the earliest pending timer and returns it.
    pub fn pop_next(&mut self) -> Option<Timer> {
        let Reverse(pending) = self.pending.pop()?;
        self.now = self.now.max(pending.due);
        Some(pending.timer)
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to its due time.
    ///
    /// Firing the returned timer before asking for the next one keeps follow-up timers
    /// relative to the moment that caused them.
    pub fn pop_due(&mut self, until: Duration) -> Option<Timer> {
        match self.next_due() {
            Some(due) if due <= until => self.pop_next(),
            _ => None,
        }
    }

    /// Moves the clock to `until` once nothing earlier is pending.
    pub fn settle(&mut self, until: Duration) {
        debug_assert!(self.next_due().is_none_or(|due| due > until));
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, timer: Timer) {
        let pending = Pending {
            due: self.now + delay,
            seq: self.next_seq,
            timer,
        };
        self.next_seq += 1;
        self.pending.push(Reverse(pending));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(generation: Generation) -> Timer {
        Timer::Retry { generation }
    }

    #[test]
    fn fires_in_due_order_with_fifo_ties() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(300), retry(3));
        queue.schedule(Duration::from_millis(100), retry(1));
        queue.schedule(Duration::from_millis(100), retry(2));

        assert_eq!(queue.pop_next(), Some(retry(1)));
        assert_eq!(queue.pop_next(), Some(retry(2)));
        assert_eq!(queue.now(), Duration::from_millis(100));
        assert_eq!(queue.pop_next(), Some(retry(3)));
        assert_eq!(queue.now(), Duration::from_millis(300));
        assert_eq!(queue.pop_next(), None);
    }

    #[test]
    fn pop_due_stops_at_the_horizon() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(500), retry(1));
        queue.schedule(Duration::from_millis(1500), retry(2));

        assert_eq!(queue.pop_due(Duration::from_millis(499)), None);
        assert_eq!(queue.pop_due(Duration::from_millis(1000)), Some(retry(1)));
        assert_eq!(queue.now(), Duration::from_millis(500));

        // scheduled relative to the timer that was just handed out
        queue.schedule(Duration::from_millis(100), retry(3));
        assert_eq!(queue.pop_due(Duration::from_millis(1000)), Some(retry(3)));
        assert_eq!(queue.now(), Duration::from_millis(600));
        assert_eq!(queue.pop_due(Duration::from_millis(1000)), None);

        queue.settle(Duration::from_millis(1000));
        assert_eq!(queue.now(), Duration::from_millis(1000));
        assert_eq!(queue.next_due(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn timers_report_generation() {
        let tile = Tile::new(0, 1);
        assert_eq!(Timer::EndPulse { generation: 9, tile }.generation(), 9);
        assert!(Timer::HideStep { generation: 0, index: 2 }.is_playback());
        assert!(!Timer::NextLevel { generation: 0 }.is_playback());
    }
}
