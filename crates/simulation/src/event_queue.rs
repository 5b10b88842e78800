//! Time-ordered event queue.

use maploader_core::Event;
use maploader_types::ScriptHandle;
use std::collections::BTreeMap;
use std::time::Duration;

/// Ordering key for scheduled items.
///
/// Items fire in time order; items scheduled for the same instant fire in
/// the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    /// When the item fires.
    pub time: Duration,
    /// Tie-breaker, strictly increasing per queue.
    pub sequence: u64,
}

/// Something the runner has scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scheduled {
    /// Deliver an event to the coordinator.
    Deliver(Event),
    /// The external resource's script finished downloading and executes.
    Bootstrap { handle: ScriptHandle },
}

/// Queue of scheduled items keyed by [`EventKey`].
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    items: BTreeMap<EventKey, Scheduled>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn push(&mut self, time: Duration, item: Scheduled) -> EventKey {
        let key = EventKey {
            time,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.items.insert(key, item);
        key
    }

    pub fn remove(&mut self, key: &EventKey) -> Option<Scheduled> {
        self.items.remove(key)
    }

    pub fn pop_first(&mut self) -> Option<(EventKey, Scheduled)> {
        self.items.pop_first()
    }

    pub fn peek_time(&self) -> Option<Duration> {
        self.items.keys().next().map(|key| key.time)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maploader_core::TimerId;

    #[test]
    fn test_orders_by_time_then_sequence() {
        let mut queue = EventQueue::default();
        queue.push(
            Duration::from_millis(20),
            Scheduled::Deliver(Event::Timer(TimerId::Settle)),
        );
        queue.push(
            Duration::from_millis(10),
            Scheduled::Deliver(Event::Timer(TimerId::ScriptPoll)),
        );
        queue.push(
            Duration::from_millis(10),
            Scheduled::Deliver(Event::HeadMutated { inserted: 1 }),
        );

        assert_eq!(queue.peek_time(), Some(Duration::from_millis(10)));
        let (_, first) = queue.pop_first().unwrap();
        assert_eq!(first, Scheduled::Deliver(Event::Timer(TimerId::ScriptPoll)));
        let (_, second) = queue.pop_first().unwrap();
        assert_eq!(second, Scheduled::Deliver(Event::HeadMutated { inserted: 1 }));
        let (key, _) = queue.pop_first().unwrap();
        assert_eq!(key.time, Duration::from_millis(20));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_by_key() {
        let mut queue = EventQueue::default();
        let key = queue.push(Duration::ZERO, Scheduled::Bootstrap { handle: ScriptHandle(1) });
        assert_eq!(queue.len(), 1);
        assert!(queue.remove(&key).is_some());
        assert!(queue.remove(&key).is_none());
        assert_eq!(queue.peek_time(), None);
    }
}
