use std::collections::{BTreeMap, HashMap};

/// Identifies one scheduled timer. Handles are never reused by a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// One-shot, cancellable timers ordered by deadline.
///
/// The queue never fires anything on its own: the owner polls
/// [`TimerQueue::expired`] from its event loop and turns the result into
/// events. Timers due at the same millisecond come out in schedule order.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: BTreeMap<(u64, u64), K>,
    deadlines: HashMap<u64, u64>,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, deadline_ms: u64, key: K) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert((deadline_ms, id), key);
        self.deadlines.insert(id, deadline_ms);
        TimerHandle(id)
    }

    /// Removes a pending timer. Returns its key, or `None` if it already
    /// fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<K> {
        let deadline = self.deadlines.remove(&handle.0)?;
        self.pending.remove(&(deadline, handle.0))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Takes every timer with `deadline <= now_ms`, earliest first.
    pub fn expired(&mut self, now_ms: u64) -> Vec<(TimerHandle, K)> {
        let due = match now_ms.checked_add(1) {
            Some(bound) => {
                let later = self.pending.split_off(&(bound, 0));
                std::mem::replace(&mut self.pending, later)
            }
            None => std::mem::take(&mut self.pending),
        };

        due.into_iter()
            .map(|((_, id), key)| {
                self.deadlines.remove(&id);
                (TimerHandle(id), key)
            })
            .collect()
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
