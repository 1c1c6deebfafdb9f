//! Cancellable delayed ticks for the playback engine
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Identifies one armed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Schedules ticks and reports the ones that have come due.
pub trait Timer {
    fn schedule(&mut self, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
    /// Drains ticks that are due, in firing order. Cancelled ticks never appear.
    fn fired(&mut self) -> Vec<TimerId>;
}

/// A fake clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_id: u64,
    pending: Vec<(TimerId, Duration)>,
    due: Vec<TimerId>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward, queueing every tick whose deadline passed.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        let now = self.now;
        let (mut ready, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(_, at)| *at <= now);
        self.pending = waiting;
        ready.sort_by_key(|(id, at)| (*at, id.0));
        self.due.extend(ready.into_iter().map(|(id, _)| id));
    }

    /// Ticks armed but not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len() + self.due.len()
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, self.now + delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(pending, _)| *pending != id);
        self.due.retain(|due| *due != id);
    }

    fn fired(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.due)
    }
}

/// Sleeps on a helper thread per tick and reports back over a channel.
pub struct ThreadTimer {
    sender: Sender<TimerId>,
    receiver: Receiver<TimerId>,
    next_id: u64,
    cancelled: HashSet<TimerId>,
}

impl ThreadTimer {
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            sender,
            receiver,
            next_id: 0,
            cancelled: HashSet::new(),
        }
    }

    /// Blocks until a live tick fires or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<TimerId> {
        loop {
            match self.receiver.recv_timeout(timeout) {
                Ok(id) if self.cancelled.remove(&id) => continue,
                Ok(id) => return Some(id),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}

impl Timer for ThreadTimer {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let sender = self.sender.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = sender.send(id);
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.cancelled.insert(id);
    }

    fn fired(&mut self) -> Vec<TimerId> {
        let mut ids = Vec::new();
        while let Ok(id) = self.receiver.try_recv() {
            if !self.cancelled.remove(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

impl Default for ThreadTimer {
    fn default() -> Self {
        Self::new()
    }
}
