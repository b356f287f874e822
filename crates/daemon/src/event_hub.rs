// SPDX-License-Identifier: MIT

//! Fan-out point for [`orc_core::Event`]s: every IPC subscriber gets its own
//! `tokio::sync::mpsc` channel; a subscriber whose send fails (buffer full,
//! receiver dropped) is evicted without blocking delivery to the others.

use orc_core::Event;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

const SUBSCRIBER_BUFFER: usize = 256;

#[derive(Default)]
pub struct EventHub {
    subscribers: Mutex<BTreeMap<u64, mpsc::Sender<Event>>>,
    next_id: Mutex<u64>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> (u64, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        *next_id += 1;
        self.subscribers.lock().insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Delivers `event` to every live subscriber, evicting any whose channel
    /// is closed or full. No ordering guarantee across subscribers.
    pub fn broadcast(&self, event: Event) {
        let mut dead = Vec::new();
        let subscribers = self.subscribers.lock();
        for (id, tx) in subscribers.iter() {
            if tx.try_send(event.clone()).is_err() {
                dead.push(*id);
            }
        }
        drop(subscribers);
        if !dead.is_empty() {
            let mut subscribers = self.subscribers.lock();
            for id in dead {
                subscribers.remove(&id);
            }
        }
    }
}

#[cfg(test)]
#[path = "event_hub_tests.rs"]
mod tests;
