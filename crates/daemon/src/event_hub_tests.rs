// SPDX-License-Identifier: MIT

use super::*;
use orc_core::TaskId;

fn event(task_id: TaskId) -> Event {
    Event::TaskCreated { task_id }
}

#[tokio::test]
async fn broadcast_delivers_to_every_subscriber() {
    let hub = EventHub::new();
    let (_, mut rx_a) = hub.subscribe();
    let (_, mut rx_b) = hub.subscribe();

    hub.broadcast(event(1));

    assert!(matches!(rx_a.recv().await, Some(Event::TaskCreated { task_id: 1 })));
    assert!(matches!(rx_b.recv().await, Some(Event::TaskCreated { task_id: 1 })));
}

#[tokio::test]
async fn dropped_receiver_is_evicted_without_blocking_others() {
    let hub = EventHub::new();
    let (_, rx_a) = hub.subscribe();
    let (_, mut rx_b) = hub.subscribe();
    drop(rx_a);

    hub.broadcast(event(7));
    assert!(matches!(rx_b.recv().await, Some(Event::TaskCreated { task_id: 7 })));
    assert_eq!(hub.subscriber_count(), 1);
}

#[test]
fn unsubscribe_removes_the_subscriber() {
    let hub = EventHub::new();
    let (id, _rx) = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 1);
    hub.unsubscribe(id);
    assert_eq!(hub.subscriber_count(), 0);
}
