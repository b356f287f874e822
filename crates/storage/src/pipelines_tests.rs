// SPDX-License-Identifier: MIT

use super::*;
use crate::Store;
use chrono::Utc;

#[test]
fn add_then_get_round_trips() {
    let store = Store::open_in_memory().unwrap();
    let pipeline = Pipeline::new("release-train", 3, Utc::now());
    let id = store.add_pipeline(&pipeline).unwrap();
    let fetched = store.get_pipeline(id).unwrap();
    assert_eq!(fetched.name, "release-train");
    assert_eq!(fetched.total_steps, 3);
}

#[test]
fn update_pipeline_advances_step() {
    let store = Store::open_in_memory().unwrap();
    let id = store.add_pipeline(&Pipeline::new("chain", 2, Utc::now())).unwrap();
    let mut pipeline = store.get_pipeline(id).unwrap();
    pipeline.current_step = 1;
    pipeline.task_ids.push(42);
    store.update_pipeline(&pipeline).unwrap();

    let fetched = store.get_pipeline(id).unwrap();
    assert_eq!(fetched.current_step, 1);
    assert_eq!(fetched.task_ids, vec![42]);
}
