// SPDX-License-Identifier: MIT

use super::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn get_task_round_trips_through_json_for_any_id(task_id in any::<TaskId>()) {
        let req = Request::GetTask { task_id };
        let line = encode_line(&req).unwrap();
        let decoded: Request = decode_line(&line).unwrap();
        match decoded {
            Request::GetTask { task_id: decoded_id } => prop_assert_eq!(task_id, decoded_id),
            _ => prop_assert!(false, "wrong variant"),
        }
    }
}

#[test]
fn request_round_trips_through_json() {
    let req = Request::AddTask {
        title: "fix flaky test".into(),
        description: String::new(),
        priority: TaskPriority::High,
        branch: "fix/flaky".into(),
        depends_on: vec![1, 2],
    };
    let line = encode_line(&req).unwrap();
    assert!(line.ends_with('\n'));
    let decoded: Request = decode_line(&line).unwrap();
    match decoded {
        Request::AddTask { title, depends_on, .. } => {
            assert_eq!(title, "fix flaky test");
            assert_eq!(depends_on, vec![1, 2]);
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn pr_lifecycle_action_requests_round_trip_through_json() {
    for req in [Request::CreatePr { id: 7 }, Request::AdvancePr { id: 7 }, Request::MarkPrReady { id: 7 }] {
        let line = encode_line(&req).unwrap();
        let decoded: Request = decode_line(&line).unwrap();
        match (req, decoded) {
            (Request::CreatePr { id: a }, Request::CreatePr { id: b }) => assert_eq!(a, b),
            (Request::AdvancePr { id: a }, Request::AdvancePr { id: b }) => assert_eq!(a, b),
            (Request::MarkPrReady { id: a }, Request::MarkPrReady { id: b }) => assert_eq!(a, b),
            _ => panic!("wrong variant"),
        }
    }
}

#[test]
fn response_error_carries_message() {
    let resp = Response::Error { message: "not found".into() };
    let line = encode_line(&resp).unwrap();
    let decoded: Response = decode_line(&line).unwrap();
    match decoded {
        Response::Error { message } => assert_eq!(message, "not found"),
        _ => panic!("wrong variant"),
    }
}

#[test]
fn decode_rejects_malformed_line() {
    let err = decode_line::<Request>("not json");
    assert!(err.is_err());
}
