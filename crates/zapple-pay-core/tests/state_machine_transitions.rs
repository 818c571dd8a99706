use zapple_pay_core::{session_transition, SessionAction, SessionState};

#[test]
fn session_happy_path_transitions() {
    let (s1, t1) =
        session_transition(SessionState::Idle, SessionAction::Created).expect("idle -> created");
    assert_eq!(s1, SessionState::Pending);
    assert_eq!(t1.from, SessionState::Idle);
    let (s2, _) =
        session_transition(s1, SessionAction::NotConnected).expect("pending -> not connected");
    assert_eq!(s2, SessionState::Pending);
    let (s3, t3) = session_transition(s2, SessionAction::Approved).expect("pending -> approved");
    assert_eq!(s3, SessionState::Connected);
    assert_eq!(t3.reason, "wallet approved");
    let (s4, _) = session_transition(s3, SessionAction::Teardown).expect("connected -> teardown");
    assert_eq!(s4, SessionState::Idle);
}

#[test]
fn connected_regresses_on_negative_observation() {
    let (state, transition) =
        session_transition(SessionState::Connected, SessionAction::NotConnected)
            .expect("connected -> not connected");
    assert_eq!(state, SessionState::Pending);
    assert_eq!(transition.reason, "approval regressed");
}

#[test]
fn connected_stays_connected_on_repeat_approval() {
    let (state, _) = session_transition(SessionState::Connected, SessionAction::Approved)
        .expect("connected -> approved");
    assert_eq!(state, SessionState::Connected);
}

#[test]
fn teardown_from_idle_is_a_noop() {
    let (state, _) =
        session_transition(SessionState::Idle, SessionAction::Teardown).expect("idle teardown");
    assert_eq!(state, SessionState::Idle);
}

#[test]
fn polls_without_a_request_are_rejected() {
    let err = session_transition(SessionState::Idle, SessionAction::Approved)
        .expect_err("must fail");
    assert!(err.to_string().contains("illegal session transition"));
    session_transition(SessionState::Idle, SessionAction::NotConnected).expect_err("must fail");
}

#[test]
fn creating_twice_is_rejected() {
    session_transition(SessionState::Pending, SessionAction::Created).expect_err("must fail");
    session_transition(SessionState::Connected, SessionAction::Created).expect_err("must fail");
}
