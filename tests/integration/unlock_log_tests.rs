//! Unlock log messages are annotated with registered names.

use crate::mock_link::{LOCK_TOPIC, online_app, report};

use lockconsole::app::commands::AppCommand;
use lockconsole::app::events::AppEvent;
use lockconsole::channels::LinkEvent;
use lockconsole::enrollment::CredentialKind;

fn unlock_text(sink: &crate::mock_link::RecordingSink) -> &str {
    match sink.last() {
        Some(AppEvent::Unlock { text }) => text.as_str(),
        other => panic!("expected an unlock event, got {other:?}"),
    }
}

fn lock_log(text: &str) -> LinkEvent {
    LinkEvent::Message {
        topic: LOCK_TOPIC.into(),
        payload: text.into(),
    }
}

#[test]
fn known_finger_is_named() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(
        AppCommand::Enroll {
            kind: CredentialKind::Finger,
            name: "Bob".into(),
        },
        &mut link,
        &mut sink,
    );
    report(
        &mut app,
        &mut link,
        &mut sink,
        r#"{"status":"success","type":"finger","id":7}"#,
    );

    app.handle_link_event(lock_log("Unlock FINGER 7 door"), &mut link, &mut sink);
    assert_eq!(unlock_text(&sink), "Unlock Bob (7) door");
}

#[test]
fn unknown_card_gets_unknown_label() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(lock_log("Denied RFID DEADBEEF"), &mut link, &mut sink);
    assert_eq!(unlock_text(&sink), "Denied Unknown (DEADBEEF)");
}

#[test]
fn finger_and_card_in_one_message() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(
        AppCommand::Enroll {
            kind: CredentialKind::Rfid,
            name: "Alice".into(),
        },
        &mut link,
        &mut sink,
    );
    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"A1B2"}"#);

    app.handle_link_event(
        lock_log("FINGER 9 rejected, RFID A1B2 accepted"),
        &mut link,
        &mut sink,
    );
    assert_eq!(
        unlock_text(&sink),
        "Unknown (9) rejected, Alice (A1B2) accepted"
    );
}

#[test]
fn plain_text_passes_through() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(lock_log("Door opened by keypad"), &mut link, &mut sink);
    assert_eq!(unlock_text(&sink), "Door opened by keypad");
}

#[test]
fn unlock_log_never_touches_registry() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(lock_log("Unlock FINGER 1"), &mut link, &mut sink);
    assert!(app.registry().is_empty());
}

#[test]
fn unrelated_topic_is_ignored() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(
        LinkEvent::Message {
            topic: "esp32/telemetry".into(),
            payload: "FINGER 1".into(),
        },
        &mut link,
        &mut sink,
    );
    assert!(sink.events.is_empty());
}
