//! Enrollment flow: operator command → device reports → registry.

use crate::mock_link::{online_app, offline_app, report};

use lockconsole::app::commands::AppCommand;
use lockconsole::app::events::AppEvent;
use lockconsole::enrollment::{CaptureStep, CredentialKind, Phase, Rejection};
use lockconsole::registry::CredentialKey;

fn enroll(kind: CredentialKind, name: &str) -> AppCommand {
    AppCommand::Enroll {
        kind,
        name: name.into(),
    }
}

// ── Happy paths ───────────────────────────────────────────────

#[test]
fn rfid_enrollment_registers_card() {
    let (mut app, mut link, mut sink) = online_app();

    app.handle_command(enroll(CredentialKind::Rfid, "Alice"), &mut link, &mut sink);
    assert_eq!(link.published(), vec![("esp32/rfid_add", "CMD_ADD")]);
    assert_eq!(app.session().phase(), Phase::WaitingCapture);

    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"A1B2"}"#);

    assert_eq!(app.name_of(&CredentialKey::rfid("A1B2")), "Alice");
    assert!(app.session().pending().is_none());
    assert_eq!(
        sink.last(),
        Some(&AppEvent::Enrolled {
            name: "Alice".into(),
            key: CredentialKey::rfid("A1B2"),
        })
    );
}

#[test]
fn fingerprint_enrollment_walks_capture_steps() {
    let (mut app, mut link, mut sink) = online_app();

    app.handle_command(enroll(CredentialKind::Finger, "Bob"), &mut link, &mut sink);
    assert_eq!(link.published(), vec![("esp32/finger_add", "CMD_ADD_FINGER")]);

    for (status, step) in [
        ("step1", CaptureStep::Place),
        ("step2", CaptureStep::Lift),
        ("step3", CaptureStep::PlaceAgain),
    ] {
        report(&mut app, &mut link, &mut sink, &format!(r#"{{"status":"{status}"}}"#));
        assert_eq!(sink.last(), Some(&AppEvent::CapturePrompt(step)));
        assert_eq!(app.session().phase(), Phase::Capturing(step));
        // Steps never consume the pending name.
        assert_eq!(app.session().pending().map(|p| p.name.as_str()), Some("Bob"));
    }

    report(
        &mut app,
        &mut link,
        &mut sink,
        r#"{"status":"success","type":"finger","id":7}"#,
    );
    assert_eq!(app.registry().lookup(&CredentialKey::finger("7")), Some("Bob"));
    assert_eq!(app.session().phase(), Phase::Idle);
}

#[test]
fn enrolled_name_is_trimmed() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "  Carol  "), &mut link, &mut sink);
    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"C0FFEE"}"#);
    assert_eq!(app.name_of(&CredentialKey::rfid("C0FFEE")), "Carol");
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn rejections_never_mutate_registry_and_clear_pending() {
    for (json, rejection) in [
        (r#"{"status":"exist"}"#, Rejection::Exists),
        (r#"{"status":"full"}"#, Rejection::Full),
        (
            r#"{"status":"fail","msg":"timeout"}"#,
            Rejection::Failed("timeout".into()),
        ),
    ] {
        let (mut app, mut link, mut sink) = online_app();
        app.handle_command(enroll(CredentialKind::Finger, "Dave"), &mut link, &mut sink);

        report(&mut app, &mut link, &mut sink, json);

        assert!(app.registry().is_empty(), "{json} must not register anything");
        assert!(app.session().pending().is_none(), "{json} must clear pending");
        assert_eq!(sink.last(), Some(&AppEvent::EnrollmentRejected(rejection)));
    }
}

#[test]
fn success_after_rejection_is_unclaimed() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Erin"), &mut link, &mut sink);
    report(&mut app, &mut link, &mut sink, r#"{"status":"exist"}"#);

    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"BEEF"}"#);

    assert!(app.registry().is_empty());
    assert_eq!(
        sink.last(),
        Some(&AppEvent::UnclaimedCredential {
            key: CredentialKey::rfid("BEEF")
        })
    );
}

#[test]
fn success_without_pending_changes_nothing() {
    let (mut app, mut link, mut sink) = online_app();
    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"A1B2"}"#);
    assert!(app.registry().is_empty());
    assert!(matches!(sink.last(), Some(AppEvent::UnclaimedCredential { .. })));
}

// ── Session handling ──────────────────────────────────────────

#[test]
fn second_enrollment_displaces_first() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Frank"), &mut link, &mut sink);
    app.handle_command(enroll(CredentialKind::Rfid, "Grace"), &mut link, &mut sink);

    assert!(sink.events.contains(&AppEvent::EnrollmentDisplaced {
        name: "Frank".into()
    }));

    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"11"}"#);
    assert_eq!(app.name_of(&CredentialKey::rfid("11")), "Grace");
    assert_eq!(app.registry().len(), 1);
}

#[test]
fn enrollment_refused_while_offline() {
    let (mut app, mut link, mut sink) = offline_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Heidi"), &mut link, &mut sink);

    assert!(link.published().is_empty());
    assert!(app.session().pending().is_none());
    assert_eq!(sink.last(), Some(&AppEvent::NotConnected));
}

#[test]
fn blank_name_is_refused() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Finger, "   "), &mut link, &mut sink);
    assert!(link.published().is_empty());
    assert_eq!(sink.last(), Some(&AppEvent::NameRequired));
}

#[test]
fn failed_publish_keeps_pending_name() {
    let (mut app, mut link, mut sink) = online_app();
    link.fail_publish = true;
    app.handle_command(enroll(CredentialKind::Rfid, "Ivan"), &mut link, &mut sink);

    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::CommsFailed(_))));
    assert_eq!(app.session().pending().map(|p| p.name.as_str()), Some("Ivan"));
}

// ── Malformed and unknown reports ─────────────────────────────

#[test]
fn malformed_report_is_surfaced_without_state_change() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Judy"), &mut link, &mut sink);

    report(&mut app, &mut link, &mut sink, "not json at all");

    assert!(matches!(sink.last(), Some(AppEvent::MalformedReport { .. })));
    assert_eq!(app.session().pending().map(|p| p.name.as_str()), Some("Judy"));
    assert!(app.registry().is_empty());
}

#[test]
fn unknown_status_is_ignored() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Ken"), &mut link, &mut sink);
    sink.events.clear();

    report(&mut app, &mut link, &mut sink, r#"{"status":"rebooting"}"#);

    assert!(sink.events.is_empty());
    assert!(app.session().pending().is_some());
}

// ── List / clear ──────────────────────────────────────────────

#[test]
fn list_and_clear_users() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(enroll(CredentialKind::Rfid, "Alice"), &mut link, &mut sink);
    report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"A1B2"}"#);
    app.handle_command(enroll(CredentialKind::Finger, "Bob"), &mut link, &mut sink);
    report(
        &mut app,
        &mut link,
        &mut sink,
        r#"{"status":"success","type":"finger","id":"3"}"#,
    );

    app.handle_command(AppCommand::ListUsers, &mut link, &mut sink);
    assert_eq!(
        sink.last(),
        Some(&AppEvent::UserList(vec![
            (CredentialKey::rfid("A1B2"), "Alice".into()),
            (CredentialKey::finger("3"), "Bob".into()),
        ]))
    );

    app.handle_command(AppCommand::ClearUsers, &mut link, &mut sink);
    assert_eq!(sink.last(), Some(&AppEvent::RegistryCleared));
    app.handle_command(AppCommand::ListUsers, &mut link, &mut sink);
    assert_eq!(sink.last(), Some(&AppEvent::UserList(vec![])));
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn enrolled_names_survive_restart() {
    use lockconsole::adapters::kv_store::KvStoreAdapter;
    use lockconsole::app::service::AppService;
    use lockconsole::channels::LinkEvent;
    use lockconsole::config::ConsoleConfig;

    use crate::mock_link::{MockTransport, RecordingSink};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");
    let config = ConsoleConfig::default();
    let mut link = MockTransport::new();
    let mut sink = RecordingSink::new();

    {
        let mut app = AppService::new(&config, KvStoreAdapter::open(&path).unwrap());
        app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);
        app.handle_command(enroll(CredentialKind::Rfid, "Alice"), &mut link, &mut sink);
        report(&mut app, &mut link, &mut sink, r#"{"status":"success","uid":"A1B2"}"#);
    }

    let app = AppService::new(&config, KvStoreAdapter::open(&path).unwrap());
    assert_eq!(app.name_of(&CredentialKey::rfid("A1B2")), "Alice");
}
