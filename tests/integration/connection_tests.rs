//! Broker link lifecycle as seen by the service.

use crate::mock_link::{LOCK_TOPIC, LinkCall, RESULT_TOPIC, offline_app, online_app};

use lockconsole::app::commands::AppCommand;
use lockconsole::app::events::{AppEvent, LinkState};
use lockconsole::app::ports::CommsError;
use lockconsole::channels::LinkEvent;

#[test]
fn connect_goes_through_connecting() {
    let (mut app, mut link, mut sink) = offline_app();

    app.handle_command(AppCommand::Connect, &mut link, &mut sink);
    assert_eq!(link.calls, vec![LinkCall::Connect]);
    assert_eq!(app.link_state(), LinkState::Connecting);

    app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);
    assert_eq!(app.link_state(), LinkState::Online);
    assert_eq!(
        sink.take(),
        vec![
            AppEvent::LinkChanged(LinkState::Connecting),
            AppEvent::LinkChanged(LinkState::Online),
        ]
    );
}

#[test]
fn every_connect_resubscribes() {
    let (mut app, mut link, mut sink) = offline_app();

    app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);
    app.handle_link_event(LinkEvent::ConnectionLost("eof".into()), &mut link, &mut sink);
    app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);

    assert_eq!(
        link.subscriptions(),
        vec![LOCK_TOPIC, RESULT_TOPIC, LOCK_TOPIC, RESULT_TOPIC]
    );
    assert_eq!(app.link_state(), LinkState::Online);
}

#[test]
fn connection_lost_goes_offline() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(LinkEvent::ConnectionLost("reset".into()), &mut link, &mut sink);
    assert_eq!(app.link_state(), LinkState::Offline);
    assert_eq!(sink.last(), Some(&AppEvent::LinkChanged(LinkState::Offline)));
}

#[test]
fn connect_failure_returns_to_offline() {
    let (mut app, mut link, mut sink) = offline_app();
    link.fail_connect = true;

    app.handle_command(AppCommand::Connect, &mut link, &mut sink);

    assert_eq!(app.link_state(), LinkState::Offline);
    assert!(sink.events.contains(&AppEvent::CommsFailed(CommsError::ConnectFailed)));
}

#[test]
fn subscribe_failure_is_reported() {
    let (mut app, mut link, mut sink) = offline_app();
    link.fail_subscribe = true;

    app.handle_link_event(LinkEvent::Connected, &mut link, &mut sink);

    let failures = sink
        .events
        .iter()
        .filter(|e| **e == AppEvent::CommsFailed(CommsError::SubscribeFailed))
        .count();
    assert_eq!(failures, 2);
}

#[test]
fn connect_while_online_is_a_no_op() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(AppCommand::Connect, &mut link, &mut sink);
    assert!(link.calls.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn disconnect_drops_link() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_command(AppCommand::Disconnect, &mut link, &mut sink);
    assert_eq!(link.calls, vec![LinkCall::Disconnect]);
    assert_eq!(app.link_state(), LinkState::Offline);
}

#[test]
fn disconnect_after_link_loss_stops_the_transport() {
    let (mut app, mut link, mut sink) = online_app();
    app.handle_link_event(LinkEvent::ConnectionLost("reset".into()), &mut link, &mut sink);
    sink.events.clear();

    app.handle_command(AppCommand::Disconnect, &mut link, &mut sink);

    assert_eq!(link.calls, vec![LinkCall::Disconnect]);
    assert_eq!(app.link_state(), LinkState::Offline);
    // Already offline: no duplicate state change is shown.
    assert!(sink.events.is_empty());
}
