//! Integration tests for the full resolve → compose → dispatch pipeline.

use sensu_mailer::{
    core::{Action, Event, Outcome},
    error::{HandlerError, ResolveError},
    formatting::{ALL_CLEAR, MISSING_DESCRIPTION},
    Mailer,
};
use std::sync::{atomic::Ordering, Arc};

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::{
    disk_event, disk_event_json, test_settings,
    mock_sink::{FailingSink, HangingSink, RecordingSink},
};

#[tokio::test]
async fn test_alert_mail_uses_defaults() {
    let sink = RecordingSink::new();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));
    let event = Event::from_reader(disk_event_json("create").as_bytes()).unwrap();

    let delivery = mailer.handle(&event).await.unwrap();

    assert_eq!(delivery.outcome, Outcome::Sent);
    assert_eq!(
        delivery.to_string(),
        "mail -- sent alert for web1/disk to ops@example.com"
    );

    let message = sink.last_message().unwrap();
    assert_eq!(message.to, "ops@example.com");
    assert_eq!(message.from, "sensu@example.com");
    assert_eq!(message.subject, "ALERT - web1/disk: disk full");
    assert!(message.body.contains(MISSING_DESCRIPTION));
    assert!(!message.body.contains(ALL_CLEAR));
}

#[tokio::test]
async fn test_resolve_mail_is_all_clear() {
    let sink = RecordingSink::new();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));
    let mut event = disk_event(Action::Resolve);
    event.check.description = Some("Rotate the logs on /var.".to_string());

    mailer.handle(&event).await.unwrap();

    let message = sink.last_message().unwrap();
    assert_eq!(message.subject, "RESOLVED - web1/disk: disk full");
    assert!(message.body.contains(ALL_CLEAR));
    assert!(!message.body.contains("Rotate the logs on /var."));
    assert!(!message.body.contains(MISSING_DESCRIPTION));
}

#[tokio::test]
async fn test_check_overrides_win() {
    let sink = RecordingSink::new();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));
    let mut event = disk_event(Action::Create);
    event.check.mail_to = Some("storage@example.com".to_string());
    event.check.mail_from = Some("disk-check@example.com".to_string());
    event.check.mail_subject = Some("Disk trouble on web1".to_string());
    event.check.description = Some("Rotate the logs on /var.".to_string());

    let delivery = mailer.handle(&event).await.unwrap();

    assert_eq!(delivery.to, "storage@example.com");
    let message = sink.last_message().unwrap();
    assert_eq!(message.from, "disk-check@example.com");
    assert_eq!(message.subject, "Disk trouble on web1");
    assert!(message.body.contains("Check Description:\nRotate the logs on /var."));
}

#[tokio::test]
async fn test_channel_comes_from_settings() {
    let sink = RecordingSink::new();
    let mut settings = test_settings();
    settings.smtp_address = "mx.example.com".to_string();
    settings.smtp_port = 587;
    let mailer = Mailer::new(Arc::new(settings), Arc::new(sink.clone()));

    mailer.handle(&disk_event(Action::Create)).await.unwrap();

    let (_, channel) = sink.sent.lock().unwrap()[0].clone();
    assert_eq!(channel.address, "mx.example.com");
    assert_eq!(channel.port, 587);
    assert_eq!(channel.domain, "localhost.localdomain");
}

#[tokio::test]
async fn test_missing_recipient_sends_nothing() {
    let sink = RecordingSink::new();
    let mut settings = test_settings();
    settings.mail_to = None;
    let mailer = Mailer::new(Arc::new(settings), Arc::new(sink.clone()));

    let err = mailer.handle(&disk_event(Action::Create)).await.unwrap_err();

    assert!(matches!(err, HandlerError::Resolve(ResolveError::MissingRecipient)));
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn test_missing_sender_sends_nothing() {
    let sink = RecordingSink::new();
    let mut settings = test_settings();
    settings.mail_from = Some(String::new());
    let mailer = Mailer::new(Arc::new(settings), Arc::new(sink.clone()));

    let err = mailer.handle(&disk_event(Action::Create)).await.unwrap_err();

    assert!(matches!(err, HandlerError::Resolve(ResolveError::MissingSender)));
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn test_delivery_fault_is_not_swallowed() {
    let sink = FailingSink::default();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));

    let err = mailer.handle(&disk_event(Action::Create)).await.unwrap_err();

    assert!(matches!(err, HandlerError::Dispatch(_)));
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    let chain: Vec<String> = anyhow::Error::from(err).chain().map(|e| e.to_string()).collect();
    assert!(chain.iter().any(|c| c.contains("Connection refused")), "{chain:?}");
}

#[tokio::test]
async fn test_timeout_is_a_normal_outcome() {
    tokio::time::pause();
    let sink = HangingSink::default();
    let mut settings = test_settings();
    settings.timeout_seconds = 10;
    let mailer = Mailer::new(Arc::new(settings), Arc::new(sink.clone()));

    let delivery = mailer.handle(&disk_event(Action::Create)).await.unwrap();

    assert_eq!(delivery.outcome, Outcome::TimedOut);
    assert_eq!(
        delivery.to_string(),
        "mail -- timed out while attempting to create an incident -- web1/disk"
    );
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_handle_is_repeatable() {
    let sink = RecordingSink::new();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));
    let event = disk_event(Action::Flapping);

    let first = mailer.handle(&event).await.unwrap();
    let second = mailer.handle(&event).await.unwrap();

    assert_eq!(first, second);
    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn test_recipient_list_without_addresses_sends_nothing() {
    let sink = RecordingSink::new();
    let mailer = Mailer::new(Arc::new(test_settings()), Arc::new(sink.clone()));
    let mut event = disk_event(Action::Create);
    event.check.mail_to = Some(",".to_string());

    let err = mailer.handle(&event).await.unwrap_err();

    assert!(matches!(err, HandlerError::Resolve(ResolveError::MissingRecipient)));
    assert_eq!(sink.calls(), 0);
}
