//! Failure injection tests for background publishing.

use std::sync::Arc;
use std::time::Duration;

use market_pagebuilder::config::PublisherConfig;
use market_pagebuilder::document::{EntityKind, PageId, SectionId};
use market_pagebuilder::publish::{PublishError, PublishStatus};
use market_pagebuilder::BuilderError;

mod common;
use common::{builder_with, FailingChannel, RecordingChannel, RecordingNotifier};

#[tokio::test]
async fn test_failed_publish_keeps_local_edit() {
    let channel = FailingChannel::default();
    let notifier = Arc::new(RecordingNotifier::default());
    let builder = builder_with(channel.clone(), notifier.clone(), &PublisherConfig::default());
    let status = builder.publisher().status();

    let edit = builder.add_section_to_page("Intro", &PageId::homepage()).unwrap();
    assert_eq!(edit.version, 1);
    let handle = edit.publish.unwrap();
    let publish_id = handle.id();

    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, PublishError::Channel(_)));
    assert_eq!(channel.attempts(), 1);

    // Local-first: the section is there even though nothing was saved.
    assert_eq!(builder.section(&PageId::homepage(), &SectionId::from("0")).unwrap().title, "Intro");

    let current = status.borrow().clone();
    assert!(current.is_failed());
    assert_eq!(current.publish_id(), Some(publish_id));

    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("relay unreachable"));
    assert!(notifier.infos().is_empty());
}

#[tokio::test]
async fn test_slow_channel_times_out() {
    let channel = RecordingChannel::with_delay(Duration::from_secs(3));
    let notifier = Arc::new(RecordingNotifier::default());
    let config = PublisherConfig {
        timeout_secs: 1,
        ..PublisherConfig::default()
    };
    let builder = builder_with(channel.clone(), notifier.clone(), &config);

    let err = builder
        .add_section_to_page("Intro", &PageId::homepage())
        .unwrap()
        .published()
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Timeout(1)));
    assert_eq!(channel.count(), 0);
    assert!(builder.page(&PageId::homepage()).is_some());
    assert_eq!(notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_successful_publish_notifies() {
    let channel = RecordingChannel::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let builder = builder_with(channel.clone(), notifier.clone(), &PublisherConfig::default());
    let status = builder.publisher().status();

    let handle = builder
        .add_section_to_page("Intro", &PageId::homepage())
        .unwrap()
        .publish
        .unwrap();
    let id = handle.id();
    handle.wait().await.unwrap();

    assert_eq!(
        *status.borrow(),
        PublishStatus::Published {
            publish_id: id,
            key: "market_site_specific_config".to_string(),
        }
    );
    assert_eq!(notifier.infos(), vec!["Configuration saved.".to_string()]);
}

#[tokio::test]
async fn test_notifications_can_be_disabled() {
    let channel = FailingChannel::default();
    let notifier = Arc::new(RecordingNotifier::default());
    let config = PublisherConfig {
        notify: false,
        ..PublisherConfig::default()
    };
    let builder = builder_with(channel, notifier.clone(), &config);

    let result = builder
        .add_section_to_page("Intro", &PageId::homepage())
        .unwrap()
        .published()
        .await;

    assert!(result.is_err());
    assert!(builder.publisher().status().borrow().is_failed());
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_each_edit_publishes_independently() {
    let channel = FailingChannel::default();
    let builder = builder_with(
        channel.clone(),
        Arc::new(RecordingNotifier::default()),
        &PublisherConfig::default(),
    );
    let home = PageId::homepage();

    let first = builder.add_section_to_page("Intro", &home).unwrap();
    let second = builder
        .add_item_to_section(&home, &SectionId::from("0"), "p1", EntityKind::Products)
        .unwrap();

    assert_eq!(second.version, first.version + 1);
    assert!(first.published().await.is_err());
    assert!(second.published().await.is_err());
    assert_eq!(channel.attempts(), 2);
}

#[tokio::test]
async fn test_load_surfaces_channel_errors() {
    let builder = builder_with(
        FailingChannel::default(),
        Arc::new(RecordingNotifier::default()),
        &PublisherConfig::default(),
    );

    let err = builder.load().await.unwrap_err();
    assert!(matches!(err, BuilderError::Channel(_)));
    assert!(builder.snapshot().is_none());
    assert!(builder
        .section_text(&PageId::homepage(), &SectionId::from("0"))
        .await
        .is_err());
}
