//! Message use-case tests
//!
//! Run with: cargo test -p integration-tests --test message_tests

use huddle_core::{ChatId, DomainError, EventPayload, MessageId, UserId};
use huddle_service::dto::{
    AddAttachmentCommand, DeleteMessageCommand, EditMessageCommand, GetMessageQuery,
    GetThreadQuery, ListAuthorMessagesQuery, ListMessagesQuery, SearchMessagesQuery,
};
use huddle_service::ports::{MessageCommandRepository, RepositoryError};
use huddle_service::{RequestContext, ServiceError};
use integration_tests::{cancelled_cx, cx, reply, seeded_message, send, TestHarness};

fn domain(err: &ServiceError) -> &DomainError {
    err.domain().unwrap_or_else(|| panic!("expected a domain error, got {err:?}"))
}

// ============================================================================
// SendMessage
// ============================================================================

#[tokio::test]
async fn test_send_as_participant() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);

    let message = harness
        .message_service()
        .send_message(&cx(), send(c1, u1, "Hello, world!"))
        .await
        .unwrap();

    assert_eq!(message.chat_id(), c1);
    assert_eq!(message.author_id(), u1);
    assert_eq!(message.content(), "Hello, world!");
    assert_eq!(message.parent_message_id(), None);
    assert!(!message.is_deleted());
    assert!(message.created_at() <= chrono::Utc::now());

    let stored = harness.messages.get(message.id()).unwrap();
    assert_eq!(stored, message);

    let events = harness.publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), "message.created");
    assert_eq!(events[0].version, 1);
    assert_eq!(events[0].aggregate_id, message.id().into_inner());
}

#[tokio::test]
async fn test_send_as_non_participant() {
    let harness = TestHarness::new();
    let (u1, u2) = (UserId::new(), UserId::new());
    let c1 = harness.chats.add_chat([u2]);

    let err = harness
        .message_service()
        .send_message(&cx(), send(c1, u1, "Hi"))
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::NotChatParticipant));
    assert_eq!(err.status_code(), 403);
    assert!(harness.messages.is_empty());
    assert!(harness.publisher.events().is_empty());
}

#[tokio::test]
async fn test_send_to_unknown_chat() {
    let harness = TestHarness::new();
    let missing = ChatId::new();

    let err = harness
        .message_service()
        .send_message(&cx(), send(missing, UserId::new(), "Hi"))
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::ChatNotFound(id) if *id == missing));
}

#[tokio::test]
async fn test_reply_in_different_chat() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "root").await;
    let c2 = harness.chats.add_chat([u1]);

    let err = harness
        .message_service()
        .send_message(&cx(), reply(c2, u1, m1.id(), "wrong place"))
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::ParentInDifferentChat));
    assert_eq!(harness.messages.len(), 1);
}

#[tokio::test]
async fn test_reply_to_missing_parent() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    let ghost = MessageId::new();

    let err = harness
        .message_service()
        .send_message(&cx(), reply(c1, u1, ghost, "anyone?"))
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::ParentNotFound(id) if *id == ghost));
}

#[tokio::test]
async fn test_nil_parent_is_top_level() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);

    let message = harness
        .message_service()
        .send_message(&cx(), reply(c1, u1, MessageId::nil(), "top level"))
        .await
        .unwrap();

    assert!(!message.is_reply());
}

#[tokio::test]
async fn test_send_validation_errors() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    let service = harness.message_service();

    let err = service
        .send_message(&cx(), send(ChatId::nil(), u1, "Hi"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().starts_with("validation failed: chat_id"));

    let err = service
        .send_message(&cx(), send(c1, u1, "   "))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::EmptyContent));

    let err = service
        .send_message(&cx(), send(c1, u1, &"x".repeat(10_001)))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::ContentTooLong { max: 10_000 }));

    assert!(harness.messages.is_empty());
}

#[tokio::test]
async fn test_send_with_cancelled_context() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);

    let err = harness
        .message_service()
        .send_message(&cancelled_cx(), send(c1, u1, "Hi"))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "REQUEST_CANCELLED");
    assert!(harness.messages.is_empty());
}

#[tokio::test]
async fn test_send_past_deadline() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    let expired = RequestContext::background().with_timeout(std::time::Duration::ZERO);

    let err = harness
        .message_service()
        .send_message(&expired, send(c1, u1, "Hi"))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "DEADLINE_EXCEEDED");
}

#[tokio::test]
async fn test_publish_failure_does_not_fail_send() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    harness.publisher.faults.arm();

    let message = harness
        .message_service()
        .send_message(&cx(), send(c1, u1, "still stored"))
        .await
        .unwrap();

    assert!(harness.messages.get(message.id()).is_some());
    assert!(harness.publisher.events().is_empty());
}

#[tokio::test]
async fn test_save_failure_surfaces_with_operation() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    harness.messages.save_faults.arm();

    let err = harness
        .message_service()
        .send_message(&cx(), send(c1, u1, "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "REPOSITORY_ERROR");
    assert!(err.to_string().contains("save_message"));
    assert!(harness.messages.is_empty());
    assert!(harness.publisher.events().is_empty());
}

// ============================================================================
// Edit / Delete
// ============================================================================

#[tokio::test]
async fn test_edit_by_non_author() {
    let harness = TestHarness::new();
    let (u1, u2) = (UserId::new(), UserId::new());
    let (_c1, m1) = seeded_message(&harness, &[u1, u2], "A").await;

    let err = harness
        .message_service()
        .edit_message(
            &cx(),
            EditMessageCommand {
                message_id: m1.id(),
                editor_id: u2,
                content: "B".to_owned(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::NotAuthor));
    assert_eq!(harness.messages.get(m1.id()).unwrap().content(), "A");
}

#[tokio::test]
async fn test_edit_by_author() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "A").await;

    let edited = harness
        .message_service()
        .edit_message(
            &cx(),
            EditMessageCommand {
                message_id: m1.id(),
                editor_id: u1,
                content: "B".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(edited.content(), "B");
    assert!(edited.is_edited());
    assert_eq!(harness.messages.get(m1.id()).unwrap().content(), "B");

    let events = harness.publisher.events();
    assert_eq!(events.last().unwrap().event_type(), "message.edited");
    assert_eq!(events.last().unwrap().version, 2);
}

#[tokio::test]
async fn test_edit_missing_message() {
    let harness = TestHarness::new();
    let ghost = MessageId::new();

    let err = harness
        .message_service()
        .edit_message(
            &cx(),
            EditMessageCommand {
                message_id: ghost,
                editor_id: UserId::new(),
                content: "B".to_owned(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::MessageNotFound(id) if *id == ghost));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_is_one_shot() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "bye").await;
    let service = harness.message_service();
    let cmd = DeleteMessageCommand {
        message_id: m1.id(),
        deleter_id: u1,
    };

    service.delete_message(&cx(), cmd.clone()).await.unwrap();
    let stored = harness.messages.get(m1.id()).unwrap();
    assert!(stored.is_deleted());
    assert!(stored.deleted_at().is_some());

    let err = service.delete_message(&cx(), cmd).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::MessageDeleted));
    assert_eq!(
        harness.publisher.event_types(),
        vec!["message.created", "message.deleted"]
    );
}

#[tokio::test]
async fn test_edit_after_delete() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "bye").await;
    let service = harness.message_service();

    service
        .delete_message(
            &cx(),
            DeleteMessageCommand {
                message_id: m1.id(),
                deleter_id: u1,
            },
        )
        .await
        .unwrap();

    let err = service
        .edit_message(
            &cx(),
            EditMessageCommand {
                message_id: m1.id(),
                editor_id: u1,
                content: "again".to_owned(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::MessageDeleted));
}

#[tokio::test]
async fn test_stale_write_is_rejected() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "v1").await;
    let mut stale = harness.messages.get(m1.id()).unwrap();

    harness
        .message_service()
        .edit_message(
            &cx(),
            EditMessageCommand {
                message_id: m1.id(),
                editor_id: u1,
                content: "v2".to_owned(),
            },
        )
        .await
        .unwrap();

    stale.edit_content("concurrent", u1).unwrap();
    let err = harness.messages.save(&cx(), &mut stale).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict { stored: 2, expected: 1 }));

    let err = ServiceError::repository("save_message", err);
    assert!(matches!(domain(&err), DomainError::ConcurrencyConflict));
    assert_eq!(harness.messages.get(m1.id()).unwrap().content(), "v2");
}

#[tokio::test]
async fn test_saved_message_can_be_saved_again() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "v1").await;
    let mut copy = harness.messages.get(m1.id()).unwrap();

    copy.edit_content("v2", u1).unwrap();
    harness.messages.save(&cx(), &mut copy).await.unwrap();
    assert_eq!(copy.persisted_version(), 2);

    copy.edit_content("v3", u1).unwrap();
    harness.messages.save(&cx(), &mut copy).await.unwrap();
    assert_eq!(harness.messages.get(m1.id()), Some(copy));
}

#[tokio::test]
async fn test_cancel_after_save_still_publishes() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    harness.messages.cancel_on_save.arm();

    let cx = cx();
    let message = harness
        .message_service()
        .send_message(&cx, send(c1, u1, "written before the cancel"))
        .await
        .unwrap();

    assert!(cx.check().is_err());
    assert_eq!(harness.messages.get(message.id()), Some(message.clone()));
    let events = harness.publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), "message.created");
    assert_eq!(events[0].aggregate_id, message.id().into_inner());
}

// ============================================================================
// Attachments
// ============================================================================

#[tokio::test]
async fn test_add_attachment() {
    let harness = TestHarness::new();
    let (u1, u2) = (UserId::new(), UserId::new());
    let (_c1, m1) = seeded_message(&harness, &[u1, u2], "see file").await;
    let service = harness.message_service();
    let cmd = AddAttachmentCommand {
        message_id: m1.id(),
        user_id: u1,
        file_id: huddle_core::FileId::new(),
        file_name: "report.pdf".to_owned(),
        file_size: 2048,
        mime_type: "application/pdf".to_owned(),
    };

    let attachment = service.add_attachment(&cx(), cmd.clone()).await.unwrap();
    assert_eq!(attachment.file_name(), "report.pdf");
    assert_eq!(harness.messages.get(m1.id()).unwrap().attachments().len(), 1);

    let event = harness.publisher.events().pop().unwrap();
    match event.payload {
        EventPayload::AttachmentAdded { file_id, file_size, .. } => {
            assert_eq!(file_id, cmd.file_id);
            assert_eq!(file_size, 2048);
        }
        other => panic!("unexpected payload {other:?}"),
    }

    let err = service
        .add_attachment(
            &cx(),
            AddAttachmentCommand {
                user_id: u2,
                ..cmd.clone()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::NotAuthor));

    let err = service
        .add_attachment(
            &cx(),
            AddAttachmentCommand {
                file_size: 0,
                ..cmd
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::InvalidFileSize { .. }));
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_get_message() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let (_c1, m1) = seeded_message(&harness, &[u1], "find me").await;

    let found = harness
        .message_service()
        .get_message(&cx(), GetMessageQuery { message_id: m1.id() })
        .await
        .unwrap();
    assert_eq!(found, m1);
}

#[tokio::test]
async fn test_list_messages_clamps_and_orders() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    let service = harness.message_service();

    let mut last = None;
    for i in 0..105 {
        let message = service
            .send_message(&cx(), send(c1, u1, &format!("message {i}")))
            .await
            .unwrap();
        last = Some(message.id());
    }

    let page = service
        .list_messages(
            &cx(),
            ListMessagesQuery {
                chat_id: c1,
                limit: Some(500),
                offset: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.messages.len(), 100);
    assert_eq!(page.limit, 100);
    assert_eq!(page.total, 105);
    assert!(page.has_more());
    assert_eq!(Some(page.messages[0].id()), last);

    let page = service
        .list_messages(
            &cx(),
            ListMessagesQuery {
                chat_id: c1,
                limit: Some(0),
                offset: Some(-7),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.messages.len(), 50);
    assert_eq!(page.offset, 0);

    let page = service
        .list_messages(
            &cx(),
            ListMessagesQuery {
                chat_id: c1,
                limit: None,
                offset: Some(100),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.messages.len(), 5);
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_get_thread_returns_direct_replies() {
    let harness = TestHarness::new();
    let (u1, u2) = (UserId::new(), UserId::new());
    let (c1, root) = seeded_message(&harness, &[u1, u2], "root").await;
    let service = harness.message_service();

    let first = service
        .send_message(&cx(), reply(c1, u2, root.id(), "first"))
        .await
        .unwrap();
    let second = service
        .send_message(&cx(), reply(c1, u1, root.id(), "second"))
        .await
        .unwrap();
    // A reply to a reply is not part of the root's thread
    service
        .send_message(&cx(), reply(c1, u1, first.id(), "nested"))
        .await
        .unwrap();

    let thread = service
        .get_thread(
            &cx(),
            GetThreadQuery {
                parent_message_id: root.id(),
            },
        )
        .await
        .unwrap();

    assert_eq!(thread.parent.id(), root.id());
    assert_eq!(thread.reply_count, 2);
    let ids: Vec<_> = thread.replies.iter().map(huddle_core::Message::id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);
}

#[tokio::test]
async fn test_get_thread_of_missing_parent() {
    let harness = TestHarness::new();

    let err = harness
        .message_service()
        .get_thread(
            &cx(),
            GetThreadQuery {
                parent_message_id: MessageId::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(domain(&err).is_not_found());
}

#[tokio::test]
async fn test_search_messages() {
    let harness = TestHarness::new();
    let u1 = UserId::new();
    let c1 = harness.chats.add_chat([u1]);
    let service = harness.message_service();
    for content in ["hello world", "HELLO again", "goodbye"] {
        service
            .send_message(&cx(), send(c1, u1, content))
            .await
            .unwrap();
    }

    let found = service
        .search_messages(
            &cx(),
            SearchMessagesQuery {
                chat_id: c1,
                query: "hello".to_owned(),
                limit: None,
                offset: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].content(), "HELLO again");

    let err = service
        .search_messages(
            &cx(),
            SearchMessagesQuery {
                chat_id: c1,
                query: String::new(),
                limit: None,
                offset: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_list_author_messages_across_chats() {
    let harness = TestHarness::new();
    let (u1, u2) = (UserId::new(), UserId::new());
    let c1 = harness.chats.add_chat([u1, u2]);
    let c2 = harness.chats.add_chat([u1]);
    let service = harness.message_service();

    service.send_message(&cx(), send(c1, u1, "one")).await.unwrap();
    service.send_message(&cx(), send(c1, u2, "other")).await.unwrap();
    service.send_message(&cx(), send(c2, u1, "two")).await.unwrap();

    let mine = service
        .list_author_messages(
            &cx(),
            ListAuthorMessagesQuery {
                author_id: u1,
                limit: None,
                offset: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|m| m.author_id() == u1));
}
