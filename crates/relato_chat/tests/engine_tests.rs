//! Integration tests for the conversation engine.
//!
//! The gateway and the report generator are both mocked, so these tests
//! exercise the full state machine without Telegram or a browser.

use std::sync::Arc;

use chrono::NaiveDate;

use relato_chat::{
    messages, ChatId, ConversationEngine, MockGateway, MockGenerator, Outbound,
};
use relato_core::BaseCatalog;

const CHAT: ChatId = ChatId(42);

fn catalog() -> BaseCatalog {
    BaseCatalog::standard()
}

fn engine_with(
    gateway: &MockGateway,
    generator: &MockGenerator,
) -> ConversationEngine {
    ConversationEngine::new(
        catalog(),
        Arc::new(gateway.clone()),
        Arc::new(generator.clone()),
    )
}

#[tokio::test]
async fn test_happy_path_end_to_end() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/downloads/relatorio.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();

    // The generator saw exactly one request with the parsed range.
    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let (base, range) = &calls[0];
    assert_eq!(base.name, "BASE BAURU");
    assert_eq!(range.wire_start(), "2024-03-01");
    assert_eq!(range.wire_end(), "2024-03-31");

    // Menu first, with BASE BAURU among the options.
    let journal = gateway.journal();
    match &journal[0] {
        Outbound::Menu { text, options, .. } => {
            assert_eq!(text, messages::MSG_SELECT_BASE);
            assert!(options.iter().any(|o| o == "BASE BAURU"));
            assert!(options.iter().any(|o| o == "TODAS"));
        }
        other => panic!("expected menu first, got {:?}", other),
    }

    // The menu was edited into a confirmation after the pick.
    assert!(journal.iter().any(|o| matches!(
        o,
        Outbound::Edit { text, .. } if text == &messages::base_selected("BASE BAURU")
    )));

    // Prompt sequence, then the document.
    assert_eq!(
        gateway.texts_for(CHAT),
        vec![
            messages::MSG_START_PROMPT,
            messages::MSG_END_PROMPT,
            messages::MSG_GENERATING,
        ]
    );
    let documents = gateway.documents_for(CHAT);
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].1, messages::REPORT_FILENAME);

    // Session reached done.
    assert_eq!(engine.active_sessions(), 0);
}

#[tokio::test]
async fn test_invalid_date_reprompts_without_losing_base() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();

    for bad in ["31/04/2024", "2024-03-01", "hoje", "29/02/2023"] {
        engine.handle_text(CHAT, bad).await.unwrap();
    }

    // Still awaiting the start date, base retained: a valid date now
    // continues the flow as usual.
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();

    assert_eq!(generator.calls()[0].0.name, "BASE BAURU");

    let texts = gateway.texts_for(CHAT);
    assert_eq!(
        texts.iter().filter(|t| *t == messages::MSG_START_INVALID).count(),
        4
    );
}

#[tokio::test]
async fn test_invalid_end_date_reprompts() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    engine.handle_text(CHAT, "31/13/2024").await.unwrap();

    assert!(gateway
        .texts_for(CHAT)
        .contains(&messages::MSG_END_INVALID.to_string()));
    assert!(generator.calls().is_empty());
    assert_eq!(engine.active_sessions(), 1);
}

#[tokio::test]
async fn test_generation_failure_sends_single_notice() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::failing();
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();

    let texts = gateway.texts_for(CHAT);
    assert_eq!(
        texts
            .iter()
            .filter(|t| *t == messages::MSG_GENERATION_FAILED)
            .count(),
        1
    );
    assert!(gateway.documents_for(CHAT).is_empty());
    assert_eq!(engine.active_sessions(), 0);
}

#[tokio::test]
async fn test_cancel_discards_session_before_generation() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_cancel(CHAT).await.unwrap();

    assert!(generator.calls().is_empty());
    assert_eq!(engine.active_sessions(), 0);
    assert!(gateway
        .texts_for(CHAT)
        .contains(&messages::MSG_CANCELLED.to_string()));

    // Dates after cancellation fall on deaf ears.
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_without_session_acknowledges() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_cancel(CHAT).await.unwrap();

    assert_eq!(
        gateway.texts_for(CHAT),
        vec![messages::MSG_NOTHING_TO_CANCEL]
    );
}

#[tokio::test]
async fn test_text_ignored_while_awaiting_base() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();

    // No prompt, no transition: a selection is still expected.
    assert!(gateway.texts_for(CHAT).is_empty());
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    assert_eq!(gateway.texts_for(CHAT), vec![messages::MSG_START_PROMPT]);
}

#[tokio::test]
async fn test_unknown_selection_is_ignored() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE NOWHERE").await.unwrap();

    assert!(gateway.texts_for(CHAT).is_empty());
    assert_eq!(engine.active_sessions(), 1);
}

#[tokio::test]
async fn test_reentry_replaces_active_session() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();

    // A fresh entry discards the picked base and starts over.
    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE SOROCABA").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.name, "BASE SOROCABA");
}

#[tokio::test]
async fn test_inverted_range_allowed_by_default() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();

    // Faithful default: the inverted range is passed through unchecked.
    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.start, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    assert_eq!(calls[0].1.end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
}

#[tokio::test]
async fn test_inverted_range_rejected_when_configured() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator).require_ordered_range(true);

    engine.handle_entry(CHAT).await.unwrap();
    engine.handle_selection(CHAT, "BASE BAURU").await.unwrap();
    engine.handle_text(CHAT, "31/03/2024").await.unwrap();
    engine.handle_text(CHAT, "01/03/2024").await.unwrap();

    assert!(gateway
        .texts_for(CHAT)
        .contains(&messages::MSG_END_BEFORE_START.to_string()));
    assert!(generator.calls().is_empty());
    // Still awaiting a usable end date.
    engine.handle_text(CHAT, "30/04/2024").await.unwrap();
    assert_eq!(generator.calls().len(), 1);
}

#[tokio::test]
async fn test_sessions_do_not_cross_chats() {
    let gateway = MockGateway::new();
    let generator = MockGenerator::succeeding("/tmp/r.pdf");
    let engine = engine_with(&gateway, &generator);

    let alice = ChatId(1);
    let bob = ChatId(2);

    engine.handle_entry(alice).await.unwrap();
    engine.handle_entry(bob).await.unwrap();
    engine.handle_selection(alice, "BASE BAURU").await.unwrap();
    engine.handle_selection(bob, "BASE LIMEIRA").await.unwrap();
    engine.handle_text(alice, "01/03/2024").await.unwrap();
    engine.handle_text(bob, "05/03/2024").await.unwrap();
    engine.handle_text(alice, "31/03/2024").await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.name, "BASE BAURU");
    assert_eq!(engine.active_sessions(), 1);
}
