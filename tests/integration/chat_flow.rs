//! Chat flow against the mock model: context assembly, history
//! threading, and inline error replies. The FPL API base points at an
//! unroutable address, so data sections degrade to the rulebook only.

use std::sync::Arc;
use std::time::Duration;

use fpl_assistant::api::{FplApi, ResponseCache};
use fpl_assistant::chat::Assistant;
use fpl_assistant::rules::RulesIndex;
use fpl_assistant::types::ChatMessage;

use crate::mock_model::MockModel;

fn offline_api() -> FplApi {
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
    FplApi::new("http://127.0.0.1:1/api/", cache).unwrap()
}

#[tokio::test]
async fn test_reply_embeds_rules_context() {
    let model = MockModel::new("Spend it wisely.");
    let calls = model.call_log();
    let assistant = Assistant::new(offline_api(), Arc::new(model), RulesIndex::new());

    let reply = assistant.reply("what is the budget?", &[], None).await;
    assert_eq!(reply, "Spend it wisely.");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system.contains("Fantasy Premier League"));

    let prompt = &calls[0].messages.last().unwrap().content;
    assert!(prompt.contains("£100 million initial budget"));
    assert!(prompt.contains("User Question: what is the budget?"));
}

#[tokio::test]
async fn test_reply_threads_history() {
    let model = MockModel::new("As I said, Haaland.");
    let calls = model.call_log();
    let assistant = Assistant::new(offline_api(), Arc::new(model), RulesIndex::new());

    let history = vec![
        ChatMessage::user("Who should I captain?"),
        ChatMessage::assistant("Haaland."),
    ];
    assistant.reply("Are you sure?", &history, None).await;

    let calls = calls.lock().unwrap();
    // Two history turns plus the new context-wrapped question.
    assert_eq!(calls[0].messages.len(), 3);
    assert_eq!(calls[0].messages[0].content, "Who should I captain?");
    assert_eq!(calls[0].messages[1].content, "Haaland.");
}

#[tokio::test]
async fn test_model_failure_becomes_inline_reply() {
    let model = MockModel::new("unused");
    model.set_error("rate limited");
    let assistant = Assistant::new(offline_api(), Arc::new(model), RulesIndex::new());

    let reply = assistant.reply("hello", &[], None).await;
    assert!(reply.starts_with("Error getting response:"));
    assert!(reply.contains("rate limited"));
}

#[tokio::test]
async fn test_unmatched_query_still_gets_placeholder_rules() {
    let model = MockModel::new("ok");
    let calls = model.call_log();
    let assistant = Assistant::new(offline_api(), Arc::new(model), RulesIndex::new());

    assistant.reply("zzzzz", &[], None).await;

    let calls = calls.lock().unwrap();
    let prompt = &calls[0].messages.last().unwrap().content;
    assert!(prompt.contains("No specific FPL rules found for this query."));
}
