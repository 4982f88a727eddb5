mod common;

use std::sync::Arc;
use std::time::Duration;

use testcontainers::clients::Cli;
use uuid::Uuid;

use parlance::grammar::types::GrammarFeedback;
use parlance::llm::LlmProvider;
use parlance::routes::configure_routes;
use parlance::state::AppState;
use parlance::store::{Store, StoreConfig};

// Macro to set up test environment
// Note: This keeps _docker and _container alive for the duration of the test
macro_rules! setup_api_test {
    ($docker:ident, $container:ident, $store:ident, $state:ident, $provider:expr) => {
        let $docker = Cli::default();
        let $container = $docker.run(common::create_postgres_container());

        // Give the container a moment to fully initialize; Postgres restarts
        // once after the init scripts run
        tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;

        let host_port = $container.get_host_port_ipv4(common::POSTGRES_PORT);
        let connection_string = common::build_connection_string("127.0.0.1", host_port);
        let config = StoreConfig::from_connection_string(&connection_string).unwrap();
        let $store = Store::connect(config).await.unwrap();

        let provider: Arc<dyn LlmProvider> = Arc::new($provider);
        let settings = Arc::new(common::test_settings(&connection_string));
        let $state = AppState::new($store.clone(), provider, None, settings);
    };
}

/// Wait for the background grammar task to persist its feedback
async fn wait_for_feedback(store: &Store, message_id: Uuid) -> GrammarFeedback {
    for _ in 0..100 {
        if let Some(feedback) = store.find_feedback_opt(message_id).await.unwrap() {
            return feedback;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("grammar feedback for {} was not stored in time", message_id);
}

#[tokio::test]
async fn test_conversation_lifecycle() {
    setup_api_test!(
        _docker,
        _container,
        store,
        state,
        common::CannedProvider::new("Nice to meet you! What would you like to talk about?")
    );
    let routes = configure_routes(state);

    // Start a conversation
    let response = warp::test::request()
        .method("POST")
        .path("/api/conversations/start")
        .json(&serde_json::json!({"first_message": "Hello, I am learn English."}))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["response"],
        "Nice to meet you! What would you like to talk about?"
    );
    assert_eq!(body["data"]["conversation_type"], "FREE_CHAT");

    let conversation_id: Uuid = body["data"]["conversation_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let first_user_message_id: Uuid = body["data"]["user_message_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Continue the conversation
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/conversations/{}/message", conversation_id))
        .json(&serde_json::json!({"message": "I goed to school yesterday."}))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"]["turn_count"], 2);

    // The conversation shows up in the listing with its counters updated
    let response = warp::test::request()
        .method("GET")
        .path("/api/conversations")
        .reply(&routes)
        .await;
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["message_count"], 4);
    assert_eq!(body["data"][0]["title"], "Hello, I am learn English.");

    // All four messages are stored in order
    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/conversations/{}/messages", conversation_id))
        .reply(&routes)
        .await;
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[2]["content"], "I goed to school yesterday.");

    // Grammar feedback for the first message arrives in the background
    let feedback = wait_for_feedback(&store, first_user_message_id).await;
    assert_eq!(feedback.original_text, "Hello, I am learn English.");

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/grammar/message/{}", first_user_message_id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    // End, then delete
    let response = warp::test::request()
        .method("PUT")
        .path(&format!("/api/conversations/{}/end", conversation_id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/conversations/{}", conversation_id))
        .reply(&routes)
        .await;
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"]["status"], "COMPLETED");

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/conversations/{}", conversation_id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/conversations/{}", conversation_id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_grammar_check_parses_model_reply() {
    setup_api_test!(
        _docker,
        _container,
        _store,
        state,
        common::CannedProvider::new(
            "```json\n{\"has_errors\": true, \"errors\": [{\"type\": \"grammar\", \
             \"original\": \"goed\", \"corrected\": \"went\", \"explanation\": \
             \"irregular past tense\", \"position\": {\"start\": 2, \"end\": 6}}], \
             \"corrected_sentence\": \"I went to school.\", \"overall_quality\": 0.7}\n```"
        )
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/api/grammar/check")
        .json(&serde_json::json!({"text": "I goed to school."}))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"]["has_errors"], true);
    assert_eq!(body["data"]["errors"][0]["corrected"], "went");
    assert_eq!(body["data"]["corrected_sentence"], "I went to school.");
}

#[tokio::test]
async fn test_feedback_stream_delivers_stored_feedback() {
    setup_api_test!(
        _docker,
        _container,
        store,
        state,
        common::CannedProvider::new("Sounds good!")
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/api/conversations/start")
        .json(&serde_json::json!({"first_message": "I has a question."}))
        .reply(&routes)
        .await;
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    let user_message_id: Uuid = body["data"]["user_message_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Once the feedback is persisted the stream replays it immediately
    wait_for_feedback(&store, user_message_id).await;

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/grammar/stream/{}", user_message_id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("event:grammar_feedback") || body.contains("event: grammar_feedback"));
    assert!(body.contains("I has a question."));
    assert!(body.contains("event:done") || body.contains("event: done"));
}

#[tokio::test]
async fn test_grammar_stats_over_conversation() {
    setup_api_test!(
        _docker,
        _container,
        store,
        state,
        common::CannedProvider::new("Let's keep practicing.")
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/api/conversations/start")
        .json(&serde_json::json!({"first_message": "Hello teacher."}))
        .reply(&routes)
        .await;
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    let user_message_id: Uuid = body["data"]["user_message_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    wait_for_feedback(&store, user_message_id).await;

    let response = warp::test::request()
        .method("GET")
        .path("/api/grammar/stats?time_range=7d")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"]["total_messages"], 1);
    // The canned reply is not JSON, so the analysis degrades to "no errors"
    assert_eq!(body["data"]["messages_with_errors"], 0);
    assert_eq!(body["data"]["error_rate"], 0.0);
}

#[tokio::test]
async fn test_roleplay_conversation_start() {
    setup_api_test!(
        _docker,
        _container,
        _store,
        state,
        common::CannedProvider::new("Welcome in! What can I get started for you today?")
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/api/conversations/start")
        .json(&serde_json::json!({
            "first_message": "Hi, one coffee please.",
            "conversation_type": "ROLE_PLAYING",
            "role_character": "Cafe Barista"
        }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["data"]["conversation_type"], "ROLE_PLAYING");
    assert_eq!(body["data"]["role_character"], "Cafe Barista");
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    setup_api_test!(
        _docker,
        _container,
        _store,
        state,
        common::CannedProvider::new("unused")
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/api/conversations/start")
        .json(&serde_json::json!({"first_message": "   "}))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_message_to_missing_conversation_is_not_found() {
    setup_api_test!(
        _docker,
        _container,
        _store,
        state,
        common::CannedProvider::new("unused")
    );
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/conversations/{}/message", Uuid::new_v4()))
        .json(&serde_json::json!({"message": "anyone there?"}))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 404);
}
