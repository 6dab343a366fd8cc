use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use ferryroutes_lib::{ChatTurn, RouteStore};
use ferryroutes_service::{cors_layer, router, ServiceConfig, DEFAULT_CORS_ORIGIN};
use ferryroutes_service_shared::test_utils::{fixture_ports::*, fixture_store, StubChatModel};
use ferryroutes_service_shared::{AppState, ChatModel};

fn server_with(state: AppState) -> TestServer {
    let cors = cors_layer(DEFAULT_CORS_ORIGIN).expect("default origin is valid");
    TestServer::new(router(state, &ServiceConfig::default(), cors)).expect("test server starts")
}

fn server() -> TestServer {
    server_with(AppState::from_components(fixture_store(), None))
}

fn server_with_chat(model: Arc<StubChatModel>, history_turns: usize) -> TestServer {
    let model: Arc<dyn ChatModel> = model;
    server_with(
        AppState::from_components(fixture_store(), None).with_chat(Some(model), history_turns),
    )
}

#[tokio::test]
async fn lists_every_route() {
    let response = server().get("/routes").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["routes"].as_array().map(Vec::len), Some(9));
    assert_eq!(body["routes"][0]["route_id"], "R1");
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn empty_store_lists_no_routes_but_has_no_fares() {
    let server = server_with(AppState::from_components(RouteStore::default(), None));

    let response = server.get("/routes").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["routes"], json!([]));

    let response = server.get("/most-expensive-route").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "No price data available.");
}

#[tokio::test]
async fn routes_between_ports() {
    let server = server();

    let response = server.get(&format!("/routes/{PIRAEUS}/{NAXOS}")).await;
    response.assert_status_ok();
    let ids: Vec<Value> = response.json::<Value>()["routes"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|route| route["route_id"].clone())
        .collect();
    assert_eq!(ids, [json!("R1"), json!("R2")]);

    let response = server.get(&format!("/routes/{NAXOS}/{PIRAEUS}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.header("content-type"),
        HeaderValue::from_static("application/problem+json")
    );
    let problem: Value = response.json();
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["detail"], "No routes found.");
}

#[tokio::test]
async fn prices_and_vessels_by_route() {
    let server = server();

    let response = server.get("/prices/R1").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["route_id"], "R1");
    assert_eq!(body["prices"].as_array().map(Vec::len), Some(2));

    let response = server.get("/prices/R404").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "Price data not found.");

    let response = server.get("/vessel/R2").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["vessels"], json!(["Champion Jet 1"]));

    let response = server.get("/vessel/R404").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "No vessel found.");
}

#[tokio::test]
async fn shortest_duration_names_its_route() {
    let server = server();

    let response = server.get(&format!("/duration/{PIRAEUS}/{NAXOS}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["shortest_duration"], 210);
    assert_eq!(body["route_id"], "R2");

    let response = server.get(&format!("/duration/{NAXOS}/{RAFINA}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "No duration data available.");
}

#[tokio::test]
async fn availability_on_a_date() {
    let server = server();

    let response = server
        .get(&format!("/availability/{PIRAEUS}/{NAXOS}/{BUSY_DATE}"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["date"], BUSY_DATE);
    let services = body["available_services"].as_array().cloned().unwrap_or_default();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0]["vessels"], json!(["Blue Star Delos"]));

    let response = server
        .get(&format!("/availability/{PIRAEUS}/{NAXOS}/2024-08-01"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["detail"],
        "No ferry available on this date."
    );
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let response = server()
        .get(&format!("/availability/{PIRAEUS}/{NAXOS}/15-07-2024"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/invalid-request");
    assert!(problem["detail"]
        .as_str()
        .is_some_and(|detail| detail.contains("date")));
}

#[tokio::test]
async fn indirect_route_through_a_stopover() {
    let server = server();

    let response = server
        .get(&format!("/indirect-route/{RAFINA}/{MYKONOS}"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let routes = body["routes"].as_array().cloned().unwrap_or_default();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["stopover"], "Tinos");
    assert_eq!(routes[0]["first_leg"]["route_ids"], json!(["R6"]));
    assert_eq!(routes[0]["second_leg"]["route_ids"], json!(["R7"]));

    let response = server
        .get(&format!("/indirect-route/{MYKONOS}/{PIRAEUS}"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "No indirect route found.");
}

#[tokio::test]
async fn schedule_from_a_port() {
    let server = server();

    let response = server.get(&format!("/schedule/{PIRAEUS}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["origin"], PIRAEUS);
    let departures = body["departures"].as_array().cloned().unwrap_or_default();
    assert_eq!(departures.len(), 3);
    assert_eq!(departures[0]["price_range"], json!({"min": 58, "max": 62}));

    let response = server.get("/schedule/Santorini").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "No departures found.");
}

#[tokio::test]
async fn cheapest_and_most_expensive_fares() {
    let server = server();

    let response = server.get(&format!("/cheapest-route/{PIRAEUS}/{NAXOS}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["route_id"], "R1");
    assert_eq!(body["vessel"], "Blue Star Naxos");
    assert_eq!(body["price"], 58);

    let response = server.get(&format!("/cheapest-route/{NAXOS}/{PAROS}")).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/most-expensive-route").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["route_id"], "R2");
    assert_eq!(body["price"], 89);
}

#[tokio::test]
async fn suggestions_for_origin_and_date() {
    let server = server();

    let response = server
        .get("/suggestions")
        .add_query_param("origin", "Pir")
        .add_query_param("date", BUSY_DATE)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["suggestions"]["destinations"], json!(["Naxos", "Paros"]));
    assert_eq!(
        body["suggestions"]["nearby_dates"],
        json!(["2024-07-16", "2024-07-17"])
    );
    let text = body["text"].as_str().unwrap_or_default();
    assert!(text.starts_with("Popular destinations from Pir:"));

    let response = server.get("/suggestions").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["suggestions"]["popular_ports"][0],
        PIRAEUS
    );

    let response = server
        .get("/suggestions")
        .add_query_param("origin", " ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_dispatch_returns_tagged_outcome() {
    let response = server()
        .post("/api/v1/query")
        .json(&json!({
            "operation": "shortest_duration",
            "origin": PIRAEUS,
            "destination": NAXOS,
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["operation"], "shortest_duration");
    assert_eq!(body["result"]["shortest"]["route_id"], "R2");
}

#[tokio::test]
async fn query_dispatch_renders_text_and_accepts_tool_names() {
    let server = server();

    let response = server
        .post("/api/v1/query")
        .add_query_param("format", "text")
        .json(&json!({
            "operation": "get_duration",
            "origin": PIRAEUS,
            "destination": NAXOS,
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["content_type"], "text/plain");
    assert_eq!(
        body["text"],
        "The shortest duration from Piraeus to Naxos is 210 minutes (route R2)."
    );

    let response = server
        .post("/api/v1/query")
        .add_query_param("format", "text")
        .json(&json!({"operation": "get_ferry_schedule", "origin": "Atlantis"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["text"],
        "No departures found from Atlantis."
    );
}

#[tokio::test]
async fn query_dispatch_rejects_invalid_input() {
    let response = server()
        .post("/api/v1/query")
        .json(&json!({
            "operation": "availability",
            "origin": PIRAEUS,
            "destination": NAXOS,
            "date": "tomorrow",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_id_is_echoed_and_used_as_problem_instance() {
    let response = server()
        .get("/routes/Atlantis/Naxos")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("ferry-test-1"),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.header("x-request-id"),
        HeaderValue::from_static("ferry-test-1")
    );
    assert_eq!(response.json::<Value>()["instance"], "ferry-test-1");
}

#[tokio::test]
async fn cors_allows_the_configured_origin() {
    let response = server()
        .get("/routes")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header("access-control-allow-origin"),
        HeaderValue::from_static(DEFAULT_CORS_ORIGIN)
    );
}

#[tokio::test]
async fn chat_without_model_is_unavailable() {
    let response = server()
        .post("/api/v1/chat")
        .json(&json!({"query": "Any ferries to Naxos?"}))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.json::<Value>()["detail"]
        .as_str()
        .is_some_and(|detail| detail.contains("GROQ_API_KEY")));
}

#[tokio::test]
async fn chat_returns_reply_and_updated_history() {
    let model = StubChatModel::replying("Seajets R2 leaves Piraeus at 07:00.");
    let server = server_with_chat(model.clone(), 20);

    let response = server
        .post("/api/v1/chat")
        .json(&json!({
            "query": "And the fastest one?",
            "history": [
                {"role": "user", "content": "Ferries from Piraeus to Naxos?"},
                {"role": "assistant", "content": "Blue Star R1 and Seajets R2."},
            ],
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["response"], "Seajets R2 leaves Piraeus at 07:00.");
    let history: Vec<ChatTurn> =
        serde_json::from_value(body["history"].clone()).expect("history deserializes");
    assert_eq!(history.len(), 4);
    assert_eq!(history[2], ChatTurn::user("And the fastest one?"));
    assert_eq!(
        history[3],
        ChatTurn::assistant("Seajets R2 leaves Piraeus at 07:00.")
    );

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User: Ferries from Piraeus to Naxos?"));
    assert!(prompts[0].contains("Current query: And the fastest one?"));
}

#[tokio::test]
async fn chat_history_is_trimmed_to_the_window() {
    let server = server_with_chat(StubChatModel::replying("Yes."), 2);

    let response = server
        .post("/api/v1/chat")
        .json(&json!({
            "query": "Is there a ferry on Friday?",
            "history": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
            ],
        }))
        .await;
    response.assert_status_ok();

    let history: Vec<ChatTurn> =
        serde_json::from_value(response.json::<Value>()["history"].clone())
            .expect("history deserializes");
    assert_eq!(
        history,
        [
            ChatTurn::user("Is there a ferry on Friday?"),
            ChatTurn::assistant("Yes."),
        ]
    );
}

#[tokio::test]
async fn chat_model_failure_is_a_bad_gateway() {
    let server = server_with_chat(StubChatModel::failing(), 20);
    let response = server
        .post("/api/v1/chat")
        .json(&json!({"query": "Any ferries?"}))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.json::<Value>()["detail"]
        .as_str()
        .is_some_and(|detail| detail.starts_with("AI chat error")));
}

#[tokio::test]
async fn chat_rejects_empty_query() {
    let server = server_with_chat(StubChatModel::replying("unused"), 20);
    let response = server
        .post("/api/v1/chat")
        .json(&json!({"query": "  "}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_query_string_form_answers_single_turn() {
    let model = StubChatModel::replying("Blue Star R1 and Seajets R2.");
    let server = server_with_chat(model.clone(), 20);

    for path in ["/chat/", "/chat"] {
        let response = server
            .get(path)
            .add_query_param("query", "Ferries from Piraeus to Naxos?")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            )
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin"),
            DEFAULT_CORS_ORIGIN
        );

        let body: Value = response.json();
        assert_eq!(body["response"], "Blue Star R1 and Seajets R2.");
        let history: Vec<ChatTurn> =
            serde_json::from_value(body["history"].clone()).expect("history deserializes");
        assert_eq!(
            history,
            [
                ChatTurn::user("Ferries from Piraeus to Naxos?"),
                ChatTurn::assistant("Blue Star R1 and Seajets R2."),
            ]
        );
    }

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Conversation history:\n\n"));
}

#[tokio::test]
async fn chat_query_string_form_requires_query() {
    let server = server_with_chat(StubChatModel::replying("unused"), 20);
    server
        .get("/chat/")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    self::server()
        .get("/chat/")
        .add_query_param("query", "Any ferries?")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_and_metrics_endpoints() {
    let server = server();

    server.get("/health/live").await.assert_status_ok();

    let response = server.get("/health/ready").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["routes_loaded"], 9);

    let response = server.get("/metrics").await;
    response.assert_status_ok();
}
