//! End-to-end turns through the webhook handler.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use holiday_chill_api::{
    config::Config,
    handlers::{self, ApiError},
    models::{SCREEN_OUTPUT, WebhookRequest},
    router::create_router,
    state::AppState,
};
use holiday_chill_core::{catalog::Catalog, session::ConsumptionPolicy};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::Level;

const REPROMPT: &str =
    "Would you like to meditate with Jack Frost or listen to the sounds of winter?";

fn app_state(policy: ConsumptionPolicy) -> Arc<AppState> {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        log_level: Level::INFO,
        catalog_path: None,
        content_policy: policy,
        session_ttl: Duration::from_secs(600),
    };
    Arc::new(AppState::new(Catalog::load_default().unwrap(), config).unwrap())
}

fn request(
    session_id: &str,
    action: &str,
    category: Option<&str>,
    query: &str,
    screen: bool,
) -> WebhookRequest {
    let mut capabilities = vec![json!({ "name": "actions.capability.AUDIO_OUTPUT" })];
    if screen {
        capabilities.push(json!({ "name": SCREEN_OUTPUT }));
    }
    let parameters = match category {
        Some(c) => json!({ "category": c }),
        None => json!({}),
    };
    serde_json::from_value(json!({
        "sessionId": session_id,
        "result": { "action": action, "resolvedQuery": query, "parameters": parameters },
        "originalRequest": {
            "source": "google",
            "data": {
                "surface": { "capabilities": capabilities },
                "inputs": [ { "rawInputs": [ { "query": query } ] } ]
            }
        }
    }))
    .unwrap()
}

async fn turn(state: &Arc<AppState>, req: WebhookRequest) -> Value {
    let Json(response) = handlers::webhook(State(state.clone()), HeaderMap::new(), Ok(Json(req)))
        .await
        .expect("turn should succeed");
    serde_json::to_value(response).unwrap()
}

fn ssml_of(item: &Value) -> &str {
    item["simpleResponse"]["ssml"].as_str().unwrap_or_default()
}

/// Serves `app` on an ephemeral port, sends one raw HTTP/1.1 request and
/// returns the status code, the lowercased response head and the JSON body.
async fn send_raw(app: Router, request: &str) -> (u16, String, Value) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").expect("response has a head");
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), serde_json::from_str(body).unwrap())
}

fn post(path: &str, body: &str, content_type: Option<&str>) -> String {
    let mut request = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n",
        body.len()
    );
    if let Some(content_type) = content_type {
        request.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    request.push_str("\r\n");
    request.push_str(body);
    request
}

#[tokio::test]
async fn test_meditation_on_speaker() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let body = turn(
        &state,
        request("s1", "meditate.intent", Some("meditation"), "meditate", false),
    )
    .await;

    let google = &body["data"]["google"];
    assert_eq!(google["expectUserResponse"], true);
    assert_eq!(google["noInputPrompts"], json!([{ "textToSpeech": REPROMPT }]));

    let items = google["richResponse"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let speech = ssml_of(&items[0]);
    let meditation = state.dispatcher.catalog().lookup("meditation").unwrap();
    assert!(meditation.entries.iter().any(|e| speech.contains(e.as_str())));
    assert!(speech.ends_with(&format!("{}</speak>", meditation.next_prompt)));
    assert_eq!(body["speech"], speech);
}

#[tokio::test]
async fn test_sounds_of_winter_on_phone() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let body = turn(
        &state,
        request("s1", "soundsOfWinter.intent", Some("sounds of winter"), "winter", true),
    )
    .await;

    let rich = &body["data"]["google"]["richResponse"];
    let card = &rich["items"][1]["basicCard"];
    let image_url = card["image"]["url"].as_str().unwrap();
    assert!(
        state
            .dispatcher
            .catalog()
            .images()
            .iter()
            .any(|i| i.url == image_url)
    );
    assert_eq!(
        card["buttons"],
        json!([{
            "title": "Learn more",
            "openUrlAction": { "url": "https://www.theholidaychill.com" }
        }])
    );
    assert_eq!(
        rich["suggestions"],
        json!([{ "title": "Meditation" }, { "title": "Sounds of Winter" }])
    );
}

#[tokio::test]
async fn test_unrecognized_input_gets_clarification() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let body = turn(&state, request("s1", "deeplink.unknown", None, "play jazz", false)).await;

    let speech = body["speech"].as_str().unwrap();
    let expected: Vec<String> = state
        .dispatcher
        .catalog()
        .fallback_templates()
        .iter()
        .map(|t| holiday_chill_core::fallback::render_template(t, "play jazz"))
        .collect();
    assert!(expected.iter().any(|e| e == speech));
    assert_eq!(body["data"]["google"]["expectUserResponse"], true);
}

#[tokio::test]
async fn test_unknown_category_gets_clarification_not_silence() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let body = turn(
        &state,
        request("s1", "meditate.intent", Some("jazz"), "play jazz", true),
    )
    .await;

    let rich = &body["data"]["google"]["richResponse"];
    assert_eq!(rich["items"].as_array().unwrap().len(), 1);
    assert_eq!(rich["suggestions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_start_over_at_beginning() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let body = turn(&state, request("s1", "startOver.intent", None, "go back", false)).await;

    let expected = format!(
        "<speak>{}</speak>",
        state.dispatcher.catalog().general().start_over
    );
    assert_eq!(body["speech"], expected.as_str());
}

#[tokio::test]
async fn test_sessions_do_not_leak_into_each_other() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);

    turn(
        &state,
        request("alice", "meditate.intent", Some("meditation"), "meditate", false),
    )
    .await;
    let bob = turn(&state, request("bob", "startOver.intent", None, "go back", false)).await;
    let alice = turn(&state, request("alice", "startOver.intent", None, "go back", false)).await;

    assert!(bob["speech"].as_str().unwrap().contains("going all the way back to the beginning"));
    assert_eq!(
        alice["speech"],
        "<speak>Would you like to restart the meditation, or go all the way back to the beginning?</speak>"
    );
}

#[tokio::test]
async fn test_heard_it_all_closes_and_forgets_session() {
    let state = app_state(ConsumptionPolicy::ConsumeServed);

    let meditate = || request("s1", "meditate.intent", Some("meditation"), "meditate", false);

    for _ in 0..4 {
        turn(&state, meditate()).await;
    }
    turn(
        &state,
        request("s1", "soundsOfWinter.intent", Some("sounds of winter"), "winter", false),
    )
    .await;

    let last = turn(&state, meditate()).await;
    assert_eq!(last["data"]["google"]["expectUserResponse"], false);
    assert!(last["speech"].as_str().unwrap().contains("you heard it all"));

    // The closed session starts over from scratch.
    let next = turn(&state, request("s1", "startOver.intent", None, "go back", false)).await;
    assert!(next["speech"].as_str().unwrap().contains("going all the way back to the beginning"));
}

#[tokio::test]
async fn test_missing_session_id_is_rejected() {
    let state = app_state(ConsumptionPolicy::AllowRepeats);
    let req: WebhookRequest =
        serde_json::from_value(json!({ "result": { "action": "meditate.intent" } })).unwrap();

    let err = handlers::webhook(State(state), HeaderMap::new(), Ok(Json(req)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_internal_errors_are_generic() {
    let err = ApiError::from(anyhow::anyhow!("store unavailable"));
    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_health() {
    let response = handlers::health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_turn_over_http() {
    let app = create_router(app_state(ConsumptionPolicy::AllowRepeats));
    let body = json!({
        "sessionId": "s1",
        "result": { "action": "startOver.intent", "resolvedQuery": "go back" }
    })
    .to_string();
    let request = post("/webhook", &body, Some("application/json"));

    let (status, head, json) = send_raw(app, &request).await;

    assert_eq!(status, 200);
    assert!(head.contains("content-type: application/json"));
    assert_eq!(json["data"]["google"]["expectUserResponse"], true);
}

#[tokio::test]
async fn test_mistyped_body_is_bad_request() {
    let app = create_router(app_state(ConsumptionPolicy::AllowRepeats));
    let body = r#"{"sessionId": "s1", "result": {"action": 7}}"#;
    let request = post("/webhook", body, Some("application/json"));

    let (status, head, json) = send_raw(app, &request).await;

    assert_eq!(status, 400);
    assert!(head.contains("content-type: application/json"));
    assert!(json["message"].as_str().unwrap().contains("deserialize"));
}

#[tokio::test]
async fn test_unparsable_body_is_bad_request() {
    let app = create_router(app_state(ConsumptionPolicy::AllowRepeats));
    let request = post("/webhook", "{ not json", Some("application/json"));

    let (status, _, json) = send_raw(app, &request).await;

    assert_eq!(status, 400);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = create_router(app_state(ConsumptionPolicy::AllowRepeats));
    let body = json!({ "sessionId": "s1", "result": { "action": "startOver.intent" } }).to_string();

    let (status, _, json) = send_raw(app, &post("/webhook", &body, None)).await;

    assert_eq!(status, 400);
    assert!(json["message"].as_str().unwrap().contains("Content-Type"));
}

async fn explode() -> &'static str {
    panic!("catalog went missing")
}

#[tokio::test]
async fn test_panicking_handler_returns_generic_json() {
    let app = Router::new()
        .route("/boom", get(explode))
        .layer(CatchPanicLayer::custom(handlers::panic_response));
    let request = "GET /boom HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";

    let (status, head, json) = send_raw(app, request).await;

    assert_eq!(status, 500);
    assert!(head.contains("content-type: application/json"));
    assert_eq!(json, json!({ "message": "An internal server error occurred." }));
}
