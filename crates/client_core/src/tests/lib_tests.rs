use super::*;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::Engine as _;
use serde_json::{json, Value};
use shared::error::is_duck_themed;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

type Captured = Arc<Mutex<Option<oneshot::Sender<GenerateRequest>>>>;

async fn spawn_duck_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn generate_route(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        GENERATE_PATH,
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    )
}

async fn handle_capture(
    State(tx): State<Captured>,
    Json(payload): Json<GenerateRequest>,
) -> impl IntoResponse {
    if let Some(tx) = tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(json!({
        "success": true,
        "image": "data:image/png;base64,firstduckimage",
        "message": "Quack quack! Your duck is ready!",
        "is_fallback": false,
        "prompt_used": "a duck wearing sunglasses on a beach, cute duck"
    }))
}

#[tokio::test]
async fn generate_posts_description_and_decodes_success() {
    let (tx, rx) = oneshot::channel();
    let app = Router::new()
        .route(GENERATE_PATH, post(handle_capture))
        .with_state(Arc::new(Mutex::new(Some(tx))));
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let result = client
        .generate("a duck wearing sunglasses on a beach")
        .await
        .expect("generate");

    let sent = rx.await.expect("request captured");
    assert_eq!(sent.description, "a duck wearing sunglasses on a beach");
    assert_eq!(result.image, "data:image/png;base64,firstduckimage");
    assert_eq!(result.message, "Quack quack! Your duck is ready!");
    assert!(!result.is_fallback);
    assert_eq!(
        result.prompt_used.as_deref(),
        Some("a duck wearing sunglasses on a beach, cute duck")
    );
}

#[tokio::test]
async fn fallback_flag_and_default_message_are_carried_through() {
    let app = generate_route(
        StatusCode::OK,
        json!({"success": true, "image": "data:image/png;base64,fallbackdata", "is_fallback": true}),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let result = client.generate("a duck").await.expect("generate");
    assert!(result.is_fallback);
    assert_eq!(result.message, shared::domain::DEFAULT_SUCCESS_MESSAGE);
}

#[tokio::test]
async fn server_error_field_is_surfaced_verbatim() {
    let app = generate_route(
        StatusCode::BAD_REQUEST,
        json!({
            "error": "Quack! That's too much duck description. Keep it under 1024 characters!",
            "message": "Description exceeds maximum length of 1024 characters"
        }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let err = client.generate("a duck").await.expect_err("must fail");
    assert_eq!(
        err,
        GenerationError::ServerRejected {
            status: 400,
            server_message: Some(
                "Quack! That's too much duck description. Keep it under 1024 characters!"
                    .to_string()
            ),
        }
    );
    assert_eq!(
        err.user_message(),
        "Quack! That's too much duck description. Keep it under 1024 characters!"
    );
}

#[tokio::test]
async fn server_message_field_is_used_when_error_is_absent() {
    let app = generate_route(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"message": "Quack! The pond is a bit choppy..."}),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let err = client.generate("a duck").await.expect_err("must fail");
    assert_eq!(err.user_message(), "Quack! The pond is a bit choppy...");
}

#[tokio::test]
async fn unstructured_error_body_falls_back_to_generic_message() {
    let app = Router::new().route(
        GENERATE_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>") }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let err = client.generate("a duck").await.expect_err("must fail");
    assert_eq!(
        err,
        GenerationError::ServerRejected {
            status: 500,
            server_message: None,
        }
    );
    assert_eq!(err.user_message(), shared::error::SERVER_REJECTED_MESSAGE);
}

#[tokio::test]
async fn unsuccessful_or_imageless_payload_is_malformed() {
    for body in [
        json!({"success": false, "image": "data:image/png;base64,duck"}),
        json!({"success": true, "image": ""}),
        json!({"success": true}),
    ] {
        let client = HttpDuckClient::new(spawn_duck_server(generate_route(StatusCode::OK, body)).await);
        let err = client.generate("a duck").await.expect_err("must fail");
        assert!(matches!(err, GenerationError::MalformedResponse { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let app = Router::new().route(GENERATE_PATH, post(|| async { "quack" }));
    let client = HttpDuckClient::new(spawn_duck_server(app).await);

    let err = client.generate("a duck").await.expect_err("must fail");
    assert_eq!(err.kind(), shared::error::ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn slow_server_times_out_at_the_client_deadline() {
    let app = Router::new().route(
        GENERATE_PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"success": true, "image": "data:image/png;base64,late"}))
        }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await)
        .with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = client.generate("a duck").await.expect_err("must time out");

    assert_eq!(
        err,
        GenerationError::Timeout {
            after: Duration::from_millis(200)
        }
    );
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(err.user_message().contains("taking too long"));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = HttpDuckClient::new(format!("http://{addr}"));
    let err = client.generate("a duck").await.expect_err("must fail");

    assert_eq!(err.kind(), shared::error::ErrorKind::Transport);
    assert!(is_duck_themed(&err.user_message()));
    assert!(err.user_message().contains("pond"));
}

#[tokio::test]
async fn health_check_follows_status_code() {
    let healthy = Router::new().route(
        HEALTH_PATH,
        get(|| async { Json(json!({"status": "healthy"})) }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(healthy).await);
    client.check_health().await.expect("healthy");

    let sick = Router::new().route(
        HEALTH_PATH,
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(sick).await);
    assert_eq!(
        client.check_health().await,
        Err(GenerationError::ServerRejected {
            status: 503,
            server_message: None,
        })
    );
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let app = generate_route(
        StatusCode::OK,
        json!({"success": true, "image": "data:image/png;base64,slash"}),
    );
    let base = spawn_duck_server(app).await;
    let client = HttpDuckClient::new(format!("{base}/"));

    assert_eq!(client.base_url(), base);
    client.generate("a duck").await.expect("generate");
}

#[tokio::test]
async fn load_image_bytes_decodes_data_uri_and_fetches_urls() {
    let client = HttpDuckClient::new(DEFAULT_AGENT_ENDPOINT);
    let encoded = STANDARD.encode(b"\x89PNG duck");
    let bytes = client
        .load_image_bytes(&format!("data:image/png;base64,{encoded}"))
        .await
        .expect("decode");
    assert_eq!(bytes, b"\x89PNG duck");

    let err = client
        .load_image_bytes("data:image/png;base64,!!!")
        .await
        .expect_err("bad base64");
    assert_eq!(err.kind(), shared::error::ErrorKind::MalformedResponse);

    let app = Router::new().route("/ducks/1.png", get(|| async { b"remote duck".to_vec() }));
    let base = spawn_duck_server(app).await;
    let bytes = client
        .load_image_bytes(&format!("{base}/ducks/1.png"))
        .await
        .expect("fetch");
    assert_eq!(bytes, b"remote duck");
}

#[tokio::test]
async fn settings_build_a_client_with_their_timeout() {
    let settings = Settings {
        agent_endpoint: "http://127.0.0.1:9/".into(),
        request_timeout_secs: 7,
    };
    let client = HttpDuckClient::from_settings(&settings).expect("client");
    assert_eq!(client.base_url(), "http://127.0.0.1:9");
    assert_eq!(client.timeout(), Duration::from_secs(7));
}

#[tokio::test]
async fn controller_drives_http_client_end_to_end() {
    let app = generate_route(
        StatusCode::OK,
        json!({
            "success": true,
            "image": "data:image/png;base64,firstduckimage",
            "message": "Quack quack! Your duck is ready!"
        }),
    );
    let client = HttpDuckClient::new(spawn_duck_server(app).await);
    let mut controller = GenerationController::new();
    controller.set_prompt("a duck wearing sunglasses on a beach");

    controller.run(&client).await;

    let result = controller.result().expect("result");
    assert!(result.image.contains("firstduckimage"));
    assert_eq!(result.message, "Quack quack! Your duck is ready!");
    assert!(controller.can_submit());
}
