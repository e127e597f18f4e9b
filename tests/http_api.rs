use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use azure_diagnostics::api::{self, AppState};
use azure_diagnostics::config::Config;
use azure_diagnostics::startup::StartupLogger;
use azure_diagnostics::viewer::transport::{HttpTransport, SnapshotTransport};

fn app_for(root: &Path, vars: &[(&str, &str)], enabled: bool) -> Router {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config {
        root_dir: Some(root.to_path_buf()),
        diagnostics_enabled: enabled,
        ..Config::default()
    };
    let startup = StartupLogger::bootstrap(&config, Some(root));
    api::app(AppState::new(config, Arc::new(env), startup))
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("host", "my-site.azurewebsites.net")
                .header("user-agent", "integration-test")
                .header("accept", "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn post_json(app: Router, uri: &str, payload: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("host", "my-site.azurewebsites.net")
                .header("user-agent", "integration-test")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Viewer state the page embeds for its script
fn embedded_state(html: &str) -> serde_json::Value {
    let open = r#"<script type="application/json" id="viewer-state">"#;
    let start = html.find(open).unwrap() + open.len();
    let end = start + html[start..].find("</script>").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

fn fetch_count(lines: &[serde_json::Value]) -> usize {
    lines
        .iter()
        .filter(|l| l.as_str().unwrap().contains("Fetching server diagnostics"))
        .count()
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn diagnostics_reports_populated_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"name":"web","version":"0.1.0","scripts":{"start":"next start"},"dependencies":{"next":"15.5.3"}}"#,
    )
    .unwrap();
    std::fs::create_dir(dir.path().join(".next")).unwrap();
    std::fs::create_dir(dir.path().join("node_modules")).unwrap();

    let app = app_for(
        dir.path(),
        &[
            ("WEBSITE_HOSTNAME", "my-site.azurewebsites.net"),
            ("AZURE_CLIENT_SECRET", "super-secret-value"),
        ],
        true,
    );
    let (status, json) = get_json(app, "/api/diagnostics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["timestamp"].is_string());
    assert!(json["server"].is_string());

    let d = &json["diagnostics"];
    assert_eq!(d["environment"]["WEBSITE_HOSTNAME"], "my-site.azurewebsites.net");
    assert_eq!(d["environment"]["AZURE_CLIENT_SECRET"], "SET");
    assert_eq!(d["environment"]["AZURE_TENANT_ID"], "NOT_SET");
    assert!(!json.to_string().contains("super-secret-value"));

    assert_eq!(d["fileSystemChecks"]["packageJsonExists"], true);
    assert_eq!(d["fileSystemChecks"]["buildDirExists"], true);
    assert_eq!(d["fileSystemChecks"]["nodeModulesExists"], true);
    assert_eq!(d["fileSystemChecks"]["srcDirExists"], false);
    assert_eq!(d["directoryContents"]["nextBuildExists"], true);
    assert_eq!(d["packageInfo"]["name"], "web");
    assert_eq!(d["packageInfo"]["scripts"], serde_json::json!(["start"]));
    assert!(d["performanceInfo"]["requestProcessingTime"].is_u64());
    assert_eq!(d["requestHeaders"]["user-agent"], "integration-test");
    assert_eq!(
        d["requestUrl"],
        "http://my-site.azurewebsites.net/api/diagnostics"
    );

    let logs = json["logs"].as_array().unwrap();
    assert!(!logs.is_empty());
    let stamps: Vec<&str> = logs
        .iter()
        .map(|l| {
            let l = l.as_str().unwrap();
            &l[1..l.find(']').unwrap()]
        })
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn missing_manifest_and_build_dir_degrade_per_field() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("server.js"), "").unwrap();

    let (status, json) = get_json(app_for(dir.path(), &[], true), "/api/diagnostics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let d = &json["diagnostics"];
    assert!(d["packageInfo"]["error"].as_str().unwrap().contains("package.json"));
    assert_eq!(d["directoryContents"]["nextBuildExists"], false);
    assert_eq!(d["directoryContents"]["nextBuildError"], "Build directory not found");
    assert_eq!(d["directoryContents"]["files"], serde_json::json!(["server.js"]));
    assert_eq!(d["directoryContents"]["filesCount"], 1);
    assert!(d["processInfo"]["pid"].is_u64());
    assert!(d["environment"].is_object());
}

#[tokio::test]
async fn missing_root_still_answers() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("gone");

    let (status, json) = get_json(app_for(&gone, &[], true), "/api/diagnostics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["diagnostics"]["fileSystemChecks"]["cwdExists"], false);
    assert!(json["diagnostics"]["directoryContents"]["error"].is_string());
    assert!(json["diagnostics"]["packageInfo"]["error"].is_string());
}

#[tokio::test]
async fn disabled_diagnostics_answer_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let (status, json) = get_json(app_for(dir.path(), &[], false), "/api/diagnostics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, _, _) = get(app_for(dir.path(), &[], false), "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_debug_headers() {
    let dir = tempfile::tempdir().unwrap();
    let (status, headers, body) = get(app_for(dir.path(), &[], true), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
    assert!(headers.contains_key("x-debug-timestamp"));
    assert_eq!(
        headers["x-debug-server-version"],
        env!("CARGO_PKG_VERSION")
    );
}

#[tokio::test]
async fn startup_check_returns_bootstrap_log() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = get_json(app_for(dir.path(), &[], true), "/api/startup-check").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["diagnosticsEnabled"], true);
    let entries = json["entries"].as_array().unwrap();
    assert!(entries
        .last()
        .unwrap()
        .as_str()
        .unwrap()
        .ends_with("Configuration loaded successfully"));
}

#[tokio::test]
async fn page_renders_viewer_report() {
    let dir = tempfile::tempdir().unwrap();
    let (status, headers, body) = get(app_for(dir.path(), &[], true), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Client Environment"));
    assert!(html.contains("Server Connectivity"));
    assert!(html.contains("Connected"));
    assert!(html.contains("User Agent: integration-test"));
    assert!(html.contains("=== SERVER RESPONSE ==="));
    assert!(html.contains("/assets/viewer.js"));
}

#[tokio::test]
async fn viewer_script_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let (status, headers, body) =
        get(app_for(dir.path(), &[], true), "/assets/viewer.js").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    let script = String::from_utf8(body).unwrap();
    assert!(script.contains("addEventListener(\"error\""));
    assert!(script.contains("DOMContentLoaded"));
    assert!(script.contains("/api/viewer/refresh"));
    // client lines go to the end of the log section, not above its header
    assert!(script.contains("parts.logs += line"));
    assert!(!script.contains("line + \"\\n\" + report.value"));
    // Clear Logs keeps the section headers and the state summary
    assert!(script.contains("parts.logs = \"\""));
    assert!(script.contains("parts.server = \"\""));
    assert!(!script.contains("report.value = \"\""));
}

#[tokio::test]
async fn page_refresh_keeps_earlier_log_lines() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(dir.path(), &[], true);

    let (status, _, body) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains(r#"<button id="refresh" type="button">"#));
    assert!(!html.contains(r#"href="/">Refresh"#));

    let mut first = embedded_state(&html);
    let client_line = serde_json::json!("[2025-01-01T00:00:00.000Z] 🌐 Client-side script executing in browser");
    first["logs"].as_array_mut().unwrap().push(client_line.clone());
    let first_logs = first["logs"].as_array().unwrap().clone();
    assert_eq!(fetch_count(&first_logs), 1);

    let (status, reply) = post_json(app.clone(), "/api/viewer/refresh", &first).await;
    assert_eq!(status, StatusCode::OK);
    let second_logs = reply["state"]["logs"].as_array().unwrap().clone();
    assert_eq!(&second_logs[..first_logs.len()], &first_logs[..]);
    assert_eq!(fetch_count(&second_logs), 2);
    assert!(second_logs.contains(&client_line));

    let text = reply["report"]["text"].as_str().unwrap();
    for line in &first_logs {
        assert!(text.contains(line.as_str().unwrap()));
    }
    assert_eq!(text.matches("=== SERVER RESPONSE ===").count(), 1);
    assert_eq!(reply["report"]["cards"][1]["status"], "Connected");
    assert_eq!(reply["state"]["serverSnapshot"]["success"], true);

    let (_, again) = post_json(app, "/api/viewer/refresh", &reply["state"]).await;
    let third_logs = again["state"]["logs"].as_array().unwrap();
    assert_eq!(&third_logs[..second_logs.len()], &second_logs[..]);
    assert_eq!(fetch_count(third_logs), 3);
}

#[tokio::test]
async fn page_refresh_is_gated_by_config() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = post_json(
        app_for(dir.path(), &[], false),
        "/api/viewer/refresh",
        &serde_json::json!({ "logs": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn http_transport_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(dir.path(), &[], true);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let transport = HttpTransport::new(format!("http://{}/api/diagnostics", addr)).unwrap();
    let response = transport.fetch().await.unwrap();

    assert_eq!(response.status, 200);
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["diagnostics"]["requestHeaders"]["user-agent"]
        .as_str()
        .unwrap()
        .starts_with("diagnostics-viewer/"));
}
