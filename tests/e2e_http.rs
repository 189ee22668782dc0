//! End-to-end HTTP tests.
//!
//! These run the blocking reqwest transport against a real axum server on
//! loopback, serving the reply encodings a GLPI server can produce.

use std::io::{Read, Write};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::RawQuery,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use glpi::codec::{Compression, CompressionMode, GzipCommand};
use glpi::config::ServerConfig;
use glpi::{GlpiClient, GlpiError, OutboundMessage, Parameters, ReqwestTransport};
use serde_json::{json, Value};
use tokio::runtime::Runtime;

/// Decode a request body according to its advertised content type
fn request_text(headers: &HeaderMap, body: &[u8]) -> String {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mut text = String::new();
    match content_type {
        "application/x-compress-zlib" => {
            flate2::read::ZlibDecoder::new(body)
                .read_to_string(&mut text)
                .unwrap();
        },
        "application/x-compress-gzip" => {
            flate2::read::GzDecoder::new(body)
                .read_to_string(&mut text)
                .unwrap();
        },
        _ => text = String::from_utf8_lossy(body).into_owned(),
    }
    text
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Echo the query string back as JSON
async fn json_handler(RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({"status": "ok", "query": query}))
}

/// Answer a PROLOG in zlib, echoing the device id
async fn zlib_handler(headers: HeaderMap, body: Bytes) -> Vec<u8> {
    let text = request_text(&headers, &body);
    let deviceid = text
        .split("<DEVICEID>")
        .nth(1)
        .and_then(|rest| rest.split("</DEVICEID>").next())
        .unwrap_or_default()
        .to_string();

    zlib(format!("<REPLY><DEVICEID>{deviceid}</DEVICEID><RESPONSE>SEND</RESPONSE></REPLY>").as_bytes())
}

/// Answer in gzip behind some leading noise
async fn gzip_handler() -> Vec<u8> {
    let mut reply = b"\r\n\r\n".to_vec();
    reply.extend(gzip(b"<REPLY><PROLOG_FREQ>24</PROLOG_FREQ></REPLY>"));
    reply
}

fn test_router() -> Router {
    Router::new()
        .route("/plugins/glpiinventory/", get(json_handler))
        .route("/ocs/zlib", post(zlib_handler))
        .route("/ocs/gzip", post(gzip_handler))
        .route(
            "/ocs/html",
            post(|| async { "<html></html><REPLY><ERROR>Agent not allowed</ERROR></REPLY>" }),
        )
        .route("/ocs/empty", post(|| async { "" }))
        .route(
            "/ocs/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<REPLY/>") }),
        )
}

/// Serve the test router on a background runtime; returns its base URL
fn serve() -> (Runtime, String) {
    let runtime = Runtime::new().unwrap();
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();

    runtime.spawn(async move {
        let _ = axum::serve(listener, test_router()).await;
    });

    (runtime, format!("http://{addr}"))
}

fn client(mode: CompressionMode) -> GlpiClient<ReqwestTransport> {
    let config = ServerConfig {
        timeout_secs: 10,
        ..Default::default()
    };
    GlpiClient::new(ReqwestTransport::new(&config).unwrap())
        .with_compression(Compression::forced(mode, GzipCommand::default()))
}

#[test]
fn test_json_over_http() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::None);

    let params = Parameters::new("getJobs")
        .with("machineid", "host 1")
        .with("task", vec!["inventory", ""]);
    let reply = client
        .send_json(&format!("{base}/plugins/glpiinventory/"), &params)
        .unwrap();

    assert_eq!(reply["status"], "ok");
    assert_eq!(
        reply["query"],
        "action=getJobs&machineid=host%201&task[]=inventory&task[]="
    );
}

#[cfg(feature = "zlib")]
#[test]
fn test_prolog_over_http_zlib() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::DeflateInProcess);

    let envelope = OutboundMessage::prolog("host-2024-06-01-10-00-00").to_xml();
    let reply = client.send_xml(&format!("{base}/ocs/zlib"), &envelope).unwrap();

    assert_eq!(
        reply,
        json!({"DEVICEID": "host-2024-06-01-10-00-00", "RESPONSE": "SEND"})
    );
}

#[test]
fn test_plain_request_gzip_reply() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::None);

    // Reply encoding is the server's choice, whatever the request used
    let result = client.send_xml(&format!("{base}/ocs/gzip"), "<REQUEST/>");
    if cfg!(feature = "zlib") || GzipCommand::default().is_runnable() {
        assert_eq!(result.unwrap(), json!({"PROLOG_FREQ": "24"}));
    } else {
        assert!(matches!(result, Err(GlpiError::Decompression(_))));
    }
}

#[test]
fn test_html_wrapped_reply() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::None);

    let reply = client
        .send_xml(&format!("{base}/ocs/html"), "<REQUEST/>")
        .unwrap();
    assert_eq!(reply, json!({"ERROR": "Agent not allowed"}));
}

#[test]
fn test_empty_reply() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::None);

    let result = client.send_xml(&format!("{base}/ocs/empty"), "<REQUEST/>");
    assert!(matches!(result, Err(GlpiError::EmptyResponse)));
}

#[test]
fn test_server_error_status() {
    let (_runtime, base) = serve();
    let client = client(CompressionMode::None);

    let result = client.send_xml(&format!("{base}/ocs/broken"), "<REQUEST/>");
    assert!(matches!(result, Err(GlpiError::HttpStatus { status: 500 })));
}

#[test]
fn test_unreachable_server() {
    let (runtime, base) = serve();
    runtime.shutdown_timeout(Duration::from_secs(1));
    let client = client(CompressionMode::None);

    let result = client.send_json(&base, &Parameters::new("getConfig"));
    assert!(matches!(result, Err(GlpiError::Transport(_))));
}
