//! HTTP behavior of the JSON-RPC client against a one-shot local server.

use bitcoin_tui::{
    error::RpcError,
    rpc::{RpcClient, RpcConfig, RpcTransport},
};
use serde_json::json;
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Answer a single request with `status` and `body`; the task yields the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    let task = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let request = read_request(&mut sock).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
        request
    });
    (url, task)
}

async fn read_request(sock: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = sock.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client(url: String) -> RpcClient {
    RpcClient::new(RpcConfig {
        url,
        user: "alice".into(),
        password: "secret".into(),
        timeout: Duration::from_secs(5),
    })
}

#[tokio::test]
async fn ok_response_yields_result() {
    let (url, server) = serve_once("200 OK", r#"{"result":884231,"error":null,"id":1}"#).await;
    let result = client(url).call("getblockcount", json!([])).await.unwrap();
    assert_eq!(result, json!(884231));

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(lower.starts_with("post / "));
    // alice:secret
    assert!(lower.contains("authorization: basic ywxpy2u6c2vjcmv0"));
    assert!(request.contains(r#""jsonrpc":"1.1""#));
    assert!(request.contains(r#""method":"getblockcount""#));
}

#[tokio::test]
async fn unauthorized_maps_to_auth() {
    let (url, _server) = serve_once("401 Unauthorized", "").await;
    let err = client(url).call("getblockcount", json!([])).await.unwrap_err();
    assert_eq!(err, RpcError::Auth);
}

#[tokio::test]
async fn server_error_body_is_decoded() {
    let (url, _server) = serve_once(
        "500 Internal Server Error",
        r#"{"result":null,"error":{"code":-8,"message":"Block height out of range"},"id":1}"#,
    )
    .await;
    let err = client(url)
        .call("getblockhash", json!([99999999]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RpcError::Protocol {
            code: -8,
            message: "Block height out of range".into()
        }
    );
}

#[tokio::test]
async fn unexpected_status_is_transport_error() {
    let (url, _server) = serve_once("404 Not Found", "").await;
    let err = client(url).call("getblockcount", json!([])).await.unwrap_err();
    assert_eq!(err, RpcError::Transport("HTTP 404".into()));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = client(url).call("getblockcount", json!([])).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)), "{err:?}");
}
