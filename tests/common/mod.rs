//! Shared utilities for integration testing.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// JSON-RPC error returned by a mock handler: (code, message).
pub type RpcFailure = (i64, String);

/// Start a programmable JSON-RPC node on an ephemeral port.
///
/// `handler` receives the method name and params of every request and
/// returns either a `result` value or an error.
pub async fn start_rpc_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let _ = serve_connection(socket, handler).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_connection<F>(socket: TcpStream, handler: Arc<F>) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync + 'static,
{
    let mut reader = BufReader::new(socket);

    // Keep-alive: serve requests until the client hangs up
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let mut content_length = 0usize;
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }
            if line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        let method = request["method"].as_str().unwrap_or_default();
        let response = match handler(method, &request["params"]) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
        };

        let payload = response.to_string();
        let http = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            payload.len(),
            payload
        );
        reader.get_mut().write_all(http.as_bytes()).await?;
    }
}

/// A receipt for a successful contract creation mined in `block_number`.
pub fn receipt_json(tx_hash: &str, block_number: u64) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "ab".repeat(32)),
        "blockNumber": format!("{:#x}", block_number),
        "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "to": null,
        "cumulativeGasUsed": "0x1d4c0",
        "gasUsed": "0x1d4c0",
        "effectiveGasPrice": "0x5",
        "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "type": "0x0",
        "status": "0x1"
    })
}

/// Path of a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}
