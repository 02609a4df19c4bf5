//! Daemon mode – minimal JSON-RPC-ish protocol over Unix socket.
//!
//! Sessions live in the daemon's [`AppContext`] and survive across
//! connections until closed or until the daemon exits.

use anyhow::Context;
use calc_engine::types::*;
use calc_engine::{AppContext, CommandRegistry};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_daemon(
    socket_path: PathBuf,
    ctx: AppContext,
    registry: CommandRegistry,
) -> anyhow::Result<()> {
    // Remove stale socket if it exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("cannot bind socket {}", socket_path.display()))?;

    tracing::info!(socket = %socket_path.display(), "calcctl daemon listening");

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                tracing::debug!("client connected");
                let (reader, mut writer) = stream.into_split();
                let mut lines = BufReader::new(reader).lines();

                while let Ok(Some(line)) = lines.next_line().await {
                    let response = handle_request(&line, &ctx, &registry);
                    let mut resp_json =
                        serde_json::to_string(&response).unwrap_or_else(|_| "{}".into());
                    resp_json.push('\n');
                    if writer.write_all(resp_json.as_bytes()).await.is_err() {
                        break;
                    }
                }
                tracing::debug!(sessions = ctx.session_count(), "client disconnected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

fn error_response(id: String, message: String) -> DaemonResponse {
    DaemonResponse {
        id,
        result: None,
        error: Some(ErrorInfo {
            code: ErrorCode::InvalidInput,
            message,
            details: serde_json::Value::Null,
        }),
        commands: None,
    }
}

fn handle_request(line: &str, ctx: &AppContext, registry: &CommandRegistry) -> DaemonResponse {
    let req: DaemonRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return error_response("unknown".into(), format!("invalid JSON request: {}", e));
        }
    };

    match req.method.as_str() {
        "call" => {
            let cmd_name = req.params.get("cmd").and_then(|v| v.as_str()).unwrap_or("");
            let args = req
                .params
                .get("args")
                .cloned()
                .unwrap_or(serde_json::Value::Object(Default::default()));
            DaemonResponse {
                id: req.id,
                result: Some(registry.execute(cmd_name, args, ctx)),
                error: None,
                commands: None,
            }
        }
        "list" => DaemonResponse {
            id: req.id,
            result: None,
            error: None,
            commands: Some(registry.list().into_iter().map(String::from).collect()),
        },
        other => {
            let message = format!("unknown method: {}", other);
            error_response(req.id, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(ctx: &AppContext, reg: &CommandRegistry, id: &str, cmd: &str, args: serde_json::Value) -> DaemonResponse {
        let line = json!({ "id": id, "method": "call", "params": { "cmd": cmd, "args": args } });
        handle_request(&line.to_string(), ctx, reg)
    }

    #[test]
    fn test_session_survives_requests() {
        let ctx = AppContext::new();
        let reg = CommandRegistry::new();

        let opened = call(&ctx, &reg, "1", "session_open", json!({}));
        let data = opened.result.unwrap().data.unwrap();
        let session = data["session_id"].as_str().unwrap().to_string();

        call(&ctx, &reg, "2", "press", json!({ "keys": "5+3", "session_id": session }));
        let resp = call(&ctx, &reg, "3", "press", json!({ "keys": "=", "session_id": session }));
        assert_eq!(resp.id, "3");
        let result = resp.result.unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.data.unwrap()["display"], "8");
    }

    #[test]
    fn test_list_method() {
        let ctx = AppContext::new();
        let reg = CommandRegistry::new();
        let resp = handle_request(r#"{"id":"a","method":"list"}"#, &ctx, &reg);
        let commands = resp.commands.unwrap();
        assert!(commands.contains(&"press".to_string()));
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_bad_requests() {
        let ctx = AppContext::new();
        let reg = CommandRegistry::new();

        let resp = handle_request("not json", &ctx, &reg);
        assert_eq!(resp.id, "unknown");
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidInput);

        let resp = handle_request(r#"{"id":"b","method":"shutdown"}"#, &ctx, &reg);
        assert_eq!(resp.id, "b");
        assert!(resp.error.unwrap().message.contains("shutdown"));
    }
}
