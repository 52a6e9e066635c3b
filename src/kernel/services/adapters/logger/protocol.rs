//! 日志服务的客户端/服务端协议（JSON lines）
//!
//! 请求：`{"id": 1, "method": "setLogLevel", "params": {"name": "root", "level": 20}}`
//! 响应：`{"id": 1, "result": ...}` 或 `{"id": 1, "error": {"message": ...}}`
//! 推送：`{"method": "onLogLevelChanged", "params": {"name", "oldLevel", "newLevel"}}`

use super::registry::LoggerRegistry;
use crate::kernel::services::ports::logger::{LogLevel, LogLevelChangedEvent, LoggerClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::mpsc::Sender;

pub const LEVEL_CHANGED_METHOD: &str = "onLogLevelChanged";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct NameParams {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SetLevelParams {
    name: String,
    level: LogLevel,
}

#[derive(Debug, Deserialize)]
struct LogParams {
    name: String,
    level: i64,
    message: String,
    #[serde(default)]
    args: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                message: message.into(),
            }),
        }
    }

    fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"id":null,"error":{{"message":"failed to encode response: {e}"}}}}"#)
        })
    }
}

#[derive(Debug, Serialize)]
struct Notification<'a> {
    method: &'static str,
    params: &'a LogLevelChangedEvent,
}

pub fn notification_line(event: &LogLevelChangedEvent) -> String {
    let notification = Notification {
        method: LEVEL_CHANGED_METHOD,
        params: event,
    };
    serde_json::to_string(&notification).unwrap_or_default()
}

/// 把级别变化推送给已连接客户端的输出通道
pub struct ChannelClient {
    tx: Sender<String>,
}

impl ChannelClient {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl LoggerClient for ChannelClient {
    fn on_log_level_changed(&self, event: &LogLevelChangedEvent) {
        let _ = self.tx.send(notification_line(event));
    }
}

fn params<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("invalid params: {e}"))
}

/// Handles one request line and returns the response line. Malformed input
/// yields an error response with a null id.
pub fn handle_line(registry: &mut LoggerRegistry, line: &str) -> String {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::err(Value::Null, format!("malformed request: {e}")).to_line(),
    };
    let id = request.id.clone();
    match dispatch(registry, request) {
        Ok(result) => Response::ok(id, result),
        Err(message) => {
            tracing::debug!(error = %message, "log server request failed");
            Response::err(id, message)
        }
    }
    .to_line()
}

fn dispatch(registry: &mut LoggerRegistry, request: Request) -> Result<Value, String> {
    match request.method.as_str() {
        "createLogger" => {
            let p: NameParams = params(request.params)?;
            registry.create(&p.name).map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        "getLogLevel" => {
            let p: NameParams = params(request.params)?;
            let level = registry.get(&p.name).map_err(|e| e.to_string())?;
            Ok(Value::from(level.severity()))
        }
        "setLogLevel" => {
            let p: SetLevelParams = params(request.params)?;
            registry.set(&p.name, p.level).map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        "log" => {
            let p: LogParams = params(request.params)?;
            registry
                .log(&p.name, p.level, &p.message, &p.args)
                .map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        "getRootName" => Ok(Value::from(registry.root_name())),
        other => Err(format!("unknown method '{other}'")),
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/logger/protocol.rs"]
mod tests;
