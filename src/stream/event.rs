//! Frame interpretation: raw frames to typed domain events.
//!
//! Payloads are JSON; a payload that fails to parse is replaced with an
//! empty object and logged, never propagated. Event types outside the
//! recognized set are ignored.

use serde_json::{Map, Value};
use tracing::warn;

use super::decoder::RawFrame;
use crate::models::University;

/// Fixed user-facing strings shared across the session lifecycle.
pub mod messages {
    /// Fallback when an `error` frame carries no message of its own.
    pub const STREAM_ERROR: &str = "検索処理でエラーが発生しました。";

    /// Non-success response or unusable body from the backend.
    pub const BAD_RESPONSE: &str = "検索APIから正しいレスポンスが得られませんでした。";

    /// Any other request or read failure.
    pub const SEARCH_FAILED: &str = "検索に失敗しました。バックエンドAPIを設定してください。";

    /// Shown before the first frame arrives.
    pub const PREPARING: &str = "検索の準備をしています...";
}

/// Derived, never-persisted description of the backend's current stage.
///
/// `message` is always set. `current`/`total` are set only for the
/// sub-progress-bearing stages (`searching`, `filtering`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub stage: String,
    pub message: String,
    pub current: Option<u64>,
    pub total: Option<u64>,
}

impl ProgressState {
    /// The state shown while a session is starting, before any frame lands.
    pub fn preparing() -> Self {
        Self {
            stage: "initializing".to_string(),
            message: messages::PREPARING.to_string(),
            current: None,
            total: None,
        }
    }
}

/// A classified stream event.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A `progress` frame with a `stage` field.
    Progress(ProgressState),
    /// A `result` frame carrying one university record.
    Result {
        university: University,
        index: Option<u64>,
        total: Option<u64>,
    },
    /// The backend finished the pipeline.
    Complete,
    /// A well-formed error frame; the stream keeps going afterwards.
    StreamError { message: String },
}

/// Map a raw frame to a domain event. Returns `None` for unrecognized event
/// types and for recognized types missing their required payload field.
pub fn interpret(frame: &RawFrame) -> Option<SearchEvent> {
    let payload = parse_payload(&frame.data);

    match frame.event.as_str() {
        "progress" => {
            let stage = payload.get("stage").and_then(Value::as_str)?;
            Some(SearchEvent::Progress(describe_stage(stage, &payload)))
        }
        "result" => {
            let university = payload.get("university")?;
            let university: University = match serde_json::from_value(university.clone()) {
                Ok(university) => university,
                Err(err) => {
                    warn!(error = %err, "dropping result frame with malformed record");
                    return None;
                }
            };
            Some(SearchEvent::Result {
                university,
                index: payload_u64(&payload, "index"),
                total: payload_u64(&payload, "total"),
            })
        }
        "complete" => Some(SearchEvent::Complete),
        "error" => {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| messages::STREAM_ERROR.to_string());
            Some(SearchEvent::StreamError { message })
        }
        _ => None,
    }
}

/// Build the user-facing progress description for a stage.
///
/// Stages in canonical arrival order: initializing, model_selected,
/// query_built, searching, search_complete, summarizing, summarize_complete,
/// filtering, filter_complete, completed. Unknown stages fall back to a
/// generic running message with the stage preserved.
pub fn describe_stage(stage: &str, payload: &Value) -> ProgressState {
    let plain = |message: String| ProgressState {
        stage: stage.to_string(),
        message,
        current: None,
        total: None,
    };

    match stage {
        "initializing" => plain(messages::PREPARING.to_string()),
        "model_selected" => {
            let model = payload.get("model").and_then(Value::as_str).unwrap_or("不明");
            plain(format!("AIモデルを選択しました: {model}"))
        }
        "query_built" => plain(
            "検索クエリを生成しました。信頼できるサイトから結果を取得します。".to_string(),
        ),
        "searching" => {
            let (current, total) = sub_progress(payload);
            let query = payload.get("query").and_then(Value::as_str).unwrap_or("");
            ProgressState {
                stage: stage.to_string(),
                message: format!("検索 {current} / {total} 件目 ({query})"),
                current: Some(current),
                total: Some(total),
            }
        }
        "search_complete" => {
            let results = payload_u64(payload, "results").unwrap_or(0);
            plain(format!(
                "検索ステップが完了しました。{results} 件の情報源を解析します。"
            ))
        }
        "summarizing" => {
            let sources = payload_u64(payload, "sources").unwrap_or(0);
            plain(format!("AIが{sources}件の情報を要約しています..."))
        }
        "summarize_complete" => {
            plain("要約が完了しました。結果を整理しています。".to_string())
        }
        "filtering" => {
            let (current, total) = sub_progress(payload);
            ProgressState {
                stage: stage.to_string(),
                message: format!("検索条件の確認中... ({current} / {total})"),
                current: Some(current),
                total: Some(total),
            }
        }
        "filter_complete" => {
            let filtered = payload_u64(payload, "filtered").unwrap_or(0);
            plain(format!(
                "条件確認が完了しました。{filtered}件の大学が条件に合致しました。"
            ))
        }
        "completed" => plain("検索が完了しました。".to_string()),
        _ => plain("検索を実行しています...".to_string()),
    }
}

/// Short badge label for a stage; unknown stages read as generic processing.
pub fn stage_label(stage: &str) -> &'static str {
    match stage {
        "initializing" => "準備中",
        "model_selected" => "モデル選択",
        "query_built" => "クエリ生成",
        "searching" => "検索中",
        "search_complete" => "検索完了",
        "summarizing" => "要約生成中",
        "summarize_complete" => "要約完了",
        "filtering" => "条件確認中",
        "filter_complete" => "確認完了",
        "completed" => "完了",
        _ => "処理中",
    }
}

/// Sub-progress pair with defaults that keep ratios well-defined: current
/// defaults to 0 and total to 1.
fn sub_progress(payload: &Value) -> (u64, u64) {
    let current = payload_u64(payload, "current").unwrap_or(0);
    let total = payload_u64(payload, "total").unwrap_or(0).max(1);
    (current, total)
}

/// Extract a numeric field, tolerating backends that quote their numbers.
fn payload_u64(payload: &Value, key: &str) -> Option<u64> {
    match payload.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_payload(data: &str) -> Value {
    if data.is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str(data) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, payload = %data, "failed to parse event payload; treating as empty");
            Value::Object(Map::new())
        }
    }
}
