//! 出站规整（Normalizer）
//!
//! 把任意 JSON 值修复成类型完整的 PlanArtifact，永不失败：
//! 必填字段不合法的实体整条丢弃；可选/枚举字段越界则改写为默认值；缺 id 时补一个新 token。

use serde_json::{Map, Value};

use crate::agent::types::{
    PlanArtifact, Reference, Signal, SignalKind, Step, Task, TaskCategory, TaskStatus,
    DEFAULT_PLAYBOOK,
};

/// 载荷不是对象时的固定回复
pub const FALLBACK_REPLY: &str =
    "Processed the request, but the response payload looked unfamiliar. Try again.";
/// 缺 title 的步骤使用的标题
pub const DEFAULT_STEP_TITLE: &str = "Execution step";
/// confidence 不是数字时的取值
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
/// href 缺失时的取值
pub const DEFAULT_HREF: &str = "#";

/// 载荷不是对象时返回的兜底 artifact
pub fn fallback_artifact() -> PlanArtifact {
    PlanArtifact {
        summary: String::new(),
        reply: FALLBACK_REPLY.to_string(),
        steps: Vec::new(),
        tasks: Vec::new(),
        signals: Vec::new(),
        references: Vec::new(),
        playbook: DEFAULT_PLAYBOOK.to_string(),
    }
}

/// 规整任意值为 PlanArtifact
pub fn normalize(payload: &Value) -> PlanArtifact {
    let Value::Object(fields) = payload else {
        tracing::warn!("artifact payload is not an object, using fallback");
        return fallback_artifact();
    };

    PlanArtifact {
        summary: text_field(fields, "summary").unwrap_or_default(),
        reply: text_field(fields, "reply").unwrap_or_default(),
        steps: collect(fields, "steps", normalize_step),
        tasks: collect(fields, "tasks", normalize_task),
        signals: collect(fields, "signals", normalize_signal),
        references: collect(fields, "references", normalize_reference),
        playbook: text_field(fields, "playbook").unwrap_or_else(|| DEFAULT_PLAYBOOK.to_string()),
    }
}

/// 生成进程内唯一的 id：前缀 + uuid v4 的前 8 位
pub fn generate_id(prefix: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &token[..8])
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn id_field(fields: &Map<String, Value>, prefix: &str) -> String {
    text_field(fields, "id").unwrap_or_else(|| generate_id(prefix))
}

/// 非数组视为空；每个元素独立校验，失败的丢弃并计数
fn collect<T>(
    fields: &Map<String, Value>,
    key: &str,
    normalize_one: fn(&Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    let Some(Value::Array(items)) = fields.get(key) else {
        return Vec::new();
    };
    let out: Vec<T> = items
        .iter()
        .filter_map(|item| item.as_object().and_then(normalize_one))
        .collect();
    let dropped = items.len() - out.len();
    if dropped > 0 {
        tracing::debug!(field = key, dropped, "dropped invalid artifact entries");
    }
    out
}

fn normalize_step(fields: &Map<String, Value>) -> Option<Step> {
    let detail = text_field(fields, "detail").filter(|d| !d.is_empty())?;
    Some(Step {
        id: id_field(fields, "step"),
        title: text_field(fields, "title").unwrap_or_else(|| DEFAULT_STEP_TITLE.to_string()),
        detail,
    })
}

fn normalize_task(fields: &Map<String, Value>) -> Option<Task> {
    let title = text_field(fields, "title").filter(|t| !t.is_empty())?;
    let category = fields
        .get("category")
        .and_then(Value::as_str)
        .and_then(TaskCategory::parse)
        .unwrap_or(TaskCategory::Planning);
    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(TaskStatus::parse)
        .unwrap_or(TaskStatus::Pending);
    let confidence = fields
        .get("confidence")
        .and_then(Value::as_f64)
        .map(clamp_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    Some(Task {
        id: id_field(fields, "task"),
        title,
        description: text_field(fields, "description"),
        category,
        status,
        confidence,
        due: text_field(fields, "due"),
    })
}

fn normalize_signal(fields: &Map<String, Value>) -> Option<Signal> {
    let message = text_field(fields, "message").filter(|m| !m.is_empty())?;
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .and_then(SignalKind::parse)
        .unwrap_or(SignalKind::Insight);
    Some(Signal {
        id: id_field(fields, "signal"),
        kind,
        message,
    })
}

fn normalize_reference(fields: &Map<String, Value>) -> Option<Reference> {
    let label = text_field(fields, "label").filter(|l| !l.is_empty())?;
    Some(Reference {
        id: id_field(fields, "ref"),
        label,
        href: text_field(fields, "href").unwrap_or_else(|| DEFAULT_HREF.to_string()),
    })
}

/// 截断到 [0, 1]，边界值原样保留
pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_gets_fallback() {
        for payload in [Value::Null, json!("text"), json!([1, 2]), json!(3)] {
            let artifact = normalize(&payload);
            assert_eq!(artifact, fallback_artifact());
        }
        assert_eq!(fallback_artifact().playbook, "General Partner");
        assert!(!fallback_artifact().reply.is_empty());
    }

    #[test]
    fn test_top_level_text_defaults() {
        let artifact = normalize(&json!({ "summary": 1, "playbook": null, "steps": "x" }));
        assert_eq!(artifact.summary, "");
        assert_eq!(artifact.reply, "");
        assert_eq!(artifact.playbook, DEFAULT_PLAYBOOK);
        assert!(artifact.steps.is_empty());
        assert!(artifact.tasks.is_empty());
    }

    #[test]
    fn test_required_fields_drop_entities() {
        let artifact = normalize(&json!({
            "steps": [
                { "id": "s1", "title": "Keep", "detail": "has detail" },
                { "id": "s2", "title": "Drop", "detail": "" },
                { "id": "s3", "title": "Drop" },
                "not an object"
            ],
            "tasks": [{ "title": "" }, { "title": "Real task" }],
            "signals": [{ "message": "" }, { "type": "warning", "message": "watch out" }],
            "references": [{ "href": "https://x" }, { "label": "Doc" }]
        }));
        assert_eq!(artifact.steps.len(), 1);
        assert_eq!(artifact.steps[0].id, "s1");
        assert_eq!(artifact.tasks.len(), 1);
        assert_eq!(artifact.signals.len(), 1);
        assert_eq!(artifact.signals[0].kind, SignalKind::Warning);
        assert_eq!(artifact.references.len(), 1);
        assert_eq!(artifact.references[0].href, DEFAULT_HREF);
    }

    #[test]
    fn test_optional_fields_repaired() {
        let artifact = normalize(&json!({
            "steps": [{ "detail": "do it", "title": 9 }],
            "tasks": [{
                "title": "Audit pricing",
                "category": "marketing",
                "status": "blocked",
                "confidence": "high",
                "description": 5,
                "due": false
            }],
            "signals": [{ "type": "alert", "message": "m" }]
        }));
        let step = &artifact.steps[0];
        assert_eq!(step.title, DEFAULT_STEP_TITLE);
        assert!(step.id.starts_with("step-"));

        let task = &artifact.tasks[0];
        assert_eq!(task.category, TaskCategory::Planning);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(task.description, None);
        assert_eq!(task.due, None);
        assert!(task.id.starts_with("task-"));

        assert_eq!(artifact.signals[0].kind, SignalKind::Insight);
        assert!(artifact.signals[0].id.starts_with("signal-"));
    }

    #[test]
    fn test_confidence_clamp() {
        let artifact = normalize(&json!({
            "tasks": [
                { "title": "a", "confidence": 1.5 },
                { "title": "b", "confidence": -0.2 },
                { "title": "c", "confidence": 1 },
                { "title": "d", "confidence": 0 },
                { "title": "e", "confidence": 0.37 }
            ]
        }));
        let values: Vec<f64> = artifact.tasks.iter().map(|t| t.confidence).collect();
        assert_eq!(values, vec![1.0, 0.0, 1.0, 0.0, 0.37]);
    }

    #[test]
    fn test_backfilled_ids_are_unique() {
        let artifact = normalize(&json!({
            "references": [{ "label": "a" }, { "label": "b" }, { "label": "c" }]
        }));
        let mut ids: Vec<&str> = artifact.references.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| id.starts_with("ref-") && id.len() == 12));
    }

    #[test]
    fn test_well_formed_artifact_round_trips() {
        let original = crate::agent::plan("Plan a 30-day go-to-market for a B2B SaaS beta", &[]);
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(normalize(&value), original);
    }
}
