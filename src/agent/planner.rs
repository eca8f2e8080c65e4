//! 规划引擎：plan(input, history) → PlanArtifact
//!
//! 纯函数，无副作用、无 I/O、无随机性。执行顺序：分类 → 步骤 → 任务 → 信号 → 参考 → 摘要与回复。
//! id 由 playbook slug + 序号派生，在同一 artifact 内唯一。

use crate::memory::{Message, Role};

use super::extract::{MissionText, SalientTerms};
use super::playbook::{classify, Classification, PlaybookKind, PlaybookSpec, Requirement};
use super::types::{
    PlanArtifact, Reference, Signal, SignalKind, Step, Task, TaskStatus,
};

/// 单个 artifact 中的上限
const MAX_STEPS: usize = 6;
const MAX_TASKS: usize = 5;
const MAX_SIGNALS: usize = 4;
const MAX_REFERENCES: usize = 4;
/// 每次 playbook 命中给置信度的加成，最多按 10 分计
const SCORE_BONUS: f64 = 0.04;
const SCORE_BONUS_CAP: u32 = 10;
/// 每个任务专属词命中的加成，最多计 2 个
const BOOSTER_BONUS: f64 = 0.1;
const BOOSTER_CAP: usize = 2;
const MAX_CONFIDENCE: f64 = 0.95;

/// 根据任务文本与最近对话生成完整计划；对任意非空输入都返回完整 artifact
pub fn plan(input: &str, history: &[Message]) -> PlanArtifact {
    let text = MissionText::new(input);
    let terms = SalientTerms::extract(input);
    let classification = classify(&text);
    let spec = classification.spec;

    tracing::debug!(
        playbook = spec.kind.label(),
        score = classification.score,
        matched = ?classification.matched,
        "mission classified"
    );

    let steps = build_steps(spec, &terms);
    let tasks = build_tasks(spec, &classification, &text, &terms);
    let signals = build_signals(spec, &terms, &text, history);
    let references = build_references(spec);
    let summary = compose_summary(&classification, steps.len(), tasks.len());
    let reply = compose_reply(spec, &terms, &steps, &tasks, &signals, history);

    PlanArtifact {
        summary,
        reply,
        steps,
        tasks,
        signals,
        references,
        playbook: spec.kind.label().to_string(),
    }
}

fn build_steps(spec: &PlaybookSpec, terms: &SalientTerms) -> Vec<Step> {
    spec.steps
        .iter()
        .take(MAX_STEPS)
        .enumerate()
        .map(|(i, template)| Step {
            id: format!("{}-step-{}", spec.kind.slug(), i + 1),
            title: template.title.to_string(),
            detail: terms.fill(template.detail),
        })
        .filter(|step| !step.detail.trim().is_empty())
        .collect()
}

/// 置信度：基础值 + playbook 命中强度 + 任务专属词命中数，截断到 [0, 0.95] 并保留两位小数
fn confidence_for(base: f64, score: u32, booster_hits: usize) -> f64 {
    let raw = base
        + SCORE_BONUS * f64::from(score.min(SCORE_BONUS_CAP))
        + BOOSTER_BONUS * booster_hits.min(BOOSTER_CAP) as f64;
    let clamped = raw.clamp(0.0, MAX_CONFIDENCE);
    (clamped * 100.0).round() / 100.0
}

/// 截止日期：有天数时按比例换算为 "Day N"；只有文字说法（Q3、by Friday）时仅落在最后一个任务上
fn due_for(terms: &SalientTerms, fraction: f64) -> Option<String> {
    let timeframe = terms.timeframe.as_ref()?;
    match timeframe.days {
        Some(days) => {
            let day = (f64::from(days) * fraction).ceil().max(1.0) as u32;
            Some(format!("Day {}", day))
        }
        None if fraction >= 1.0 => Some(timeframe.label.clone()),
        None => None,
    }
}

fn build_tasks(
    spec: &PlaybookSpec,
    classification: &Classification,
    text: &MissionText,
    terms: &SalientTerms,
) -> Vec<Task> {
    spec.tasks
        .iter()
        .take(MAX_TASKS)
        .enumerate()
        .map(|(i, template)| {
            let hits = template
                .boosters
                .iter()
                .filter(|b| text.contains(b))
                .count();
            Task {
                id: format!("{}-task-{}", spec.kind.slug(), i + 1),
                title: template.title.to_string(),
                description: Some(template.description.to_string()),
                category: template.category,
                status: TaskStatus::Pending,
                confidence: confidence_for(template.base_confidence, classification.score, hits),
                due: due_for(terms, template.due_fraction),
            }
        })
        .collect()
}

fn requirement_met(requirement: &Requirement, terms: &SalientTerms, text: &MissionText) -> bool {
    match requirement {
        Requirement::Timeframe => terms.timeframe.is_some(),
        Requirement::Audience => terms.audience.is_some(),
        Requirement::AnyOf(phrases) => text.contains_any(phrases),
    }
}

/// 历史中与当前 playbook 相同的用户消息数（默认 playbook 不计）
fn prior_engagement(kind: PlaybookKind, history: &[Message]) -> usize {
    if kind.is_default() {
        return 0;
    }
    history
        .iter()
        .filter(|m| m.role == Role::User)
        .filter(|m| classify(&MissionText::new(&m.content)).kind() == kind)
        .count()
}

fn build_signals(
    spec: &PlaybookSpec,
    terms: &SalientTerms,
    text: &MissionText,
    history: &[Message],
) -> Vec<Signal> {
    let label = spec.kind.label();
    let mut drafts: Vec<(SignalKind, String)> = vec![(SignalKind::Insight, spec.insight.to_string())];

    for prerequisite in spec.prerequisites {
        if !requirement_met(&prerequisite.requirement, terms, text) {
            drafts.push((SignalKind::Warning, prerequisite.warning.to_string()));
        }
    }

    if prior_engagement(spec.kind, history) > 0 {
        drafts.push((
            SignalKind::Success,
            format!(
                "Momentum: this conversation keeps returning to {}; context carries forward.",
                label
            ),
        ));
    }

    drafts
        .into_iter()
        .take(MAX_SIGNALS)
        .enumerate()
        .map(|(i, (kind, message))| Signal {
            id: format!("{}-signal-{}", spec.kind.slug(), i + 1),
            kind,
            message,
        })
        .collect()
}

fn build_references(spec: &PlaybookSpec) -> Vec<Reference> {
    spec.references
        .iter()
        .take(MAX_REFERENCES)
        .enumerate()
        .map(|(i, (label, href))| Reference {
            id: format!("{}-ref-{}", spec.kind.slug(), i + 1),
            label: label.to_string(),
            href: href.to_string(),
        })
        .collect()
}

fn compose_summary(classification: &Classification, steps: usize, tasks: usize) -> String {
    let label = classification.spec.kind.label();
    if classification.kind().is_default() {
        return format!(
            "No playbook keywords matched, so the mission routes to {} for clarification.",
            label
        );
    }
    format!(
        "Classified the mission as {} on the strength of \"{}\", producing {} steps and {} tasks.",
        label,
        classification.matched.join("\", \""),
        steps,
        tasks
    )
}

fn compose_reply(
    spec: &PlaybookSpec,
    terms: &SalientTerms,
    steps: &[Step],
    tasks: &[Task],
    signals: &[Signal],
    history: &[Message],
) -> String {
    let mut lines = Vec::new();

    let opening = terms.fill(spec.intro);
    if history.is_empty() {
        lines.push(opening);
    } else {
        lines.push(format!("Picking up from our conversation. {}", opening));
    }

    if let Some(first) = steps.first() {
        lines.push(format!("First move: {}. {}", first.title, first.detail));
    }
    if steps.len() > 1 {
        let rest: Vec<&str> = steps[1..].iter().map(|s| s.title.as_str()).collect();
        lines.push(format!("Then: {}.", rest.join(" -> ")));
    }

    match tasks {
        [] => {}
        [only] => lines.push(format!("I queued 1 task on the board: \"{}\".", only.title)),
        [first, ..] => lines.push(format!(
            "I queued {} tasks on the board, starting with \"{}\".",
            tasks.len(),
            first.title
        )),
    }

    if let Some(warning) = signals.iter().find(|s| s.kind == SignalKind::Warning) {
        lines.push(format!("Heads-up: {}", warning.message));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{TaskCategory, DEFAULT_PLAYBOOK};

    #[test]
    fn test_go_to_market_scenario() {
        let artifact = plan("Plan a 30-day go-to-market for a B2B SaaS beta", &[]);
        assert_eq!(artifact.playbook, "Go-To-Market");
        assert!(artifact.steps.len() >= 2);
        assert!(artifact
            .tasks
            .iter()
            .any(|t| t.category == TaskCategory::Planning));
        assert!(artifact.steps[0].detail.contains("B2B SaaS beta"));
        assert!(artifact.steps[2].detail.contains("30 days"));
        assert!(artifact.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert_eq!(artifact.tasks.last().unwrap().due.as_deref(), Some("Day 30"));
        // 受众与时间窗口都已给出，不应出现 warning
        assert!(artifact.signals.iter().all(|s| s.kind != SignalKind::Warning));
    }

    #[test]
    fn test_unmatched_input_gets_default_artifact() {
        let artifact = plan("asdf qwer", &[]);
        assert_eq!(artifact.playbook, DEFAULT_PLAYBOOK);
        assert!(!artifact.reply.is_empty());
        assert!(!artifact.steps.is_empty());
        assert_eq!(artifact.steps[0].title, "Clarify the objective");
        assert!(artifact.steps[0].detail.contains("asdf qwer"));
        assert!(artifact.summary.contains(DEFAULT_PLAYBOOK));
    }

    #[test]
    fn test_ids_unique_within_artifact() {
        let artifact = plan("Launch pricing research roadmap", &[]);
        let mut ids: Vec<&str> = artifact
            .steps
            .iter()
            .map(|s| s.id.as_str())
            .chain(artifact.tasks.iter().map(|t| t.id.as_str()))
            .chain(artifact.signals.iter().map(|s| s.id.as_str()))
            .chain(artifact.references.iter().map(|r| r.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_bounds_hold_for_every_playbook() {
        let inputs = [
            "Plan a go-to-market launch",
            "Synthesize survey findings",
            "Automate the onboarding workflow",
            "Prioritize the roadmap",
            "hello there",
        ];
        for input in inputs {
            let a = plan(input, &[]);
            assert!((2..=6).contains(&a.steps.len()), "{}", input);
            assert!(a.tasks.len() <= 5);
            assert!(a.signals.len() <= 4);
            assert!(a.references.len() <= 4);
            assert!(a.tasks.iter().all(|t| (0.0..=1.0).contains(&t.confidence)));
            assert!(a.steps.iter().all(|s| !s.detail.is_empty()));
        }
    }

    #[test]
    fn test_confidence_tracks_keyword_strength() {
        let weak = plan("launch", &[]);
        let strong = plan("go-to-market launch with pricing and positioning for B2B SaaS", &[]);
        assert_eq!(weak.playbook, strong.playbook);
        assert!(strong.tasks[0].confidence > weak.tasks[0].confidence);
    }

    #[test]
    fn test_confidence_is_capped() {
        assert_eq!(confidence_for(0.9, 50, 5), MAX_CONFIDENCE);
        assert_eq!(confidence_for(0.5, 0, 0), 0.5);
        assert_eq!(confidence_for(0.5, 2, 1), 0.68);
    }

    #[test]
    fn test_missing_prerequisite_warns() {
        let artifact = plan("Launch campaign", &[]);
        let warnings: Vec<&Signal> = artifact
            .signals
            .iter()
            .filter(|s| s.kind == SignalKind::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(artifact.reply.contains("Heads-up"));
    }

    #[test]
    fn test_repeated_engagement_yields_success() {
        let history = vec![
            Message::user("Outline a launch campaign for our beta"),
            Message::assistant("Go-To-Market playbook engaged."),
        ];
        let artifact = plan("Now tighten the pricing for launch", &history);
        assert!(artifact
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::Success && s.message.contains("Go-To-Market")));
        assert!(artifact.reply.starts_with("Picking up from our conversation."));
    }

    #[test]
    fn test_textual_deadline_only_on_final_task() {
        let artifact = plan("Ship the launch campaign by Friday", &[]);
        let dues: Vec<Option<&str>> = artifact.tasks.iter().map(|t| t.due.as_deref()).collect();
        assert_eq!(dues.last().copied().flatten(), Some("by Friday"));
        assert!(dues[..dues.len() - 1].iter().all(|d| d.is_none()));
    }

    #[test]
    fn test_deterministic() {
        let history = vec![Message::user("research competitors")];
        let a = plan("Synthesize the interviews within 2 weeks", &history);
        let b = plan("Synthesize the interviews within 2 weeks", &history);
        assert_eq!(a, b);
    }

    #[test]
    fn test_braces_in_mission_survive_template_fill() {
        let artifact = plan("{timeframe} launch for {audience}", &[]);
        assert_eq!(artifact.playbook, "Go-To-Market");
        assert!(artifact.steps[0]
            .detail
            .contains("of {timeframe} launch for {audience} for your core audience"));
        assert!(artifact.reply.contains("\"{timeframe} launch for {audience}\""));
    }
}
