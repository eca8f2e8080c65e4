//! Playbook 注册表
//!
//! 每个 playbook 是一条声明式条目：关键词（带权重）、步骤模板、任务模板、前置条件告警、
//! 洞察文案与参考链接。classify 对任务文本逐条打分，取最高分；零分落到默认条目，保证分类是全函数。

use super::extract::MissionText;
use super::types::{TaskCategory, DEFAULT_PLAYBOOK};

/// 封闭的 playbook 集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybookKind {
    GoToMarket,
    ResearchSynthesis,
    ExecutionOps,
    ProductStrategy,
    GeneralPartner,
}

impl PlaybookKind {
    /// 对外展示的标签（即 artifact.playbook）
    pub fn label(&self) -> &'static str {
        match self {
            PlaybookKind::GoToMarket => "Go-To-Market",
            PlaybookKind::ResearchSynthesis => "Research Synthesis",
            PlaybookKind::ExecutionOps => "Execution Ops",
            PlaybookKind::ProductStrategy => "Product Strategy",
            PlaybookKind::GeneralPartner => DEFAULT_PLAYBOOK,
        }
    }

    /// id 前缀
    pub fn slug(&self) -> &'static str {
        match self {
            PlaybookKind::GoToMarket => "gtm",
            PlaybookKind::ResearchSynthesis => "research",
            PlaybookKind::ExecutionOps => "ops",
            PlaybookKind::ProductStrategy => "product",
            PlaybookKind::GeneralPartner => "general",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, PlaybookKind::GeneralPartner)
    }

    pub fn all() -> impl Iterator<Item = PlaybookKind> {
        REGISTRY.iter().map(|spec| spec.kind)
    }

    pub fn from_label(label: &str) -> Option<PlaybookKind> {
        Self::all().find(|k| k.label() == label)
    }
}

/// 带权重的关键词（短语按整词匹配）
#[derive(Debug)]
pub struct Keyword {
    pub phrase: &'static str,
    pub weight: u32,
}

const fn kw(phrase: &'static str, weight: u32) -> Keyword {
    Keyword { phrase, weight }
}

/// 步骤模板：detail 中可含 {objective} / {audience} / {timeframe}
#[derive(Debug)]
pub struct StepTemplate {
    pub title: &'static str,
    pub detail: &'static str,
}

/// 任务模板
#[derive(Debug)]
pub struct TaskTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub category: TaskCategory,
    /// 命中 playbook 前的基础置信度
    pub base_confidence: f64,
    /// 任务专属加分词：每命中一个提升置信度
    pub boosters: &'static [&'static str],
    /// 截止点在整个时间窗口中的位置（0..=1）
    pub due_fraction: f64,
}

/// 前置条件：缺失时产出 warning 信号
#[derive(Debug)]
pub enum Requirement {
    /// 需要能识别出时间窗口
    Timeframe,
    /// 需要能识别出受众
    Audience,
    /// 需要出现任一关键词
    AnyOf(&'static [&'static str]),
}

#[derive(Debug)]
pub struct Prerequisite {
    pub requirement: Requirement,
    pub warning: &'static str,
}

/// 一条完整的 playbook 条目
#[derive(Debug)]
pub struct PlaybookSpec {
    pub kind: PlaybookKind,
    pub keywords: &'static [Keyword],
    /// 回复开场白模板
    pub intro: &'static str,
    /// 中性洞察信号
    pub insight: &'static str,
    pub steps: &'static [StepTemplate],
    pub tasks: &'static [TaskTemplate],
    pub prerequisites: &'static [Prerequisite],
    /// (label, href)
    pub references: &'static [(&'static str, &'static str)],
}

/// 注册表：顺序即同分时的优先级；默认条目必须在最后且没有关键词
pub static REGISTRY: &[PlaybookSpec] = &[
    PlaybookSpec {
        kind: PlaybookKind::GoToMarket,
        keywords: &[
            kw("go to market", 3),
            kw("gtm", 3),
            kw("launch", 2),
            kw("pricing", 2),
            kw("positioning", 2),
            kw("messaging", 2),
            kw("marketing", 2),
            kw("campaign", 2),
            kw("sales", 2),
            kw("acquisition", 2),
            kw("pipeline", 1),
            kw("beta", 1),
            kw("b2b", 1),
            kw("saas", 1),
            kw("customers", 1),
            kw("channel", 1),
            kw("channels", 1),
        ],
        intro: "Go-To-Market playbook engaged for \"{objective}\", aimed at {audience} over {timeframe}.",
        insight: "Go-to-market plans land faster when one channel is proven before a second one is funded.",
        steps: &[
            StepTemplate {
                title: "Lock the positioning",
                detail: "Write a one-line value proposition of {objective} for {audience} and pressure-test it with three target accounts.",
            },
            StepTemplate {
                title: "Pick the launch channels",
                detail: "Choose one primary and one secondary channel that reach {audience}; park everything else for {timeframe}.",
            },
            StepTemplate {
                title: "Build the launch calendar",
                detail: "Back-plan milestones across {timeframe}: assets ready, soft launch, public launch, retro.",
            },
            StepTemplate {
                title: "Instrument the funnel",
                detail: "Define activation and conversion metrics before launch so {timeframe} ends with evidence instead of opinions.",
            },
        ],
        tasks: &[
            TaskTemplate {
                title: "Draft positioning statement",
                description: "One sentence: who it is for, the pain it removes, and why it beats the alternative.",
                category: TaskCategory::Planning,
                base_confidence: 0.6,
                boosters: &["positioning", "messaging", "value proposition"],
                due_fraction: 0.2,
            },
            TaskTemplate {
                title: "Define ideal customer profile",
                description: "Firmographics, buying trigger and decision maker for the first cohort.",
                category: TaskCategory::Analysis,
                base_confidence: 0.55,
                boosters: &["icp", "audience", "customers", "b2b", "segment"],
                due_fraction: 0.25,
            },
            TaskTemplate {
                title: "Build launch calendar",
                description: "Milestones from asset readiness to public launch, with an owner per milestone.",
                category: TaskCategory::Planning,
                base_confidence: 0.6,
                boosters: &["launch", "calendar", "timeline", "milestones"],
                due_fraction: 0.5,
            },
            TaskTemplate {
                title: "Set pricing hypothesis",
                description: "Pick an entry price and packaging to validate with the first customers.",
                category: TaskCategory::Analysis,
                base_confidence: 0.45,
                boosters: &["pricing", "price", "tiers", "packaging"],
                due_fraction: 0.6,
            },
            TaskTemplate {
                title: "Ship launch assets",
                description: "Landing page, announcement copy and the first outbound sequence.",
                category: TaskCategory::Delivery,
                base_confidence: 0.5,
                boosters: &["campaign", "assets", "landing page", "email"],
                due_fraction: 1.0,
            },
        ],
        prerequisites: &[
            Prerequisite {
                requirement: Requirement::Audience,
                warning: "No target audience named yet; positioning will stay generic until one is set.",
            },
            Prerequisite {
                requirement: Requirement::Timeframe,
                warning: "No launch window detected; calendar tasks stay unscheduled until a date is set.",
            },
        ],
        references: &[
            ("Positioning canvas", "/playbooks/go-to-market/positioning"),
            ("Launch calendar template", "/playbooks/go-to-market/launch-calendar"),
            ("Funnel metrics primer", "/playbooks/go-to-market/funnel-metrics"),
        ],
    },
    PlaybookSpec {
        kind: PlaybookKind::ResearchSynthesis,
        keywords: &[
            kw("research", 3),
            kw("synthesis", 3),
            kw("synthesize", 3),
            kw("interview", 2),
            kw("interviews", 2),
            kw("survey", 2),
            kw("surveys", 2),
            kw("insights", 2),
            kw("findings", 2),
            kw("competitor", 2),
            kw("competitors", 2),
            kw("competitive", 2),
            kw("market size", 2),
            kw("literature", 2),
            kw("analyze", 1),
            kw("analysis", 1),
            kw("study", 1),
            kw("trends", 1),
        ],
        intro: "Research Synthesis playbook engaged: turning \"{objective}\" into evidence-backed insight on {audience} within {timeframe}.",
        insight: "Synthesis is only as strong as its weakest source; weight findings by independent evidence, not volume.",
        steps: &[
            StepTemplate {
                title: "Frame the research question",
                detail: "Turn {objective} into one decision the research must unlock, and list what would change that decision.",
            },
            StepTemplate {
                title: "Gather the evidence",
                detail: "Collect interviews, surveys and desk sources on {audience}; tag every note with its source and date.",
            },
            StepTemplate {
                title: "Cluster the signals",
                detail: "Group findings into themes and count how many independent sources back each one.",
            },
            StepTemplate {
                title: "Write the synthesis",
                detail: "Deliver a one-page brief within {timeframe}: top three insights, confidence for each, and the recommended move.",
            },
        ],
        tasks: &[
            TaskTemplate {
                title: "Define the research question",
                description: "The single decision this research informs and the evidence that would flip it.",
                category: TaskCategory::Planning,
                base_confidence: 0.6,
                boosters: &["question", "hypothesis", "decision"],
                due_fraction: 0.1,
            },
            TaskTemplate {
                title: "Compile source inventory",
                description: "Interviews, surveys, reports and datasets with owner and freshness.",
                category: TaskCategory::Research,
                base_confidence: 0.55,
                boosters: &["sources", "interviews", "survey", "data", "reports"],
                due_fraction: 0.3,
            },
            TaskTemplate {
                title: "Tag and cluster findings",
                description: "Affinity-map notes into themes with a source count per theme.",
                category: TaskCategory::Analysis,
                base_confidence: 0.5,
                boosters: &["findings", "themes", "insights", "cluster"],
                due_fraction: 0.7,
            },
            TaskTemplate {
                title: "Publish synthesis brief",
                description: "One page: insights, confidence, recommendation, open questions.",
                category: TaskCategory::Delivery,
                base_confidence: 0.5,
                boosters: &["brief", "report", "synthesis", "summary"],
                due_fraction: 1.0,
            },
        ],
        prerequisites: &[Prerequisite {
            requirement: Requirement::AnyOf(&[
                "interview",
                "interviews",
                "survey",
                "surveys",
                "data",
                "dataset",
                "sources",
                "notes",
                "transcripts",
                "reports",
            ]),
            warning: "No research inputs referenced; line up sources before synthesis starts.",
        }],
        references: &[
            ("Interview guide template", "/playbooks/research/interview-guide"),
            ("Affinity mapping walkthrough", "/playbooks/research/affinity-mapping"),
            ("Insight brief format", "/playbooks/research/insight-brief"),
        ],
    },
    PlaybookSpec {
        kind: PlaybookKind::ExecutionOps,
        keywords: &[
            kw("operations", 3),
            kw("ops", 2),
            kw("process", 2),
            kw("processes", 2),
            kw("optimize", 2),
            kw("optimization", 2),
            kw("workflow", 2),
            kw("workflows", 2),
            kw("automate", 2),
            kw("automation", 2),
            kw("sprint", 2),
            kw("backlog", 2),
            kw("execute", 2),
            kw("execution", 2),
            kw("bottleneck", 2),
            kw("throughput", 2),
            kw("sop", 2),
            kw("onboarding", 1),
            kw("handoff", 1),
            kw("deadline", 1),
        ],
        intro: "Execution Ops playbook engaged: tightening \"{objective}\" with a measured change over {timeframe}.",
        insight: "Operational gains compound at the constraint; improvements anywhere else only move the queue.",
        steps: &[
            StepTemplate {
                title: "Map the current flow",
                detail: "Document how {objective} runs today, step by step, including every handoff and wait state.",
            },
            StepTemplate {
                title: "Find the bottleneck",
                detail: "Measure cycle time per stage and pick the single constraint that limits throughput.",
            },
            StepTemplate {
                title: "Design the fix",
                detail: "Propose one change to the constraint (automate, remove or re-sequence) and define its success metric.",
            },
            StepTemplate {
                title: "Roll out and review",
                detail: "Pilot the change over {timeframe}, then review the metric before standardizing it.",
            },
        ],
        tasks: &[
            TaskTemplate {
                title: "Map current workflow",
                description: "Swimlane of today's process with owners, handoffs and wait states.",
                category: TaskCategory::Analysis,
                base_confidence: 0.6,
                boosters: &["workflow", "process", "flow", "handoff"],
                due_fraction: 0.2,
            },
            TaskTemplate {
                title: "Measure cycle times",
                description: "Baseline time-in-stage for the last twenty items.",
                category: TaskCategory::Analysis,
                base_confidence: 0.5,
                boosters: &["metrics", "cycle time", "throughput", "bottleneck"],
                due_fraction: 0.4,
            },
            TaskTemplate {
                title: "Draft improvement plan",
                description: "One targeted change at the constraint with an owner and a success metric.",
                category: TaskCategory::Planning,
                base_confidence: 0.55,
                boosters: &["optimize", "automate", "automation", "improve"],
                due_fraction: 0.6,
            },
            TaskTemplate {
                title: "Run pilot and review",
                description: "Trial the change, compare against the baseline, then standardize or revert.",
                category: TaskCategory::Delivery,
                base_confidence: 0.5,
                boosters: &["pilot", "rollout", "sprint", "execute"],
                due_fraction: 1.0,
            },
        ],
        prerequisites: &[Prerequisite {
            requirement: Requirement::AnyOf(&[
                "metric",
                "metrics",
                "kpi",
                "kpis",
                "cycle time",
                "throughput",
                "sla",
                "baseline",
            ]),
            warning: "No baseline metric mentioned; capture one before changing the process or the gains will be unprovable.",
        }],
        references: &[
            ("Value stream mapping guide", "/playbooks/ops/value-stream-map"),
            ("Pilot review checklist", "/playbooks/ops/pilot-review"),
        ],
    },
    PlaybookSpec {
        kind: PlaybookKind::ProductStrategy,
        keywords: &[
            kw("roadmap", 3),
            kw("mvp", 3),
            kw("strategy", 2),
            kw("strategic", 2),
            kw("feature", 2),
            kw("features", 2),
            kw("prioritize", 2),
            kw("prioritization", 2),
            kw("vision", 2),
            kw("okr", 2),
            kw("okrs", 2),
            kw("north star", 2),
            kw("requirements", 2),
            kw("differentiation", 2),
            kw("product", 1),
        ],
        intro: "Product Strategy playbook engaged: shaping \"{objective}\" into a prioritized roadmap for {audience} across {timeframe}.",
        insight: "A roadmap earns trust through its non-goals; say what will not be built this cycle.",
        steps: &[
            StepTemplate {
                title: "Anchor on the outcome",
                detail: "State the customer outcome behind {objective} and the metric that proves it for {audience}.",
            },
            StepTemplate {
                title: "Inventory the bets",
                detail: "List candidate features or initiatives with rough effort and expected impact.",
            },
            StepTemplate {
                title: "Prioritize ruthlessly",
                detail: "Score the bets on impact, confidence and effort; commit to the top three for {timeframe}.",
            },
            StepTemplate {
                title: "Publish the roadmap",
                detail: "Share a now / next / later roadmap with explicit non-goals so trade-offs stay visible.",
            },
        ],
        tasks: &[
            TaskTemplate {
                title: "Define success metric",
                description: "The one outcome metric the roadmap is accountable to.",
                category: TaskCategory::Planning,
                base_confidence: 0.55,
                boosters: &["metric", "okr", "okrs", "north star", "outcome"],
                due_fraction: 0.2,
            },
            TaskTemplate {
                title: "Score initiative backlog",
                description: "Impact, confidence and effort for every candidate bet.",
                category: TaskCategory::Analysis,
                base_confidence: 0.55,
                boosters: &["prioritize", "prioritization", "backlog", "features"],
                due_fraction: 0.5,
            },
            TaskTemplate {
                title: "Draft now-next-later roadmap",
                description: "Three horizons plus an explicit list of non-goals.",
                category: TaskCategory::Planning,
                base_confidence: 0.6,
                boosters: &["roadmap", "vision", "strategy"],
                due_fraction: 0.8,
            },
            TaskTemplate {
                title: "Review roadmap with stakeholders",
                description: "Walk through trade-offs and capture objections before committing.",
                category: TaskCategory::Delivery,
                base_confidence: 0.45,
                boosters: &["stakeholders", "review", "alignment"],
                due_fraction: 1.0,
            },
        ],
        prerequisites: &[Prerequisite {
            requirement: Requirement::Audience,
            warning: "No customer segment named; prioritization will fall back to internal opinion.",
        }],
        references: &[
            ("Now-next-later roadmap template", "/playbooks/product/roadmap"),
            ("Opportunity scoring sheet", "/playbooks/product/opportunity-scoring"),
        ],
    },
    PlaybookSpec {
        kind: PlaybookKind::GeneralPartner,
        keywords: &[],
        intro: "I could not map \"{objective}\" to a specific playbook yet, so here is a starting frame while we sharpen it.",
        insight: "No specific playbook matched yet; a sharper mission statement unlocks a focused plan.",
        steps: &[
            StepTemplate {
                title: "Clarify the objective",
                detail: "Tell me what a win looks like for \"{objective}\": the outcome, who it is for, and when it is due.",
            },
            StepTemplate {
                title: "Surface constraints",
                detail: "Share budget, team, deadlines or dependencies so the plan fits reality.",
            },
            StepTemplate {
                title: "Choose a playbook",
                detail: "Say whether this is a launch, a research question, an operations fix or a product call, and I will switch to the matching playbook.",
            },
        ],
        tasks: &[
            TaskTemplate {
                title: "Clarify mission outcome",
                description: "Write down the result, the audience and the deadline in one sentence.",
                category: TaskCategory::Planning,
                base_confidence: 0.4,
                boosters: &["goal", "outcome", "objective"],
                due_fraction: 0.3,
            },
            TaskTemplate {
                title: "List constraints and dependencies",
                description: "Budget, people, tools and anything that blocks the first move.",
                category: TaskCategory::Analysis,
                base_confidence: 0.35,
                boosters: &["budget", "team", "deadline", "dependencies"],
                due_fraction: 1.0,
            },
        ],
        prerequisites: &[Prerequisite {
            requirement: Requirement::Timeframe,
            warning: "No timeframe detected; add a deadline so tasks can be scheduled.",
        }],
        references: &[("Mission brief template", "/playbooks/general/mission-brief")],
    },
];

/// 按 kind 取注册表条目
pub fn spec_for(kind: PlaybookKind) -> &'static PlaybookSpec {
    REGISTRY
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or_else(default_spec)
}

/// 默认条目（注册表最后一条）
pub fn default_spec() -> &'static PlaybookSpec {
    &REGISTRY[REGISTRY.len() - 1]
}

/// 分类结果：命中的条目、总分与命中的关键词（按注册表顺序）
#[derive(Debug, Clone)]
pub struct Classification {
    pub spec: &'static PlaybookSpec,
    pub score: u32,
    pub matched: Vec<&'static str>,
}

impl Classification {
    pub fn kind(&self) -> PlaybookKind {
        self.spec.kind
    }
}

fn score_spec(spec: &'static PlaybookSpec, text: &MissionText) -> (u32, Vec<&'static str>) {
    let mut score = 0;
    let mut matched = Vec::new();
    for keyword in spec.keywords {
        if text.contains(keyword.phrase) {
            score += keyword.weight;
            matched.push(keyword.phrase);
        }
    }
    (score, matched)
}

/// 对任务文本打分并选出 playbook；同分取注册表中靠前者，零分落到默认条目
pub fn classify(text: &MissionText) -> Classification {
    let mut best = Classification {
        spec: default_spec(),
        score: 0,
        matched: Vec::new(),
    };
    for spec in REGISTRY {
        let (score, matched) = score_spec(spec, text);
        if score > best.score {
            best = Classification {
                spec,
                score,
                matched,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(input: &str) -> PlaybookKind {
        classify(&MissionText::new(input)).kind()
    }

    #[test]
    fn test_registry_shape() {
        assert!(default_spec().kind.is_default());
        assert!(default_spec().keywords.is_empty());
        for spec in REGISTRY {
            assert!((2..=6).contains(&spec.steps.len()), "{:?}", spec.kind);
            assert!(spec.tasks.len() <= 5, "{:?}", spec.kind);
            assert!(spec.references.len() <= 4, "{:?}", spec.kind);
            for step in spec.steps {
                assert!(!step.detail.trim().is_empty());
            }
            for task in spec.tasks {
                assert!((0.0..=1.0).contains(&task.base_confidence));
                assert!((0.0..=1.0).contains(&task.due_fraction));
            }
        }
    }

    #[test]
    fn test_labels_round_trip() {
        for kind in PlaybookKind::all() {
            assert_eq!(PlaybookKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(PlaybookKind::from_label("Bootstrap"), None);
    }

    #[test]
    fn test_classify_each_playbook() {
        assert_eq!(
            classify_str("Plan a 30-day go-to-market for a B2B SaaS beta"),
            PlaybookKind::GoToMarket
        );
        assert_eq!(
            classify_str("Synthesize the customer interviews from last month"),
            PlaybookKind::ResearchSynthesis
        );
        assert_eq!(
            classify_str("Optimize our invoice approval workflow"),
            PlaybookKind::ExecutionOps
        );
        assert_eq!(
            classify_str("Draft a roadmap for the MVP"),
            PlaybookKind::ProductStrategy
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_default() {
        let c = classify(&MissionText::new("asdf qwer"));
        assert_eq!(c.kind(), PlaybookKind::GeneralPartner);
        assert_eq!(c.score, 0);
        assert!(c.matched.is_empty());
    }

    #[test]
    fn test_tie_resolves_in_registry_order() {
        // launch(2) 对 sprint(2)：同分时 Go-To-Market 排在前面
        assert_eq!(classify_str("launch sprint"), PlaybookKind::GoToMarket);
    }

    #[test]
    fn test_matched_keywords_are_reported() {
        let c = classify(&MissionText::new("GTM pricing for a beta"));
        assert_eq!(c.kind(), PlaybookKind::GoToMarket);
        assert_eq!(c.matched, vec!["gtm", "pricing", "beta"]);
        assert_eq!(c.score, 6);
    }
}
