//! 任务文本抽取
//!
//! 分词（小写、按非字母数字切分）用于关键词匹配；正则抽取时间窗口、受众与目标句，
//! 供步骤模板填充。全部为纯函数。

use std::sync::OnceLock;

use regex::Regex;

/// 目标句最大字符数
const MAX_OBJECTIVE_CHARS: usize = 96;
/// 受众短语最多保留的词数
const MAX_AUDIENCE_WORDS: usize = 6;

static TIMEFRAME_RE: OnceLock<Regex> = OnceLock::new();
static QUARTER_RE: OnceLock<Regex> = OnceLock::new();
static DEADLINE_RE: OnceLock<Regex> = OnceLock::new();
static AUDIENCE_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn timeframe_re() -> &'static Regex {
    TIMEFRAME_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,3})\s*-?\s*(day|week|month|quarter)s?\b").unwrap()
    })
}

fn quarter_re() -> &'static Regex {
    QUARTER_RE.get_or_init(|| Regex::new(r"(?i)\b(q[1-4])\b").unwrap())
}

fn deadline_re() -> &'static Regex {
    DEADLINE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:by|before)\s+((?:mon|tues|wednes|thurs|fri|satur|sun)day|end of (?:the )?(?:week|month|quarter|year)|next (?:week|month|quarter))\b",
        )
        .unwrap()
    })
}

fn audience_re() -> &'static Regex {
    AUDIENCE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\bfor\s+(?:an?\s+|the\s+|our\s+|my\s+)?([a-z0-9][a-z0-9&/\- ]*?)\s*(?:[.,;:!?]|\s(?:in|by|within|over|during|before|with|to|that|so|and)\s|$)",
        )
        .unwrap()
    })
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{(objective|audience|timeframe)\}").unwrap())
}

/// 小写分词：按非字母数字字符切分，go-to-market 与 "go to market" 得到相同词序列
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// 预处理后的任务文本：首尾补空格的词序列，短语匹配按整词进行
#[derive(Debug, Clone)]
pub struct MissionText {
    padded: String,
}

impl MissionText {
    pub fn new(text: &str) -> Self {
        let tokens = tokenize(text);
        Self {
            padded: format!(" {} ", tokens.join(" ")),
        }
    }

    /// 整词/整短语匹配（"ops" 不会命中 "stops"）
    pub fn contains(&self, phrase: &str) -> bool {
        let tokens = tokenize(phrase);
        if tokens.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {} ", tokens.join(" ")))
    }

    /// 命中任意一个短语
    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.contains(p))
    }
}

/// 时间窗口：展示文本 + 可换算时的天数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframe {
    pub label: String,
    pub days: Option<u32>,
}

/// 从任务文本中抽出的显著词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalientTerms {
    pub objective: String,
    pub timeframe: Option<Timeframe>,
    pub audience: Option<String>,
}

impl SalientTerms {
    pub fn extract(input: &str) -> Self {
        let objective = extract_objective(input);
        Self {
            objective: if objective.is_empty() {
                "your mission".to_string()
            } else {
                objective
            },
            timeframe: extract_timeframe(input),
            audience: extract_audience(input),
        }
    }

    pub fn timeframe_label(&self) -> &str {
        self.timeframe
            .as_ref()
            .map(|t| t.label.as_str())
            .unwrap_or("the next cycle")
    }

    pub fn audience_label(&self) -> &str {
        self.audience.as_deref().unwrap_or("your core audience")
    }

    /// 用显著词填充模板中的 {objective} / {audience} / {timeframe}
    ///
    /// 单遍替换，填入的用户原文不会被再次扫描。
    pub fn fill(&self, template: &str) -> String {
        placeholder_re()
            .replace_all(template, |caps: &regex::Captures| match &caps[1] {
                "objective" => self.objective.clone(),
                "audience" => self.audience_label().to_string(),
                _ => self.timeframe_label().to_string(),
            })
            .into_owned()
    }
}

/// 句末标点
fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// 断句前的片段至少要有一个长于缩写的词，且紧挨标点的词本身不含点（e.g / i.e 不算一句）
fn is_sentence(fragment: &str) -> bool {
    let last_is_abbreviation = fragment
        .split_whitespace()
        .last()
        .map(|w| w.contains('.'))
        .unwrap_or(true);
    !last_is_abbreviation
        && fragment
            .split_whitespace()
            .any(|w| w.chars().filter(|c| c.is_alphanumeric()).count() > 3)
}

/// 目标句：第一句话，压缩空白、去掉结尾标点，超长时按词截断
pub fn extract_objective(input: &str) -> String {
    let joined = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = joined.trim_start_matches(|c: char| is_terminator(c) || c == ' ');
    let mut end = collapsed.len();
    let chars: Vec<(usize, char)> = collapsed.char_indices().collect();
    for (i, (idx, c)) in chars.iter().enumerate() {
        if is_terminator(*c) {
            let at_end = i + 1 == chars.len();
            let before_space = chars.get(i + 1).map(|(_, n)| *n == ' ').unwrap_or(false);
            if (at_end || before_space) && is_sentence(&collapsed[..*idx]) {
                end = *idx;
                break;
            }
        }
    }
    let mut sentence = collapsed[..end]
        .trim_end_matches(|c: char| matches!(c, '.' | '?' | '!' | ',' | ';' | ':'))
        .trim();
    if sentence.is_empty() {
        sentence = collapsed.trim();
    }

    if sentence.chars().count() <= MAX_OBJECTIVE_CHARS {
        return sentence.to_string();
    }
    let head: String = sentence.chars().take(MAX_OBJECTIVE_CHARS).collect();
    let cut = head.rfind(' ').unwrap_or(head.len());
    format!("{}...", head[..cut].trim_end())
}

/// 时间窗口：优先数字 + 单位（30-day、2 weeks），其次季度（Q3），最后截止说法（by Friday）
pub fn extract_timeframe(input: &str) -> Option<Timeframe> {
    if let Some(cap) = timeframe_re().captures(input) {
        let n: u32 = cap.get(1)?.as_str().parse().ok()?;
        if n > 0 {
            let unit = cap.get(2)?.as_str().to_lowercase();
            let per_unit = match unit.as_str() {
                "day" => 1,
                "week" => 7,
                "month" => 30,
                _ => 90,
            };
            let label = if n == 1 {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", n, unit)
            };
            return Some(Timeframe {
                label,
                days: Some(n * per_unit),
            });
        }
    }
    if let Some(cap) = quarter_re().captures(input) {
        return Some(Timeframe {
            label: cap.get(1)?.as_str().to_uppercase(),
            days: None,
        });
    }
    if let Some(m) = deadline_re().find(input) {
        return Some(Timeframe {
            label: m.as_str().to_string(),
            days: None,
        });
    }
    None
}

/// 受众："for a B2B SaaS beta" → "B2B SaaS beta"；捕获内容本身是时间窗口时不算受众
pub fn extract_audience(input: &str) -> Option<String> {
    for cap in audience_re().captures_iter(input) {
        let Some(m) = cap.get(1) else { continue };
        let phrase = m.as_str().trim().trim_end_matches('-').trim();
        if phrase.is_empty() || timeframe_re().is_match(phrase) || quarter_re().is_match(phrase) {
            continue;
        }
        let words: Vec<&str> = phrase.split_whitespace().take(MAX_AUDIENCE_WORDS).collect();
        if words.is_empty() {
            continue;
        }
        return Some(words.join(" "));
    }
    None
}
