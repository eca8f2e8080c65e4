//! 边界校验：入站 Sanitizer 与出站 Normalizer
//!
//! 跨越边界的 JSON 一律按「未知结构」处理：先校验再转换，逐字段兜底，而不是假设形状。

pub mod normalizer;
pub mod sanitizer;

pub use normalizer::{clamp_confidence, fallback_artifact, generate_id, normalize, FALLBACK_REPLY};
pub use sanitizer::{sanitize_history, sanitize_request, SanitizedRequest};
