//! 曲目匹配服务 - 业务能力层
//!
//! 只负责"一个源条目 → 一个目标曲目"的判断，不关心流程

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::clients::TargetCatalog;
use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{SourceItem, TargetSearchCandidate};

/// 视频标题中常见、对搜索无意义的词组（长的在前）
const NOISE_PHRASES: &[&str] = &[
    "official music video",
    "official lyric video",
    "official video",
    "official audio",
    "music video",
    "lyric video",
    "lyrics",
    "video",
];

fn noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = NOISE_PHRASES
            .iter()
            .map(|p| regex::escape(p).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("noise phrase pattern is valid")
    })
}

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[()\[\]{}]").expect("bracket pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

fn normalize_once(text: &str) -> String {
    let without_noise = noise_regex().replace_all(text, " ");
    let without_brackets = bracket_regex().replace_all(&without_noise, " ");
    whitespace_regex()
        .replace_all(&without_brackets, " ")
        .trim()
        .to_string()
}

/// 清洗搜索词：去掉噪声词组和括号，合并空白
///
/// 重复清洗直到结果不再变化，因此对已清洗的文本再次调用结果不变。
///
/// ```
/// use playlist_transfer::services::matching_service::normalize_query;
/// assert_eq!(normalize_query("Song Title (Official Music Video)"), "Song Title");
/// ```
pub fn normalize_query(raw: &str) -> String {
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn word_set(text: &str) -> HashSet<String> {
    word_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// 候选曲目（标题 + 艺人）的词在搜索词中出现的比例，范围 0.0 ~ 1.0
pub fn match_score(query: &str, candidate: &TargetSearchCandidate) -> f64 {
    let query_words = word_set(query);
    let mut candidate_text = candidate.title.clone();
    for artist in &candidate.artists {
        candidate_text.push(' ');
        candidate_text.push_str(artist);
    }
    let candidate_words = word_set(&candidate_text);
    if candidate_words.is_empty() {
        return 0.0;
    }
    let hits = candidate_words.iter().filter(|w| query_words.contains(*w)).count();
    hits as f64 / candidate_words.len() as f64
}

/// 曲目匹配服务
///
/// 职责：
/// - 由源条目构建搜索词并清洗
/// - 调用目标平台搜索，只取第一条结果
/// - 判断第一条结果是否可用（有 URI，且满足可选阈值）
/// - 不做重排序，未命中时不改写搜索词重试
pub struct MatchingService {
    target: Arc<dyn TargetCatalog>,
    /// `None` 时无条件接受第一条结果
    threshold: Option<f64>,
}

impl MatchingService {
    pub fn new(target: Arc<dyn TargetCatalog>, threshold: Option<f64>) -> Self {
        Self { target, threshold }
    }

    pub fn from_config(target: Arc<dyn TargetCatalog>, config: &Config) -> Self {
        Self::new(target, config.match_threshold)
    }

    /// 标题 + 频道名，空的部分跳过
    pub fn build_query(item: &SourceItem) -> String {
        [item.title.trim(), item.channel.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 查找最佳匹配
    ///
    /// # 返回
    /// - `Ok(Some(candidate))`：匹配成功
    /// - `Ok(None)`：未匹配（无结果、无 URI、或低于阈值）
    /// - `Err(_)`：搜索调用本身失败
    pub async fn find_best_match(
        &self,
        raw_query: &str,
        token: &str,
    ) -> Result<Option<TargetSearchCandidate>, CatalogError> {
        let query = normalize_query(raw_query);
        if query.is_empty() {
            warn!("⚠️ 清洗后的搜索词为空 (原始: '{}')，跳过搜索", raw_query);
            return Ok(None);
        }
        info!("🔍 搜索: '{}'", query);

        let Some(candidate) = self.target.search(&query, token).await? else {
            return Ok(None);
        };

        if !candidate.has_uri() {
            warn!("⚠️ 找到曲目 '{}' 但没有 URI，跳过", candidate.title);
            return Ok(None);
        }

        if let Some(threshold) = self.threshold {
            let score = match_score(&query, &candidate);
            if score < threshold {
                info!(
                    "✗ 候选 '{}' 相似度 {:.2} 低于阈值 {:.2}，视为未匹配",
                    candidate.title, score, threshold
                );
                return Ok(None);
            }
            debug!("候选 '{}' 相似度 {:.2}", candidate.title, score);
        }

        Ok(Some(candidate))
    }
}
