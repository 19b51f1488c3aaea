//! Query scoring and ranking.
//!
//! Two separate algorithms: the index path accumulates TF·IDF-weighted
//! scores from the postings tables, the substring path scans the full
//! document set. The substring path runs only when the query normalises to
//! fewer than `ngram_n` code points and never mixes with index scores.

use std::collections::{HashMap, HashSet};

use crate::kb::config::KbConfig;
use crate::kb::document::{snippet, SearchItem};
use crate::kb::index::DocIndex;

/// Smoothed inverse document frequency, positive for every observed gram.
fn idf(num_docs: usize, df: usize) -> f64 {
    1.0 + ((1.0 + num_docs as f64) / (1.0 + df as f64)).ln()
}

/// TF·IDF accumulation over the postings tables. Title hits weigh double
/// body hits; counts are occurrence frequencies, not set membership.
pub fn index_candidates(index: &DocIndex, grams: &[String], config: &KbConfig) -> Vec<SearchItem> {
    if grams.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let unique: HashSet<&str> = grams.iter().map(String::as_str).collect();
    let num_docs = index.len();

    let mut scores: HashMap<&str, f64> = HashMap::new();
    for gram in unique {
        let w = idf(num_docs, index.doc_frequency(gram));
        if let Some(postings) = index.title_index().postings_for(gram) {
            for (id, c) in postings {
                *scores.entry(id.as_str()).or_insert(0.0) += config.title_weight * *c as f64 * w;
            }
        }
        if let Some(postings) = index.body_index().postings_for(gram) {
            for (id, c) in postings {
                *scores.entry(id.as_str()).or_insert(0.0) += config.body_weight * *c as f64 * w;
            }
        }
    }

    collect_items(index, config, scores)
}

/// Full-store substring scan, used only when the query yields no grams.
/// The query must already be trimmed and lowercased.
pub fn substring_candidates(index: &DocIndex, query: &str, config: &KbConfig) -> Vec<SearchItem> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for doc in index.docs() {
        let mut score = 0.0;
        if doc.title.to_lowercase().contains(query) {
            score += config.title_weight;
        }
        if doc.content.to_lowercase().contains(query) {
            score += config.body_weight;
        }
        if score > 0.0 {
            scores.insert(doc.id.as_str(), score);
        }
    }
    collect_items(index, config, scores)
}

fn collect_items(index: &DocIndex, config: &KbConfig, scores: HashMap<&str, f64>) -> Vec<SearchItem> {
    scores
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .filter_map(|(id, score)| {
            index.get(id).map(|doc| SearchItem {
                id: doc.id.clone(),
                title: doc.title.clone(),
                snippet: snippet(&doc.content, config.snippet_max_code_points),
                score,
            })
        })
        .collect()
}

/// Sort score-descending, id-ascending among equal scores. The secondary
/// key keeps repeated calls over an unchanged store byte-identical.
pub fn rank(items: &mut [SearchItem]) {
    items.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::document::Doc;
    use crate::kb::ngram::ngrams;

    fn index_with(docs: &[(&str, &str, &str)]) -> DocIndex {
        let mut index = DocIndex::new(2);
        for (id, title, content) in docs {
            index.upsert(Doc::new(*id, *title, *content));
        }
        index
    }

    fn search_index(index: &DocIndex, q: &str) -> Vec<SearchItem> {
        let config = KbConfig::default();
        let mut items = index_candidates(index, &ngrams(q, index.ngram_n()), &config);
        rank(&mut items);
        items
    }

    #[test]
    fn test_idf_is_positive() {
        assert!(idf(0, 0) > 0.0);
        assert!(idf(1000, 1000) > 0.0);
        assert!(idf(3, 0) > idf(3, 3));
    }

    #[test]
    fn test_title_hit_outranks_body_hit() {
        let index = index_with(&[
            ("t", "客服入门", "别的内容"),
            ("b", "别的标题", "客服入门"),
        ]);
        let items = search_index(&index, "客服");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "t");
        assert!(items[0].score > items[1].score);
    }

    #[test]
    fn test_score_counts_frequency() {
        // one unique gram appearing 3 times in the title: 3 * 2 * idf
        let index = index_with(&[("d", "aaaa", "")]);
        let items = search_index(&index, "aa");
        assert_eq!(items.len(), 1);
        let expected = 3.0 * 2.0 * idf(1, 1);
        assert!((items[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rarer_gram_weighs_more() {
        let index = index_with(&[
            ("1", "升级客服", ""),
            ("2", "升级排班", ""),
            ("3", "升级流程", ""),
        ]);
        // 客服 appears in one doc, 升级 in all three
        let common = search_index(&index, "升级");
        let rare = search_index(&index, "客服");
        assert!(rare[0].score > common[0].score);
    }

    #[test]
    fn test_index_path_misses_without_grams_in_common() {
        let index = index_with(&[("1", "安装指南", "介绍安装流程")]);
        assert!(search_index(&index, "排错").is_empty());
    }

    #[test]
    fn test_substring_scoring() {
        let config = KbConfig::default();
        let index = index_with(&[
            ("both", "安装说明", "安装步骤"),
            ("body", "别的", "安装一下"),
            ("none", "无关", "无关"),
        ]);
        let mut items = substring_candidates(&index, "安", &config);
        rank(&mut items);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "both");
        assert_eq!(items[0].score, 3.0);
        assert_eq!(items[1].score, 1.0);
    }

    #[test]
    fn test_substring_is_case_insensitive_on_docs() {
        let config = KbConfig::default();
        let index = index_with(&[("1", "API Gateway", "HTTP Routing")]);
        let items = substring_candidates(&index, "api", &config);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_rank_is_deterministic_on_ties() {
        let mut a = vec![
            SearchItem { id: "b".into(), title: String::new(), snippet: String::new(), score: 1.0 },
            SearchItem { id: "a".into(), title: String::new(), snippet: String::new(), score: 1.0 },
            SearchItem { id: "c".into(), title: String::new(), snippet: String::new(), score: 2.0 },
        ];
        rank(&mut a);
        let order: Vec<&str> = a.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let config = KbConfig::default();
        let index = DocIndex::new(2);
        assert!(index_candidates(&index, &ngrams("客服", 2), &config).is_empty());
        assert!(substring_candidates(&index, "客", &config).is_empty());
    }
}
