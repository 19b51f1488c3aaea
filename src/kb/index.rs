//! In-memory inverted index over character n-grams.
//!
//! [`DocIndex`] owns three collaborating structures: the authoritative
//! document store, one postings table per field (gram -> doc id -> count),
//! and a per-document gram cache mirroring the exact contribution each
//! document makes to each postings table. The cache is what makes update and
//! delete O(G) instead of a scan over all postings.
//!
//! Consistency contract, holding whenever no mutator is mid-operation:
//! for every field, `postings[gram][id]` exists iff the cache entry
//! `grams_by_doc[id][gram]` is positive, and the two counts are equal; no
//! postings map holds a zero count or an empty doc map; every id referenced
//! anywhere is present in the document store.

use std::collections::HashMap;

use crate::kb::document::Doc;
use crate::kb::ngram::{count_ngrams, GramCounts};

/// One field's postings table plus its per-document contribution cache.
#[derive(Debug, Default)]
pub struct FieldIndex {
    /// gram -> doc id -> occurrence count
    postings: HashMap<String, HashMap<String, usize>>,
    /// doc id -> gram -> occurrence count (mirror of this doc's postings)
    grams_by_doc: HashMap<String, GramCounts>,
}

impl FieldIndex {
    /// Postings for one gram, if any document contains it.
    pub fn postings_for(&self, gram: &str) -> Option<&HashMap<String, usize>> {
        self.postings.get(gram)
    }

    /// Record a document's gram counts, adding them to the postings table
    /// and replacing the cache entry. The caller must have removed any
    /// previous contribution first.
    fn insert(&mut self, id: &str, counts: GramCounts) {
        for (gram, c) in &counts {
            *self
                .postings
                .entry(gram.clone())
                .or_default()
                .entry(id.to_string())
                .or_insert(0) += c;
        }
        self.grams_by_doc.insert(id.to_string(), counts);
    }

    /// Subtract a document's cached contribution from the postings table,
    /// dropping doc entries that reach zero and gram keys that empty out.
    /// No-op when the document has no cache entry.
    fn remove(&mut self, id: &str) {
        let Some(counts) = self.grams_by_doc.remove(id) else {
            return;
        };
        for (gram, c) in counts {
            if let Some(doc_counts) = self.postings.get_mut(&gram) {
                if let Some(count) = doc_counts.get_mut(id) {
                    if *count <= c {
                        doc_counts.remove(id);
                    } else {
                        *count -= c;
                    }
                }
                if doc_counts.is_empty() {
                    self.postings.remove(&gram);
                }
            }
        }
    }
}

/// Document store plus the dual inverted index.
#[derive(Debug)]
pub struct DocIndex {
    docs: HashMap<String, Doc>,
    title: FieldIndex,
    body: FieldIndex,
    ngram_n: usize,
}

impl DocIndex {
    /// `ngram_n` below 2 is coerced to 2.
    pub fn new(ngram_n: usize) -> Self {
        Self {
            docs: HashMap::new(),
            title: FieldIndex::default(),
            body: FieldIndex::default(),
            ngram_n: ngram_n.max(2),
        }
    }

    pub fn ngram_n(&self) -> usize {
        self.ngram_n
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Doc> {
        self.docs.get(id)
    }

    pub fn docs(&self) -> impl Iterator<Item = &Doc> {
        self.docs.values()
    }

    pub fn title_index(&self) -> &FieldIndex {
        &self.title
    }

    pub fn body_index(&self) -> &FieldIndex {
        &self.body
    }

    /// Insert-or-replace a document, keeping postings and caches in step.
    ///
    /// Protocol: remove the previous contribution (if any), recompute gram
    /// counts for both fields, insert the new contribution, replace the
    /// stored document. Callers serialise mutations through an exclusive
    /// lock, so the whole sequence is one critical section.
    pub fn upsert(&mut self, doc: Doc) {
        self.title.remove(&doc.id);
        self.body.remove(&doc.id);

        let title_counts = count_ngrams(&doc.title, self.ngram_n);
        let body_counts = count_ngrams(&doc.content, self.ngram_n);
        self.title.insert(&doc.id, title_counts);
        self.body.insert(&doc.id, body_counts);

        self.docs.insert(doc.id.clone(), doc);
    }

    /// Remove a document and purge its postings. Returns false when the id
    /// was absent (idempotent).
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.docs.contains_key(id) {
            return false;
        }
        self.title.remove(id);
        self.body.remove(id);
        self.docs.remove(id);
        true
    }

    /// Number of distinct documents containing `gram` in either field.
    pub fn doc_frequency(&self, gram: &str) -> usize {
        let title = self.title.postings_for(gram);
        let body = self.body.postings_for(gram);
        match (title, body) {
            (None, None) => 0,
            (Some(t), None) => t.len(),
            (None, Some(b)) => b.len(),
            (Some(t), Some(b)) => {
                let mut df = t.len();
                for id in b.keys() {
                    if !t.contains_key(id) {
                        df += 1;
                    }
                }
                df
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::ngram::count_ngrams;

    fn doc(id: &str, title: &str, content: &str) -> Doc {
        Doc::new(id, title, content)
    }

    /// Walk every structural invariant in both directions.
    fn assert_consistent(index: &DocIndex) {
        for (field_name, field) in [("title", &index.title), ("body", &index.body)] {
            // every stored doc has a cache entry matching a recompute
            for d in index.docs.values() {
                let text = if field_name == "title" { &d.title } else { &d.content };
                let expected = count_ngrams(text, index.ngram_n);
                let cached = field
                    .grams_by_doc
                    .get(&d.id)
                    .unwrap_or_else(|| panic!("missing {field_name} cache for {}", d.id));
                assert_eq!(cached, &expected, "stale {field_name} cache for {}", d.id);
            }
            // cache -> postings direction
            for (id, grams) in &field.grams_by_doc {
                assert!(index.docs.contains_key(id), "orphan cache id {id}");
                for (gram, c) in grams {
                    assert!(*c > 0, "zero count cached for {id}/{gram}");
                    assert_eq!(
                        field.postings.get(gram).and_then(|m| m.get(id)),
                        Some(c),
                        "postings/cache mismatch for {id}/{gram}"
                    );
                }
            }
            // postings -> cache direction, no empties
            for (gram, doc_counts) in &field.postings {
                assert!(!doc_counts.is_empty(), "empty postings for gram {gram}");
                for (id, c) in doc_counts {
                    assert!(*c > 0, "zero postings count for {id}/{gram}");
                    assert!(index.docs.contains_key(id), "orphan postings id {id}");
                    assert_eq!(
                        field.grams_by_doc.get(id).and_then(|m| m.get(gram)),
                        Some(c),
                    );
                }
            }
        }
    }

    #[test]
    fn test_upsert_then_get() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "安装指南", "介绍安装流程"));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().title, "安装指南");
        assert_consistent(&index);
    }

    #[test]
    fn test_upsert_replaces_old_contribution() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("x1", "安装指南", "介绍安装流程"));
        assert!(index.title.postings_for("安装").is_some());

        index.upsert(doc("x1", "排错手册", "介绍排错与诊断"));
        assert!(index.title.postings_for("安装").is_none());
        assert!(index.body.postings_for("安装").is_none());
        assert!(index.title.postings_for("排错").is_some());
        assert_consistent(&index);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        // [v1, v2, v2] must land in the same state as [v2] on a fresh index
        let mut a = DocIndex::new(2);
        a.upsert(doc("d", "第一版标题", "第一版内容"));
        a.upsert(doc("d", "第二版标题", "第二版内容"));
        a.upsert(doc("d", "第二版标题", "第二版内容"));

        let mut b = DocIndex::new(2);
        b.upsert(doc("d", "第二版标题", "第二版内容"));

        assert_eq!(a.docs, b.docs);
        assert_eq!(a.title.postings, b.title.postings);
        assert_eq!(a.body.postings, b.body.postings);
        assert_eq!(a.title.grams_by_doc, b.title.grams_by_doc);
        assert_eq!(a.body.grams_by_doc, b.body.grams_by_doc);
        assert_consistent(&a);
    }

    #[test]
    fn test_remove_purges_everything() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "客服入门", "什么是客服"));
        index.upsert(doc("2", "升级指南", "如何升级客服流程"));

        assert!(index.remove("1"));
        assert!(index.get("1").is_none());
        for field in [&index.title, &index.body] {
            assert!(!field.grams_by_doc.contains_key("1"));
            for doc_counts in field.postings.values() {
                assert!(!doc_counts.contains_key("1"));
            }
        }
        // doc 2 untouched
        assert!(index.body.postings_for("客服").is_some());
        assert_consistent(&index);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "客服入门", ""));
        assert!(!index.remove("missing"));
        assert_eq!(index.len(), 1);
        assert_consistent(&index);
    }

    #[test]
    fn test_shared_grams_keep_other_docs() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "客服入门", ""));
        index.upsert(doc("2", "客服升级", ""));

        index.remove("1");
        let postings = index.title.postings_for("客服").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings["2"], 1);
        assert_consistent(&index);
    }

    #[test]
    fn test_empty_fields_contribute_nothing() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "。。。", "   "));
        assert_eq!(index.len(), 1);
        assert!(index.title.postings.is_empty());
        assert!(index.body.postings.is_empty());
        assert_consistent(&index);
    }

    #[test]
    fn test_repeated_gram_counts_frequency() {
        let mut index = DocIndex::new(2);
        // "aaaa" contributes gram "aa" three times
        index.upsert(doc("1", "aaaa", ""));
        assert_eq!(index.title.postings_for("aa").unwrap()["1"], 3);
        assert_consistent(&index);
    }

    #[test]
    fn test_doc_frequency_unions_fields() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("1", "客服入门", "什么是客服")); // 客服 in both fields
        index.upsert(doc("2", "升级", "如何升级客服流程")); // 客服 in body only
        index.upsert(doc("3", "排班", "排班说明")); // no 客服

        assert_eq!(index.doc_frequency("客服"), 2);
        assert_eq!(index.doc_frequency("升级"), 2);
        assert_eq!(index.doc_frequency("没有"), 0);
    }

    #[test]
    fn test_mixed_operation_sequence_stays_consistent() {
        let mut index = DocIndex::new(2);
        index.upsert(doc("a", "客服入门", "什么是客服，如何开始"));
        index.upsert(doc("b", "升级指南", "如何升级客服流程"));
        index.upsert(doc("a", "常见问题", "客服、排班、SLA"));
        index.remove("b");
        index.upsert(doc("c", "安装指南", "快速开始"));
        index.upsert(doc("c", "安装指南", "快速开始")); // same content twice
        index.remove("missing");
        assert_consistent(&index);
        assert_eq!(index.len(), 2);
    }
}
