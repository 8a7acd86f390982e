use super::corpus::Corpus;
use super::highlight::Highlighter;
use super::tokenizer::{normalize_query, tokenize_query};
use super::types::{SearchHit, SearchKind, SearchResponse};
use crate::reference::parser::{Reference, parse_reference};

pub const MIN_QUERY_CHARS: usize = 2;
pub const REFERENCE_RESULT_LIMIT: usize = 50;
pub const TEXT_RESULT_LIMIT: usize = 100;
pub const SHORT_QUERY_MESSAGE: &str = "Enter at least 2 characters";

/// Runs a reference lookup or, failing that, an AND-substring text search.
///
/// Results follow corpus order. Reference results report the full match
/// count in `total`; text results stop after [`TEXT_RESULT_LIMIT`] matches
/// and `total` counts only what was collected.
pub fn search(corpus: &Corpus, query: &str) -> SearchResponse {
    let query = normalize_query(query);

    if query.chars().count() < MIN_QUERY_CHARS {
        return SearchResponse {
            results: Vec::new(),
            kind: None,
            total: None,
            message: Some(SHORT_QUERY_MESSAGE.to_string()),
        };
    }

    match parse_reference(&query) {
        Some(reference) => search_reference(corpus, &reference),
        None => search_text(corpus, &query),
    }
}

fn search_reference(corpus: &Corpus, reference: &Reference) -> SearchResponse {
    let matches: Vec<_> = corpus
        .verses()
        .iter()
        .filter(|v| reference.matches(v.book, v.chapter, v.verse))
        .collect();
    let total = matches.len();

    tracing::debug!("Reference {:?} matched {} verses", reference, total);

    let results = matches
        .into_iter()
        .take(REFERENCE_RESULT_LIMIT)
        .map(|verse| SearchHit {
            verse: verse.clone(),
            highlight: None,
        })
        .collect();

    SearchResponse {
        results,
        kind: Some(SearchKind::Reference),
        total: Some(total),
        message: None,
    }
}

fn search_text(corpus: &Corpus, query: &str) -> SearchResponse {
    let terms = tokenize_query(query);
    let highlighter = Highlighter::new(&terms);

    let mut results = Vec::new();
    for verse in corpus.verses() {
        let text = verse.text.to_lowercase();
        if !terms.iter().all(|term| text.contains(term.as_str())) {
            continue;
        }

        let highlight = match &highlighter {
            Some(h) => h.highlight(&verse.text),
            None => verse.text.clone(),
        };
        results.push(SearchHit {
            verse: verse.clone(),
            highlight: Some(highlight),
        });

        if results.len() >= TEXT_RESULT_LIMIT {
            break;
        }
    }

    tracing::debug!("Text query {:?} collected {} verses", query, results.len());

    let total = results.len();
    SearchResponse {
        results,
        kind: Some(SearchKind::Text),
        total: Some(total),
        message: None,
    }
}
