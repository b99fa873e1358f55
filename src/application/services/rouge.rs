//! ROUGE overlap scores for comparing a generated answer or summary with a
//! reference text.

use std::collections::HashMap;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl RougeScore {
    fn from_counts(overlap: usize, candidate_total: usize, reference_total: usize) -> Self {
        if candidate_total == 0 || reference_total == 0 {
            return Self::default();
        }

        let precision = overlap as f64 / candidate_total as f64;
        let recall = overlap as f64 / reference_total as f64;
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RougeReport {
    pub rouge1: RougeScore,
    pub rouge2: RougeScore,
    pub rouge_l: RougeScore,
}

pub fn evaluate(candidate: &str, reference: &str) -> RougeReport {
    RougeReport {
        rouge1: rouge_n(candidate, reference, 1),
        rouge2: rouge_n(candidate, reference, 2),
        rouge_l: rouge_l(candidate, reference),
    }
}

/// Clipped n-gram overlap: each reference n-gram can be matched at most as
/// many times as it occurs in the reference.
pub fn rouge_n(candidate: &str, reference: &str, n: usize) -> RougeScore {
    if n == 0 {
        return RougeScore::default();
    }

    let candidate_tokens = tokenize(candidate);
    let reference_tokens = tokenize(reference);

    let candidate_ngrams = ngram_counts(&candidate_tokens, n);
    let reference_ngrams = ngram_counts(&reference_tokens, n);

    let overlap: usize = candidate_ngrams
        .iter()
        .map(|(gram, count)| (*count).min(reference_ngrams.get(gram).copied().unwrap_or(0)))
        .sum();

    RougeScore::from_counts(
        overlap,
        candidate_ngrams.values().sum(),
        reference_ngrams.values().sum(),
    )
}

pub fn rouge_l(candidate: &str, reference: &str) -> RougeScore {
    let candidate_tokens = tokenize(candidate);
    let reference_tokens = tokenize(reference);

    let lcs = lcs_length(&candidate_tokens, &reference_tokens);
    RougeScore::from_counts(lcs, candidate_tokens.len(), reference_tokens.len())
}

fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Two rolling rows of the DP table.
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for token_a in a {
        for (j, token_b) in b.iter().enumerate() {
            current[j + 1] = if token_a == token_b {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
