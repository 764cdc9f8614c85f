use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

pub const MIN_TERM_GRAPHEMES: usize = 2;

/// NFKC-normalizes, lower-cases, and collapses runs of whitespace.
pub fn normalize(input: &str) -> String {
	let folded: String = input.nfkc().flat_map(char::to_lowercase).collect();
	let mut out = String::with_capacity(folded.len());

	for word in folded.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(word);
	}

	out
}

pub fn grapheme_len(text: &str) -> usize {
	text.graphemes(true).count()
}

/// Splits an already normalized query into unique terms, keeping first-occurrence order.
pub fn query_terms(normalized_query: &str) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for term in normalized_query.split_whitespace() {
		let term = trim_punctuation(term);

		if grapheme_len(term) < MIN_TERM_GRAPHEMES {
			continue;
		}
		if seen.insert(term) {
			out.push(term.to_string());
		}
	}

	out
}

/// Whitespace-delimited words with leading and trailing punctuation removed.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
	text.split_whitespace().map(trim_punctuation).filter(|word| !word.is_empty())
}

fn trim_punctuation(word: &str) -> &str {
	word.trim_matches(|ch: char| !ch.is_alphanumeric())
}
