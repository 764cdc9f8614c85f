use unicode_segmentation::UnicodeSegmentation;

/// Edit distance over grapheme clusters.
pub fn levenshtein(a: &str, b: &str) -> usize {
	let a: Vec<&str> = a.graphemes(true).collect();
	let b: Vec<&str> = b.graphemes(true).collect();

	if a.is_empty() {
		return b.len();
	}
	if b.is_empty() {
		return a.len();
	}

	let mut prev: Vec<usize> = (0..=b.len()).collect();
	let mut curr = vec![0_usize; b.len() + 1];

	for (i, a_unit) in a.iter().enumerate() {
		curr[0] = i + 1;

		for (j, b_unit) in b.iter().enumerate() {
			let cost = usize::from(a_unit != b_unit);

			curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
		}

		std::mem::swap(&mut prev, &mut curr);
	}

	prev[b.len()]
}

/// `(max_len - distance) / max_len`, in `[0, 1]`. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
	let max_len = a.graphemes(true).count().max(b.graphemes(true).count());

	if max_len == 0 {
		return 1.0;
	}

	let distance = levenshtein(a, b);

	(max_len - distance.min(max_len)) as f64 / max_len as f64
}
