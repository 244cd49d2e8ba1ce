//! Partial string similarity for document search.

/// Score `query` against `candidate` on a 0-100 scale.
///
/// Slides the shorter string across the longer one and takes the best
/// normalized Levenshtein similarity of any window, so a query that is a
/// substring of the candidate scores 100.
pub(crate) fn partial_ratio(query: &str, candidate: &str) -> u32 {
    let (shorter, longer) = if query.chars().count() <= candidate.chars().count() {
        (query, candidate)
    } else {
        (candidate, query)
    };

    if shorter.is_empty() {
        return 0;
    }

    let window_len = shorter.chars().count();
    let longer_chars: Vec<char> = longer.chars().collect();

    let mut best = 0.0f64;
    for start in 0..=longer_chars.len() - window_len {
        let window: String = longer_chars[start..start + window_len].iter().collect();
        let score = strsim::normalized_levenshtein(shorter, &window);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }

    (best * 100.0).round() as u32
}
