//! String similarity used for fuzzy keyword and signature matching

/// Similarity in `[0, 1]` between two strings; 1.0 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    strsim::normalized_levenshtein(a, b)
}
