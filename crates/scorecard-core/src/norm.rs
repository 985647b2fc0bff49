//! Norm code canonicalization.
//!
//! Regulatory norms are cited in many spellings: "NR-06", "NR 6", "nr6",
//! "006". Before any comparison both sides are reduced to the bare numeric
//! part so these spellings compare equal.

/// Normalizes a norm code to its canonical comparable form.
///
/// Uppercases the code, removes every `"NR"` and every `'-'`, then strips
/// leading zeros. Removal repeats until no `"NR"` is left, so the result is
/// stable under a second normalization even when dropping a hyphen joins
/// an `N` and an `R`.
///
/// Returns an empty string for an empty input or a code made only of
/// removable characters. Callers must treat an empty code as unknown, never
/// as equal to another empty code; see [`codes_match`].
///
/// # Example
///
/// ```
/// use scorecard_core::norm::normalize_norm_code;
///
/// assert_eq!(normalize_norm_code("NR-06"), "6");
/// assert_eq!(normalize_norm_code("nr6"), "6");
/// assert_eq!(normalize_norm_code("006"), "6");
/// ```
pub fn normalize_norm_code(code: &str) -> String {
    let mut normalized = code.to_uppercase().replace('-', "");
    while normalized.contains("NR") {
        normalized = normalized.replace("NR", "");
    }
    normalized.trim_start_matches('0').to_string()
}

/// Normalizes an optional norm code; absent codes normalize to `""`.
pub fn normalize_optional(code: Option<&str>) -> String {
    code.map(normalize_norm_code).unwrap_or_default()
}

/// Compares two already-normalized codes.
///
/// Empty codes never match, not even each other.
#[inline]
pub fn codes_match(a: &str, b: &str) -> bool {
    !a.is_empty() && a == b
}
