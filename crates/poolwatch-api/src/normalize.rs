// Oversized-identifier normalization.
//
// The backend emits 64-bit snowflake ids as bare JSON integers. Parsed
// as f64 those lose precision above 2^53, so any field whose key ends in
// "id"/"Id" with a bare integer literal of 16 or more digits is quoted
// into a string BEFORE structural parsing. This is a text-level rewrite:
// once a lossy float exists the damage is already done.

use std::sync::OnceLock;

use regex::Regex;

fn big_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Group 1: a key ending in "id" or "Id"; group 2: the digit run.
        Regex::new(r#""(\w*[iI]d)"\s*:\s*(\d{16,})"#).expect("static regex is valid")
    })
}

/// Quote every >=16-digit integer value whose key ends in `id`/`Id`.
///
/// Returns the input unchanged (no allocation) when nothing matches.
pub fn quote_large_ids(body: &str) -> std::borrow::Cow<'_, str> {
    big_id_pattern().replace_all(body, "\"$1\":\"$2\"")
}
