//! Question keys.
//!
//! A key identifies one question instance on one page. It is the decimal
//! magnitude of a 32-bit multiplicative rolling hash (`h * 31 + unit`) over
//! the UTF-16 code units of `path|search|prompt|snapshot`.

/// Rolling hash over UTF-16 code units with wrapping 32-bit arithmetic.
pub fn rolling_hash(source: &str) -> i32 {
    source.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

/// Build the key string for a question.
///
/// `snapshot` is expected to be already truncated by the caller.
pub fn question_key(path: &str, search: &str, prompt: &str, snapshot: &str) -> String {
    let source = format!("{path}|{search}|{prompt}|{snapshot}");
    let h = rolling_hash(&source);
    (i64::from(h)).abs().to_string()
}
