//! Recover a JSON fragment from free-form oracle text
//!
//! Models wrap JSON in prose, in ```json fences, or in untagged fences.
//! Extraction narrows to a fence interior when one exists, then takes the
//! span from the first opening delimiter to the last closing one.

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Interior of the first ```json fence, else of the first fence of any tag.
/// An unterminated fence runs to the end of the text.
pub fn fenced_block(text: &str) -> Option<&str> {
    let (start, tag_len) = match text.find(JSON_FENCE) {
        Some(i) => (i, JSON_FENCE.len()),
        None => (text.find(FENCE)?, FENCE.len()),
    };

    let interior = &text[start + tag_len..];
    let end = interior.find(FENCE).unwrap_or(interior.len());
    Some(&interior[..end])
}

/// Inclusive span from the first `open` to the last `close`
///
/// Searches inside a fenced block when the text has one. Returns `None`
/// when either delimiter is missing or the close precedes the open.
pub fn extract_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let window = fenced_block(text).unwrap_or(text);

    let start = window.find(open)?;
    let end = window.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&window[start..end + close.len_utf8()])
}

/// A JSON object span: `{` ... `}`
pub fn extract_json(text: &str) -> Option<&str> {
    extract_delimited(text, '{', '}')
}

/// A JSON array span: `[` ... `]`
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_delimited(text, '[', ']')
}
