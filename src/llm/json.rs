//! Locating a JSON object inside free-form model output.
//!
//! Models wrap JSON in markdown fences or surround it with prose. The first
//! parseable object wins; `None` means the caller should fall back to text
//! sniffing.

use serde_json::Value;

/// Find the first JSON object in `text`.
///
/// Tries, in order:
/// 1. A ` ```json ` fenced block
/// 2. A bare ` ``` ` fenced block starting with `{`
/// 3. Each `{` in the text, parsed directly or by balanced-brace extraction
pub fn locate_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
        && let Some(value) = parse_object(trimmed[start + 7..start + 7 + end].trim())
    {
        return Some(value);
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{')
            && let Some(value) = parse_object(inner)
        {
            return Some(value);
        }
    }

    trimmed.match_indices('{').find_map(|(idx, _)| {
        let candidate = &trimmed[idx..];
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if value.is_object() => Some(value),
            _ => balanced_braces(candidate).and_then(parse_object),
        }
    })
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Prefix of `text` up to the brace closing its first `{`, ignoring braces
/// inside string literals.
fn balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}
