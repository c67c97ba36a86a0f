use std::sync::LazyLock;

use regex::{Captures, Regex};

static UNICODE_ESCAPE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\\u[0-9a-fA-F]{4})+").expect("valid escape pattern"));

/// Repairs release notes that went through a lossy JSON encoding step:
/// literal `\r\n` / `\n` pairs become newlines and runs of `\uXXXX` escapes
/// become the characters they encode. Text that is already well-formed
/// passes through untouched.
pub fn normalize(text: Option<&str>) -> String {
    let text = match text {
        Some(text) if !text.is_empty() => text,
        _ => return String::new(),
    };

    let text = text.replace("\\r\\n", "\n").replace("\\n", "\n");
    if !text.contains("\\u") {
        return text;
    }

    UNICODE_ESCAPE_RUN
        .replace_all(&text, |caps: &Captures| match decode_escape_run(&caps[0]) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("Failed to unescape {}: {}", &caps[0], e);
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Decodes a run like `\u6838\u5fc3` as UTF-16 so surrogate pairs combine.
fn decode_escape_run(run: &str) -> Result<String, std::char::DecodeUtf16Error> {
    let units = run
        .split("\\u")
        .filter(|unit| !unit.is_empty())
        .filter_map(|unit| u16::from_str_radix(unit, 16).ok());
    char::decode_utf16(units).collect()
}
