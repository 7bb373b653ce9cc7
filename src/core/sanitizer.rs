// src/core/sanitizer.rs
//! Display-oriented escaping of non-ASCII characters

use std::fmt::Write;

/// Replace every non-ASCII character with its decimal numeric character reference.
///
/// ASCII input, control whitespace included, passes through unchanged, so
/// running this twice is the same as running it once.
pub fn sanitize(html: &str) -> String {
    if html.is_ascii() {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + html.len() / 4);
    for c in html.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            // Writing into a String cannot fail
            let _ = write!(out, "&#{};", c as u32);
        }
    }
    out
}
