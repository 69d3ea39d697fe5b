//! Formatting helpers used by handlers and the built-in middleware.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyNumberOptions {
    /// Inserted between groups of three integer digits.
    pub delimiter: String,
    /// Placed between the integer and fractional parts.
    pub separator: String,
}

impl Default for PrettyNumberOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            separator: ".".to_string(),
        }
    }
}

impl PrettyNumberOptions {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Groups the digits of the integer part: `1234567.5` becomes `1,234,567.5`.
///
/// Works on the textual form, so suffixed values such as `"9999ms"` are
/// grouped too.
pub fn pretty_number(number: impl ToString, options: &PrettyNumberOptions) -> String {
    let text = number.to_string();
    let mut parts = text.split('.');
    let first = parts.next().unwrap_or_default();

    let mut out = group_digits(first, &options.delimiter);
    for rest in parts {
        out.push_str(&options.separator);
        out.push_str(rest);
    }
    out
}

fn group_digits(text: &str, delimiter: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 3 * delimiter.len());

    for (i, c) in chars.iter().enumerate() {
        out.push(*c);
        if !c.is_ascii_digit() {
            continue;
        }
        let following = chars[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if following > 0 && following % 3 == 0 {
            out.push_str(delimiter);
        }
    }
    out
}

/// Milliseconds below ten seconds, rounded seconds above.
pub fn pretty_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let text = if millis < 10_000 {
        format!("{millis}ms")
    } else {
        format!("{}s", (millis as f64 / 1000.0).round())
    };
    pretty_number(text, &PrettyNumberOptions::default())
}

/// Time elapsed since `start`, formatted by [`pretty_duration`].
pub fn pretty_time(start: Instant) -> String {
    pretty_duration(start.elapsed())
}

/// `true` when `path` names an existing regular file. Any I/O error counts
/// as "does not exist".
pub async fn is_file_exist(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
