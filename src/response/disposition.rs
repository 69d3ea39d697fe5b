//! `Content-Disposition` header values.

const ATTR_CHARS: &[u8] = b"!#$&+-.^_`|~";

/// Formats an `attachment` disposition for `filename`.
///
/// Only the last path segment is used. ASCII names are quoted; other names
/// get a `?`-substituted ASCII fallback plus an RFC 5987 `filename*`.
pub fn content_disposition(filename: Option<&str>) -> String {
    let Some(filename) = filename else {
        return "attachment".to_string();
    };

    let name = basename(filename);
    let printable = name.chars().all(|c| (' '..='~').contains(&c));
    let fallback: String = name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();
    let has_fallback = fallback != name;

    let mut header = String::from("attachment");

    if printable || has_fallback {
        header.push_str("; filename=");
        header.push_str(&quote(if has_fallback { &fallback } else { name }));
    }

    if has_fallback || !printable || has_hex_escape(name) {
        header.push_str("; filename*=UTF-8''");
        header.push_str(&encode_ext_value(name));
    }

    header
}

fn basename(path: &str) -> &str {
    path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or("")
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn has_hex_escape(value: &str) -> bool {
    value
        .as_bytes()
        .windows(3)
        .any(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
}

fn encode_ext_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || ATTR_CHARS.contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
