//! URL normalization.
//!
//! Splits a raw URL string into lowercase scheme, hostname, path and query
//! parts. Never fails: input that cannot be split degrades to empty parts,
//! most importantly an empty hostname, which every downstream component
//! treats as "no match".

use serde::Serialize;

const SCHEME_SEPARATOR: &str = "://";
const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Characters removed before splitting, matching how browsers and most URL
/// parsers drop embedded tabs and line breaks.
const STRIPPED_CONTROL_CHARS: [char; 3] = ['\t', '\r', '\n'];

/// Schemes whose last path segment may carry `;params`.
const PARAM_SCHEMES: [&str; 15] = [
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtspu", "sip",
    "sips", "mms", "sftp", "tel",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedUrl {
    pub scheme: String,
    pub hostname: String,
    pub path: String,
    pub query: String,
}

/// Trim whitespace and prepend `http://` when no scheme separator is present.
///
/// The returned text keeps its original case; it is the string length and
/// character features are computed over.
pub fn normalize_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains(SCHEME_SEPARATOR) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    }
}

/// Normalize a raw URL into its lowercase parts.
pub fn normalize(raw: &str) -> NormalizedUrl {
    NormalizedUrl::parse(&normalize_text(raw))
}

impl NormalizedUrl {
    /// Split text that already carries a scheme (see [`normalize_text`]).
    ///
    /// Scheme detection only accepts `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
    /// before the first colon; anything else is treated as a schemeless path,
    /// which yields an empty hostname.
    pub fn parse(text: &str) -> Self {
        let cleaned: String = text
            .chars()
            .filter(|c| !STRIPPED_CONTROL_CHARS.contains(c))
            .collect();

        let (scheme, rest) = split_scheme(&cleaned);

        let (netloc, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find(['/', '?', '#']).unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
            None => ("", rest),
        };

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let scheme = scheme.to_lowercase();
        let path = if PARAM_SCHEMES.contains(&scheme.as_str()) {
            strip_params(path)
        } else {
            path
        };
        let netloc = netloc.to_lowercase();

        Self {
            scheme,
            hostname: hostname_from_netloc(&netloc).to_string(),
            path: path.to_lowercase(),
            query: query.to_lowercase(),
        }
    }

    pub fn has_hostname(&self) -> bool {
        !self.hostname.is_empty()
    }
}

fn split_scheme(text: &str) -> (&str, &str) {
    let Some(colon) = text.find(':') else {
        return ("", text);
    };
    let candidate = &text[..colon];

    let mut chars = candidate.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        (candidate, &text[colon + 1..])
    } else {
        ("", text)
    }
}

/// Cut `;params` off the last path segment: `/a/b;x` -> `/a/b`, while
/// `/a;x/b` is left alone.
fn strip_params(path: &str) -> &str {
    let start = path.rfind('/').unwrap_or(0);
    match path[start..].find(';') {
        Some(offset) => &path[..start + offset],
        None => path,
    }
}

/// Drop user-info (everything up to the last `@`) and the port.
///
/// `user@evil.com:8080` -> `evil.com`
fn hostname_from_netloc(netloc: &str) -> &str {
    let hostport = netloc.rsplit('@').next().unwrap_or("");
    hostport.split(':').next().unwrap_or("")
}
