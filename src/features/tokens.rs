//! Token-level features over `hostname path query`.

use super::{FeatureFamily, FeatureVector, UrlContext};
use regex::Regex;
use std::collections::HashSet;

/// Credential and account vocabulary common in phishing URLs, paired with
/// the column each one fills.
pub const KEYWORDS: [(&str, &str); 15] = [
    ("login", "keyword_login"),
    ("signin", "keyword_signin"),
    ("verify", "keyword_verify"),
    ("verification", "keyword_verification"),
    ("secure", "keyword_secure"),
    ("security", "keyword_security"),
    ("account", "keyword_account"),
    ("accounts", "keyword_accounts"),
    ("auth", "keyword_auth"),
    ("authentication", "keyword_authentication"),
    ("token", "keyword_token"),
    ("password", "keyword_password"),
    ("support", "keyword_support"),
    ("update", "keyword_update"),
    ("billing", "keyword_billing"),
];

/// Tokens at least this long look like random or encoded segments.
pub const LONG_TOKEN_LEN: usize = 20;

/// Splits lowercase text on runs of anything but `[a-z0-9]`.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            separator: Regex::new(r"[^a-z0-9]+").expect("token separator pattern"),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.separator
            .split(text)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Exact token membership only: `loginpage` does not fire `login`.
pub struct KeywordIndicators;

impl FeatureFamily for KeywordIndicators {
    fn name(&self) -> &str {
        "keywords"
    }

    fn columns(&self) -> &'static [&'static str] {
        &[
            "keyword_login",
            "keyword_signin",
            "keyword_verify",
            "keyword_verification",
            "keyword_secure",
            "keyword_security",
            "keyword_account",
            "keyword_accounts",
            "keyword_auth",
            "keyword_authentication",
            "keyword_token",
            "keyword_password",
            "keyword_support",
            "keyword_update",
            "keyword_billing",
        ]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let token_set: HashSet<&str> = context.tokens.iter().map(String::as_str).collect();
        for (keyword, column) in KEYWORDS {
            features.insert(column, token_set.contains(keyword));
        }
    }
}

pub struct TokenStatistics;

impl FeatureFamily for TokenStatistics {
    fn name(&self) -> &str {
        "token_statistics"
    }

    fn columns(&self) -> &'static [&'static str] {
        &[
            "token_count",
            "avg_token_len",
            "max_token_len",
            "long_token_count",
        ]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let mut lengths: Vec<usize> = context.tokens.iter().map(|t| t.chars().count()).collect();
        let token_count = lengths.len();
        if lengths.is_empty() {
            lengths.push(0);
        }

        let total: usize = lengths.iter().sum();
        let average = total as f64 / lengths.len() as f64;
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let long_tokens = lengths.iter().filter(|&&len| len >= LONG_TOKEN_LEN).count();

        features.insert("token_count", token_count);
        features.insert("avg_token_len", average);
        features.insert("max_token_len", longest);
        features.insert("long_token_count", long_tokens);
    }
}
