pub mod domain;
pub mod lexical;
pub mod tokens;

use crate::normalizer::{normalize_text, NormalizedUrl};
use crate::psl::SuffixList;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;
use tokens::Tokenizer;

/// Column order the extractor produces. Classifier artifacts are trained
/// against this list; changing it is a breaking change for every artifact.
pub const FEATURE_COLUMNS: [&str; 39] = [
    // protocol / length
    "is_https",
    "url_len",
    "hostname_len",
    "path_len",
    "query_len",
    // address-as-host
    "is_ip",
    // special characters
    "count_-",
    "count_@",
    "count_?",
    "count_%",
    "count_.",
    "count_=",
    "count__",
    "count_&",
    // keywords
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
    // token statistics
    "token_count",
    "avg_token_len",
    "max_token_len",
    "long_token_count",
    // query structure
    "query_param_count",
    "has_percent_encoding",
    // domain structure
    "subdomain_depth",
    "tld_is_common",
    // character classes
    "digit_ratio",
    "alnum_ratio",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Flag(bool),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FeatureValue::Int(v) => v as f64,
            FeatureValue::Float(v) => v,
            FeatureValue::Flag(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Flag(value)
    }
}

impl From<usize> for FeatureValue {
    fn from(value: usize) -> Self {
        FeatureValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Float(value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Float(v) => write!(f, "{:.4}", v),
            FeatureValue::Flag(v) => write!(f, "{}", u8::from(v)),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            FeatureValue::Int(v) => serializer.serialize_i64(v),
            FeatureValue::Float(v) => serializer.serialize_f64(v),
            FeatureValue::Flag(v) => serializer.serialize_u8(u8::from(v)),
        }
    }
}

/// Named feature values in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<V: Into<FeatureValue>>(&mut self, name: &'static str, value: V) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lay the values out in `columns` order. Columns this vector lacks are
    /// zero; names not in `columns` are dropped.
    pub fn reindex<S: AsRef<str>>(&self, columns: &[S]) -> Vec<f64> {
        columns
            .iter()
            .map(|column| {
                self.get(column.as_ref())
                    .map_or(0.0, |value| value.as_f64())
            })
            .collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Everything a feature family may look at for one URL.
#[derive(Debug, Clone)]
pub struct UrlContext {
    /// Trimmed input with the default scheme applied, original case.
    pub text: String,
    pub url: NormalizedUrl,
    /// Alphanumeric runs of `hostname path query`, in order, duplicates kept.
    pub tokens: Vec<String>,
}

impl UrlContext {
    pub fn new(raw: &str, tokenizer: &Tokenizer) -> Self {
        let text = normalize_text(raw);
        let url = NormalizedUrl::parse(&text);
        let combined = format!("{} {} {}", url.hostname, url.path, url.query);
        let tokens = tokenizer.tokenize(&combined);

        Self { text, url, tokens }
    }
}

/// One independently computable group of features.
pub trait FeatureFamily: Send + Sync {
    fn name(&self) -> &str;
    /// Columns this family writes, in order, regardless of input.
    fn columns(&self) -> &'static [&'static str];
    fn extract(&self, context: &UrlContext, features: &mut FeatureVector);
}

/// Runs every family in schema order.
pub struct FeatureExtractor {
    tokenizer: Tokenizer,
    families: Vec<Box<dyn FeatureFamily>>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(Arc::new(SuffixList::builtin()))
    }
}

impl FeatureExtractor {
    pub fn new(suffixes: Arc<SuffixList>) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            families: vec![
                Box::new(lexical::ProtocolLength),
                Box::new(lexical::AddressHost::new()),
                Box::new(lexical::SpecialCharacters),
                Box::new(tokens::KeywordIndicators),
                Box::new(tokens::TokenStatistics),
                Box::new(lexical::QueryStructure),
                Box::new(domain::DomainStructure::new(suffixes)),
                Box::new(lexical::CharacterClasses),
            ],
        }
    }

    /// Column names in output order.
    pub fn schema(&self) -> Vec<&'static str> {
        self.families
            .iter()
            .flat_map(|family| family.columns().iter().copied())
            .collect()
    }

    /// Family names in run order.
    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|family| family.name()).collect()
    }

    pub fn context(&self, raw: &str) -> UrlContext {
        UrlContext::new(raw, &self.tokenizer)
    }

    pub fn extract(&self, raw: &str) -> FeatureVector {
        self.extract_context(&self.context(raw))
    }

    pub fn extract_context(&self, context: &UrlContext) -> FeatureVector {
        let mut features = FeatureVector {
            entries: Vec::with_capacity(FEATURE_COLUMNS.len()),
        };
        for family in &self.families {
            family.extract(context, &mut features);
        }
        debug_assert!(features.keys().eq(self.schema()));
        features
    }
}
