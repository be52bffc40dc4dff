//! Character-level features: scheme, lengths, host-as-address, special
//! character counts, query shape and character-class ratios.

use super::{FeatureFamily, FeatureVector, UrlContext};
use regex::Regex;

/// Characters counted across the full URL. `/` is left out on purpose:
/// legitimate deep links carry as many slashes as phishing links do.
pub const SPECIAL_CHARACTERS: [(char, &str); 8] = [
    ('-', "count_-"),
    ('@', "count_@"),
    ('?', "count_?"),
    ('%', "count_%"),
    ('.', "count_."),
    ('=', "count_="),
    ('_', "count__"),
    ('&', "count_&"),
];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn log_len(s: &str) -> f64 {
    (char_len(s) as f64).ln_1p()
}

/// `is_https` and the log-scaled lengths. Query length stays raw: it is zero
/// for most URLs, so the magnitude itself is the signal.
pub struct ProtocolLength;

impl FeatureFamily for ProtocolLength {
    fn name(&self) -> &str {
        "protocol_length"
    }

    fn columns(&self) -> &'static [&'static str] {
        &["is_https", "url_len", "hostname_len", "path_len", "query_len"]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let url = &context.url;
        features.insert("is_https", url.scheme == "https");
        features.insert("url_len", log_len(&context.text));
        features.insert("hostname_len", log_len(&url.hostname));
        features.insert("path_len", log_len(&url.path));
        features.insert("query_len", char_len(&url.query));
    }
}

/// Dotted-quad hosts. Purely syntactic: `999.999.999.999` counts too.
pub struct AddressHost {
    dotted_quad: Regex,
}

impl Default for AddressHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressHost {
    pub fn new() -> Self {
        Self {
            dotted_quad: Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("dotted-quad pattern"),
        }
    }

    pub fn is_ip(&self, hostname: &str) -> bool {
        self.dotted_quad.is_match(hostname)
    }
}

impl FeatureFamily for AddressHost {
    fn name(&self) -> &str {
        "address_host"
    }

    fn columns(&self) -> &'static [&'static str] {
        &["is_ip"]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        features.insert("is_ip", self.is_ip(&context.url.hostname));
    }
}

pub struct SpecialCharacters;

impl FeatureFamily for SpecialCharacters {
    fn name(&self) -> &str {
        "special_characters"
    }

    fn columns(&self) -> &'static [&'static str] {
        &[
            "count_-", "count_@", "count_?", "count_%", "count_.", "count_=", "count__",
            "count_&",
        ]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        for (ch, column) in SPECIAL_CHARACTERS {
            features.insert(column, context.text.matches(ch).count());
        }
    }
}

pub struct QueryStructure;

impl FeatureFamily for QueryStructure {
    fn name(&self) -> &str {
        "query_structure"
    }

    fn columns(&self) -> &'static [&'static str] {
        &["query_param_count", "has_percent_encoding"]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let query = &context.url.query;
        let params = if query.is_empty() {
            0
        } else {
            query.matches('&').count() + 1
        };
        features.insert("query_param_count", params);
        features.insert("has_percent_encoding", query.contains('%'));
    }
}

/// Digit and alphanumeric share of the lowercased URL text.
pub struct CharacterClasses;

impl FeatureFamily for CharacterClasses {
    fn name(&self) -> &str {
        "character_classes"
    }

    fn columns(&self) -> &'static [&'static str] {
        &["digit_ratio", "alnum_ratio"]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let lowered = context.text.to_lowercase();
        let total = char_len(&lowered);

        let (digit_ratio, alnum_ratio) = if total == 0 {
            (0.0, 0.0)
        } else {
            let digits = lowered.chars().filter(char::is_ascii_digit).count();
            let alnum = lowered.chars().filter(char::is_ascii_alphanumeric).count();
            (digits as f64 / total as f64, alnum as f64 / total as f64)
        };

        features.insert("digit_ratio", digit_ratio);
        features.insert("alnum_ratio", alnum_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tokens::Tokenizer;
    use crate::features::FeatureValue;

    fn run(family: &dyn FeatureFamily, raw: &str) -> FeatureVector {
        let context = UrlContext::new(raw, &Tokenizer::new());
        let mut features = FeatureVector::new();
        family.extract(&context, &mut features);
        assert!(features.keys().eq(family.columns().iter().copied()));
        features
    }

    fn float(features: &FeatureVector, name: &str) -> f64 {
        features.get(name).map(|v| v.as_f64()).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_lengths_are_log_scaled() {
        let features = run(&ProtocolLength, "https://example.com/abc?x=1");
        assert_eq!(features.get("is_https"), Some(FeatureValue::Flag(true)));
        assert!((float(&features, "url_len") - 27f64.ln_1p()).abs() < 1e-12);
        assert!((float(&features, "hostname_len") - 11f64.ln_1p()).abs() < 1e-12);
        assert!((float(&features, "path_len") - 4f64.ln_1p()).abs() < 1e-12);
        assert_eq!(features.get("query_len"), Some(FeatureValue::Int(3)));
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let features = run(&ProtocolLength, "http://é.com");
        assert!((float(&features, "hostname_len") - 5f64.ln_1p()).abs() < 1e-12);
    }

    #[test]
    fn test_schemeless_input_is_http() {
        let features = run(&ProtocolLength, "example.com");
        assert_eq!(features.get("is_https"), Some(FeatureValue::Flag(false)));
    }

    #[test]
    fn test_dotted_quad_detection() {
        let host = AddressHost::new();
        assert!(host.is_ip("192.168.1.1"));
        assert!(host.is_ip("999.999.999.999"));
        assert!(!host.is_ip("1.2.3"));
        assert!(!host.is_ip("1.2.3.4.5"));
        assert!(!host.is_ip("1234.1.1.1"));
        assert!(!host.is_ip("example.com"));
        assert!(!host.is_ip(""));

        let features = run(&host, "http://user@10.0.0.1:8080/");
        assert_eq!(features.get("is_ip"), Some(FeatureValue::Flag(true)));
    }

    #[test]
    fn test_special_character_counts() {
        let features = run(
            &SpecialCharacters,
            "http://a-b-c.example.com/x_y?u=1&v=%41@",
        );
        assert_eq!(features.get("count_-"), Some(FeatureValue::Int(2)));
        assert_eq!(features.get("count_@"), Some(FeatureValue::Int(1)));
        assert_eq!(features.get("count_?"), Some(FeatureValue::Int(1)));
        assert_eq!(features.get("count_%"), Some(FeatureValue::Int(1)));
        assert_eq!(features.get("count_."), Some(FeatureValue::Int(2)));
        assert_eq!(features.get("count_="), Some(FeatureValue::Int(2)));
        assert_eq!(features.get("count__"), Some(FeatureValue::Int(1)));
        assert_eq!(features.get("count_&"), Some(FeatureValue::Int(1)));
    }

    #[test]
    fn test_query_structure() {
        let empty = run(&QueryStructure, "http://example.com/");
        assert_eq!(empty.get("query_param_count"), Some(FeatureValue::Int(0)));
        assert_eq!(
            empty.get("has_percent_encoding"),
            Some(FeatureValue::Flag(false))
        );

        let three = run(&QueryStructure, "http://example.com/?a=1&b=2&c=%2F");
        assert_eq!(three.get("query_param_count"), Some(FeatureValue::Int(3)));
        assert_eq!(
            three.get("has_percent_encoding"),
            Some(FeatureValue::Flag(true))
        );

        // Percent signs outside the query do not count.
        let path_only = run(&QueryStructure, "http://example.com/%41");
        assert_eq!(
            path_only.get("has_percent_encoding"),
            Some(FeatureValue::Flag(false))
        );
    }

    #[test]
    fn test_character_class_ratios() {
        let features = run(&CharacterClasses, "http://a1.io");
        // "http://a1.io": 12 chars, 1 digit, 8 alphanumerics.
        assert!((float(&features, "digit_ratio") - 1.0 / 12.0).abs() < 1e-12);
        assert!((float(&features, "alnum_ratio") - 8.0 / 12.0).abs() < 1e-12);
    }
}
