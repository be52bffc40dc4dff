use super::{FeatureFamily, FeatureVector, UrlContext};
use crate::psl::{DomainParts, SuffixList};
use std::sync::Arc;

/// Suffixes that count as "common"; everything else, including an unknown
/// or missing suffix, does not.
pub const COMMON_TLDS: [&str; 6] = ["com", "org", "net", "edu", "gov", "io"];

/// Subdomain depth and suffix commonness from a public-suffix split.
pub struct DomainStructure {
    suffixes: Arc<SuffixList>,
}

impl DomainStructure {
    pub fn new(suffixes: Arc<SuffixList>) -> Self {
        Self { suffixes }
    }

    pub fn split(&self, hostname: &str) -> DomainParts {
        self.suffixes.split(hostname)
    }
}

impl FeatureFamily for DomainStructure {
    fn name(&self) -> &str {
        "domain_structure"
    }

    fn columns(&self) -> &'static [&'static str] {
        &["subdomain_depth", "tld_is_common"]
    }

    fn extract(&self, context: &UrlContext, features: &mut FeatureVector) {
        let parts = self.split(&context.url.hostname);
        features.insert("subdomain_depth", parts.subdomain_depth());
        features.insert("tld_is_common", COMMON_TLDS.contains(&parts.suffix.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tokens::Tokenizer;
    use crate::features::FeatureValue;

    fn run(raw: &str) -> FeatureVector {
        let family = DomainStructure::new(Arc::new(SuffixList::builtin()));
        let context = UrlContext::new(raw, &Tokenizer::new());
        let mut features = FeatureVector::new();
        family.extract(&context, &mut features);
        features
    }

    #[test]
    fn test_subdomain_depth() {
        assert_eq!(
            run("https://example.com").get("subdomain_depth"),
            Some(FeatureValue::Int(0))
        );
        assert_eq!(
            run("https://www.example.com").get("subdomain_depth"),
            Some(FeatureValue::Int(1))
        );
        assert_eq!(
            run("http://a.b.c.example.co.uk/x").get("subdomain_depth"),
            Some(FeatureValue::Int(3))
        );
    }

    #[test]
    fn test_subdomain_depth_for_country_code_domains() {
        for url in [
            "https://www.example.pt",
            "https://www.example.ai",
            "https://www.example.com.sa",
            "https://www.example.gg",
        ] {
            assert_eq!(
                run(url).get("subdomain_depth"),
                Some(FeatureValue::Int(1)),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_common_tld() {
        for (url, common) in [
            ("https://example.com", true),
            ("https://example.io", true),
            ("https://example.gov", true),
            ("https://example.tk", false),
            ("https://example.co.uk", false),
            ("https://example.unknowntld", false),
            ("http://10.1.1.1", false),
        ] {
            assert_eq!(
                run(url).get("tld_is_common"),
                Some(FeatureValue::Flag(common)),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_empty_hostname() {
        let features = run("");
        assert_eq!(features.get("subdomain_depth"), Some(FeatureValue::Int(0)));
        assert_eq!(features.get("tld_is_common"), Some(FeatureValue::Flag(false)));
    }
}
