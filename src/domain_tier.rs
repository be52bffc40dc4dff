//! Trusted/platform allow-list tiers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Lowercase domains read from a line-oriented list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    domains: HashSet<String>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One domain per line. Blank lines and `#` comments are skipped,
    /// surrounding whitespace is trimmed and entries are lowercased.
    pub fn from_lines(content: &str) -> Self {
        content
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// Load a domain list. A missing file yields an empty set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Domain list {} not found, using empty set", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain list: {}", path.display()))?;
        let set = Self::from_lines(&content);
        log::info!("Loaded {} domains from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// True when `hostname` equals a listed domain or is a subdomain of one.
    ///
    /// `sub.paypal.com` matches `paypal.com`; `notpaypal.com` does not.
    /// Walks the hostname's dot boundaries instead of scanning the set, so
    /// the cost depends on the label count only.
    pub fn matches(&self, hostname: &str) -> bool {
        if self.domains.is_empty() || hostname.is_empty() {
            return false;
        }

        let hostname: Cow<str> = if hostname.chars().any(char::is_uppercase) {
            Cow::Owned(hostname.to_lowercase())
        } else {
            Cow::Borrowed(hostname)
        };

        if self.domains.contains(hostname.as_ref()) {
            return true;
        }
        hostname
            .match_indices('.')
            .any(|(dot, _)| self.domains.contains(&hostname[dot + 1..]))
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            domains: iter.into_iter().map(|d| d.as_ref().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Trusted,
    Platform,
    Normal,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Trusted => "trusted",
            Tier::Platform => "platform",
            Tier::Normal => "normal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierMatch {
    pub tier: Tier,
    pub is_trusted: bool,
    pub is_platform: bool,
}

impl TierMatch {
    /// Platform membership overrides trust: shared hosting serves both
    /// legitimate and malicious content.
    pub fn from_flags(is_trusted: bool, is_platform: bool) -> Self {
        let tier = if is_platform {
            Tier::Platform
        } else if is_trusted {
            Tier::Trusted
        } else {
            Tier::Normal
        };

        Self {
            tier,
            is_trusted,
            is_platform,
        }
    }
}

pub fn classify_tier(hostname: &str, trusted: &DomainSet, platform: &DomainSet) -> TierMatch {
    TierMatch::from_flags(trusted.matches(hostname), platform.matches(hostname))
}

/// The two allow-lists, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DomainTiers {
    pub trusted: DomainSet,
    pub platform: DomainSet,
}

impl DomainTiers {
    pub fn new(trusted: DomainSet, platform: DomainSet) -> Self {
        Self { trusted, platform }
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(trusted_path: P, platform_path: Q) -> Result<Self> {
        Ok(Self {
            trusted: DomainSet::load(trusted_path)?,
            platform: DomainSet::load(platform_path)?,
        })
    }

    pub fn classify(&self, hostname: &str) -> TierMatch {
        classify_tier(hostname, &self.trusted, &self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(domains: &[&str]) -> DomainSet {
        domains.iter().collect()
    }

    #[test]
    fn test_from_lines_skips_comments_and_blanks() {
        let domains = DomainSet::from_lines("# trusted\n\n  PayPal.com  \ngoogle.com\n   \n#x.com\n");
        assert_eq!(domains.len(), 2);
        assert!(domains.contains("paypal.com"));
        assert!(domains.contains("google.com"));
        assert!(!domains.contains("x.com"));
    }

    #[test]
    fn test_suffix_match() {
        let domains = set(&["paypal.com"]);
        assert!(domains.matches("paypal.com"));
        assert!(domains.matches("sub.paypal.com"));
        assert!(domains.matches("a.b.paypal.com"));
        assert!(domains.matches("WWW.PayPal.com"));
        assert!(!domains.matches("notpaypal.com"));
        assert!(!domains.matches("evil-paypal.com"));
        assert!(!domains.matches("paypal.com.evil.net"));
        assert!(!domains.matches(""));
    }

    #[test]
    fn test_classify_tier_examples() {
        let trusted = set(&["paypal.com"]);
        let platform = DomainSet::new();

        assert_eq!(
            classify_tier("evil-paypal.com", &trusted, &platform).tier,
            Tier::Normal
        );
        let hit = classify_tier("sub.paypal.com", &trusted, &platform);
        assert_eq!(hit.tier, Tier::Trusted);
        assert!(hit.is_trusted);
        assert!(!hit.is_platform);
    }

    #[test]
    fn test_platform_takes_precedence() {
        let trusted = set(&["github.io", "google.com"]);
        let platform = set(&["github.io", "sites.google.com"]);

        let both = classify_tier("someone.github.io", &trusted, &platform);
        assert_eq!(both.tier, Tier::Platform);
        assert!(both.is_trusted && both.is_platform);

        // Listed platform subdomain of a trusted domain.
        assert_eq!(
            classify_tier("sites.google.com", &trusted, &platform).tier,
            Tier::Platform
        );
        assert_eq!(
            classify_tier("mail.google.com", &trusted, &platform).tier,
            Tier::Trusted
        );
    }

    #[test]
    fn test_empty_hostname_is_normal() {
        let tiers = DomainTiers::new(set(&["example.com"]), set(&["example.org"]));
        let result = tiers.classify("");
        assert_eq!(result.tier, Tier::Normal);
        assert!(!result.is_trusted && !result.is_platform);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let domains = DomainSet::load(dir.path().join("absent.txt")).unwrap();
        assert!(domains.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let trusted = dir.path().join("trusted.txt");
        let platform = dir.path().join("platform.txt");
        fs::write(&trusted, "# banks\nexample-bank.com\n").unwrap();
        fs::write(&platform, "herokuapp.com\nnetlify.app\n").unwrap();

        let tiers = DomainTiers::load(&trusted, &platform).unwrap();
        assert_eq!(tiers.trusted.len(), 1);
        assert_eq!(tiers.platform.len(), 2);
        assert_eq!(tiers.classify("login.example-bank.com").tier, Tier::Trusted);
        assert_eq!(tiers.classify("phish.herokuapp.com").tier, Tier::Platform);
        assert_eq!(tiers.classify("example.net").tier, Tier::Normal);
    }

    #[test]
    fn test_tier_display_and_serde() {
        assert_eq!(Tier::Platform.to_string(), "platform");
        assert_eq!(serde_json::to_string(&Tier::Trusted).unwrap(), "\"trusted\"");
    }
}
