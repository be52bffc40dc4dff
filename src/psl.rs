//! Public-suffix lookup for splitting a hostname into subdomain, registered
//! domain and public suffix.
//!
//! Rules use the Mozilla Public Suffix List format. A snapshot of the full
//! list is compiled in; a newer copy can be loaded from disk instead.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

const PRIVATE_SECTION_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

/// The Mozilla Public Suffix List snapshot shipped with the crate
/// (`data/public_suffix_list.dat`). ICANN and private sections.
const BUILTIN_RULES: &str = include_str!("../data/public_suffix_list.dat");

/// Hostname decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// `domain.suffix`, or empty when either part is missing.
    pub fn registered_domain(&self) -> String {
        if self.domain.is_empty() || self.suffix.is_empty() {
            String::new()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }

    /// Number of dot-separated labels in the subdomain part.
    pub fn subdomain_depth(&self) -> usize {
        if self.subdomain.is_empty() {
            0
        } else {
            self.subdomain.split('.').count()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuffixList {
    exact: HashSet<String>,
    /// Parents of `*.parent` rules.
    wildcard: HashSet<String>,
    /// Names from `!name` rules.
    exception: HashSet<String>,
}

impl SuffixList {
    /// The compiled-in list, ICANN section only.
    pub fn builtin() -> Self {
        Self::from_psl_text(BUILTIN_RULES, false)
    }

    pub fn builtin_with_private() -> Self {
        Self::from_psl_text(BUILTIN_RULES, true)
    }

    /// Parse PSL-formatted text. Rules after the private-section marker are
    /// skipped unless `include_private` is set.
    pub fn from_psl_text(content: &str, include_private: bool) -> Self {
        let mut list = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.contains(PRIVATE_SECTION_MARKER) && !include_private {
                break;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            // Only the text up to the first whitespace is the rule.
            let rule = match line.split_whitespace().next() {
                Some(rule) => rule.to_lowercase(),
                None => continue,
            };

            if let Some(name) = rule.strip_prefix('!') {
                list.exception.insert(name.to_string());
            } else if let Some(parent) = rule.strip_prefix("*.") {
                list.wildcard.insert(parent.to_string());
            } else {
                list.exact.insert(rule);
            }
        }

        list
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, include_private: bool) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read public suffix list: {}", path.display()))?;
        let list = Self::from_psl_text(&content, include_private);
        log::info!(
            "Loaded {} public suffix rules from {}",
            list.rule_count(),
            path.display()
        );
        Ok(list)
    }

    /// Load `path` when given and present, otherwise fall back to the
    /// built-in rules.
    pub fn load_or_builtin(path: Option<&Path>, include_private: bool) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_file(path, include_private),
            Some(path) => {
                log::warn!(
                    "Public suffix list {} not found, using built-in rules",
                    path.display()
                );
                Ok(Self::builtin_for(include_private))
            }
            None => {
                let list = Self::builtin_for(include_private);
                log::info!("Using {} built-in public suffix rules", list.rule_count());
                Ok(list)
            }
        }
    }

    fn builtin_for(include_private: bool) -> Self {
        if include_private {
            Self::builtin_with_private()
        } else {
            Self::builtin()
        }
    }

    pub fn rule_count(&self) -> usize {
        self.exact.len() + self.wildcard.len() + self.exception.len()
    }

    /// Split a lowercase hostname.
    ///
    /// Hosts matching no rule get an empty suffix, with the last label as the
    /// domain. IPv4 literals are returned whole as the domain.
    pub fn split(&self, host: &str) -> DomainParts {
        let host = host.strip_suffix('.').unwrap_or(host);
        if host.is_empty() {
            return DomainParts::default();
        }
        if host.parse::<Ipv4Addr>().is_ok() {
            return DomainParts {
                domain: host.to_string(),
                ..DomainParts::default()
            };
        }

        let labels: Vec<&str> = host.split('.').collect();
        let index = self.suffix_index(&labels);

        DomainParts {
            subdomain: if index >= 2 {
                labels[..index - 1].join(".")
            } else {
                String::new()
            },
            domain: if index > 0 {
                labels[index - 1].to_string()
            } else {
                String::new()
            },
            suffix: labels[index..].join("."),
        }
    }

    /// Index of the first label of the longest matching public suffix, or
    /// `labels.len()` when nothing matches.
    fn suffix_index(&self, labels: &[&str]) -> usize {
        for i in 0..labels.len() {
            let candidate = labels[i..].join(".");
            if self.exception.contains(&candidate) {
                return i + 1;
            }
            if self.exact.contains(&candidate) {
                return i;
            }
            if i + 1 < labels.len() && self.wildcard.contains(&labels[i + 1..].join(".")) {
                return i;
            }
        }
        labels.len()
    }
}
