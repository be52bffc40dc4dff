use crate::classifier::LogisticModel;
use crate::domain_tier::DomainTiers;
use crate::features::FeatureExtractor;
use crate::psl::SuffixList;
use crate::scoring::ScoringPipeline;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File locations the scorer loads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub trusted_domains: PathBuf,
    pub platform_hosts: PathBuf,
    pub model_path: PathBuf,
    /// Mozilla-format list; the built-in table is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_suffix_list: Option<PathBuf>,
    pub include_private_suffixes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            trusted_domains: PathBuf::from("config/trusted_domains.txt"),
            platform_hosts: PathBuf::from("config/platform_hosts.txt"),
            model_path: PathBuf::from("models/url_model.json"),
            public_suffix_list: None,
            include_private_suffixes: false,
        }
    }
}

impl AppConfig {
    /// Paths inside the file are taken relative to the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.trusted_domains);
        resolve(&mut self.platform_hosts);
        resolve(&mut self.model_path);
        if let Some(psl) = self.public_suffix_list.as_mut() {
            resolve(psl);
        }
    }

    pub fn load_suffix_list(&self) -> anyhow::Result<SuffixList> {
        SuffixList::load_or_builtin(
            self.public_suffix_list.as_deref(),
            self.include_private_suffixes,
        )
    }

    pub fn load_domain_tiers(&self) -> anyhow::Result<DomainTiers> {
        DomainTiers::load(&self.trusted_domains, &self.platform_hosts)
    }

    pub fn load_classifier(&self) -> anyhow::Result<LogisticModel> {
        LogisticModel::load_from_file(&self.model_path).with_context(|| {
            format!(
                "Failed to load classifier artifact: {}",
                self.model_path.display()
            )
        })
    }

    /// Load everything and assemble a ready pipeline.
    pub fn build_pipeline(&self) -> anyhow::Result<ScoringPipeline> {
        let suffixes = Arc::new(self.load_suffix_list()?);
        let tiers = self.load_domain_tiers()?;
        let classifier = self.load_classifier()?;

        Ok(ScoringPipeline::new(
            FeatureExtractor::new(suffixes),
            tiers,
            Box::new(classifier),
        ))
    }
}

/// Read `path`, or fall back to defaults when it does not exist.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    if path.exists() {
        AppConfig::from_file(path)
    } else {
        log::warn!(
            "Configuration file '{}' not found, using default configuration",
            path.display()
        );
        Ok(AppConfig::default())
    }
}
