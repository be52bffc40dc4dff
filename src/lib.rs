pub mod classifier;
pub mod config;
pub mod domain_tier;
pub mod error;
pub mod features;
pub mod normalizer;
pub mod psl;
pub mod scoring;

pub use classifier::{Classifier, FeatureContribution, LogisticModel};
pub use config::{load_config_or_default, AppConfig};
pub use domain_tier::{classify_tier, DomainSet, DomainTiers, Tier, TierMatch};
pub use error::ModelError;
pub use features::{FeatureExtractor, FeatureValue, FeatureVector, FEATURE_COLUMNS};
pub use normalizer::{normalize, NormalizedUrl};
pub use psl::{DomainParts, SuffixList};
pub use scoring::{ScoringPipeline, ScoringPolicy, ScoringResult, Verdict};
