//! Tiered risk scoring.
//!
//! Trusted hosts short-circuit to a fixed low score without touching the
//! classifier. Platform and normal hosts go through the classifier; platform
//! probabilities are dampened, then every non-trusted probability is clamped
//! and mapped to a 0-100 score and a verdict.

use crate::classifier::{Classifier, FeatureContribution};
use crate::domain_tier::{DomainTiers, Tier, TierMatch};
use crate::features::FeatureExtractor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exponent applied to platform-tier probabilities.
pub const PLATFORM_EXPONENT: i32 = 3;
/// Lowest probability a non-trusted URL can receive.
pub const PROBABILITY_FLOOR: f64 = 0.05;
/// Highest probability any URL can receive.
pub const PROBABILITY_CEILING: f64 = 0.95;
/// Risk score reported for trusted hosts.
pub const TRUSTED_RISK_SCORE: u8 = 5;
/// Scores at or above this are at least SUSPICIOUS.
pub const SUSPICIOUS_THRESHOLD: u8 = 40;
/// Scores at or above this are HIGH RISK.
pub const HIGH_RISK_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "LOW RISK")]
    LowRisk,
    #[serde(rename = "SUSPICIOUS")]
    Suspicious,
    #[serde(rename = "HIGH RISK")]
    HighRisk,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LowRisk => "LOW RISK",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::HighRisk => "HIGH RISK",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tunable constants of the scoring rules, defaulting to the values above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    pub platform_exponent: i32,
    pub probability_floor: f64,
    pub probability_ceiling: f64,
    pub trusted_risk_score: u8,
    pub suspicious_threshold: u8,
    pub high_risk_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            platform_exponent: PLATFORM_EXPONENT,
            probability_floor: PROBABILITY_FLOOR,
            probability_ceiling: PROBABILITY_CEILING,
            trusted_risk_score: TRUSTED_RISK_SCORE,
            suspicious_threshold: SUSPICIOUS_THRESHOLD,
            high_risk_threshold: HIGH_RISK_THRESHOLD,
        }
    }
}

impl ScoringPolicy {
    /// Tier adjustment followed by the clamp. NaN is treated as the ceiling,
    /// infinities land on the matching bound.
    pub fn adjust_probability(&self, tier: Tier, raw: f64) -> f64 {
        if !raw.is_finite() {
            log::warn!("Classifier returned non-finite probability {}", raw);
        }

        let mut p = raw;
        if tier == Tier::Platform {
            p = p.powi(self.platform_exponent);
        }
        if p.is_nan() {
            p = self.probability_ceiling;
        }

        self.probability_floor.max(self.probability_ceiling.min(p))
    }

    /// `round(p * 100)`, ties to even.
    pub fn risk_score(&self, probability: f64) -> u8 {
        (probability * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
    }

    pub fn verdict(&self, risk_score: u8) -> Verdict {
        if risk_score >= self.high_risk_threshold {
            Verdict::HighRisk
        } else if risk_score >= self.suspicious_threshold {
            Verdict::Suspicious
        } else {
            Verdict::LowRisk
        }
    }
}

/// Per-request outcome, serializable as-is for callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub url: String,
    pub hostname: String,
    pub tier: Tier,
    pub probability: f64,
    pub risk_score: u8,
    pub verdict: Verdict,
}

/// Scores URLs against the loaded allow-lists and classifier.
///
/// Holds only read-only state, so one instance can serve any number of
/// threads.
pub struct ScoringPipeline {
    extractor: FeatureExtractor,
    tiers: DomainTiers,
    classifier: Box<dyn Classifier>,
    policy: ScoringPolicy,
}

impl ScoringPipeline {
    pub fn new(
        extractor: FeatureExtractor,
        tiers: DomainTiers,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            extractor,
            tiers,
            classifier,
            policy: ScoringPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn tiers(&self) -> &DomainTiers {
        &self.tiers
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn score(&self, url: &str) -> ScoringResult {
        self.evaluate(url, false).0
    }

    /// Score `url` and report the classifier's per-feature contributions
    /// from the same pass. Contributions are empty for trusted hosts, which
    /// are never sent to the classifier.
    pub fn score_explained(&self, url: &str) -> (ScoringResult, Vec<FeatureContribution>) {
        self.evaluate(url, true)
    }

    fn evaluate(&self, url: &str, explain: bool) -> (ScoringResult, Vec<FeatureContribution>) {
        let context = self.extractor.context(url);
        let hostname = context.url.hostname.clone();
        if hostname.is_empty() {
            log::debug!("No hostname in {:?}; no allow-list can match", url);
        }

        let tier_match = self.tiers.classify(&hostname);
        log::debug!(
            "{} -> tier {} (trusted: {}, platform: {})",
            hostname,
            tier_match.tier,
            tier_match.is_trusted,
            tier_match.is_platform
        );

        if tier_match.tier == Tier::Trusted {
            let result = ScoringResult {
                url: url.to_string(),
                hostname,
                tier: Tier::Trusted,
                probability: 0.0,
                risk_score: self.policy.trusted_risk_score,
                verdict: Verdict::LowRisk,
            };
            return (result, Vec::new());
        }

        let features = self.extractor.extract_context(&context);
        let row = features.reindex(self.classifier.expected_columns());
        let raw = self.classifier.predict_probability(&row);
        let contributions = if explain {
            self.classifier.feature_contributions(&row)
        } else {
            Vec::new()
        };
        (self.finish(url, hostname, tier_match, raw), contributions)
    }

    fn finish(
        &self,
        url: &str,
        hostname: String,
        tier_match: TierMatch,
        raw: f64,
    ) -> ScoringResult {
        let probability = self.policy.adjust_probability(tier_match.tier, raw);
        let risk_score = self.policy.risk_score(probability);
        let verdict = self.policy.verdict(risk_score);

        log::debug!(
            "{}: raw {:.4} -> {:.4}, score {}, {}",
            hostname,
            raw,
            probability,
            risk_score,
            verdict
        );

        ScoringResult {
            url: url.to_string(),
            hostname,
            tier: tier_match.tier,
            probability,
            risk_score,
            verdict,
        }
    }
}
