#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use url_risk::features::tokens::KEYWORDS;
use url_risk::{FeatureExtractor, FeatureValue, FeatureVector, SuffixList};

const EXAMPLE_URLS: [&str; 8] = [
    // legitimate
    "https://www.google.com",
    "https://github.com/user/repo",
    "https://www.amazon.com/product?id=123",
    // suspicious
    "http://login-paypal-verify.suspicious-domain.com/secure/update?token=abc",
    "http://192.168.1.1/admin/login",
    "http://accounts-google.verify-login.tk/signin?redirect=home",
    "http://www.paypa1.com/login",
    "http://secure-account-verification-required.long-suspicious-domain.com/update/password?session=12345&redirect=true",
];

/// Additive score at or above which a URL is flagged.
const HEURISTIC_THRESHOLD: u32 = 5;

fn flag(features: &FeatureVector, name: &str) -> bool {
    features.get(name) == Some(FeatureValue::Flag(true))
}

fn count(features: &FeatureVector, name: &str) -> f64 {
    features.get(name).map(|v| v.as_f64()).unwrap_or(0.0)
}

fn main() {
    env_logger::init();

    let suffixes = Arc::new(SuffixList::builtin());
    let extractor = FeatureExtractor::new(Arc::clone(&suffixes));

    println!("{}", "=".repeat(80));
    println!("URL FEATURE EXAMPLES");
    println!("{}", "=".repeat(80));

    for (i, url) in EXAMPLE_URLS.iter().enumerate() {
        println!();
        println!("[{}] Testing: {}", i + 1, url);
        println!("{}", "-".repeat(80));

        let context = extractor.context(url);
        let features = extractor.extract_context(&context);
        let parts = suffixes.split(&context.url.hostname);
        let url_len = context.text.chars().count();

        let is_https = flag(&features, "is_https");
        let is_ip = flag(&features, "is_ip");
        println!("  HTTPS: {}", if is_https { "Yes" } else { "No" });
        println!("  IP Address: {}", if is_ip { "Yes" } else { "No" });
        println!("  URL Length: {}", url_len);
        println!(
            "  Hostname Length: {}",
            context.url.hostname.chars().count()
        );
        println!("  Subdomain Depth: {}", parts.subdomain_depth());
        println!("  Registered Domain: {}", parts.registered_domain());

        let keywords: Vec<&str> = KEYWORDS
            .iter()
            .filter(|(_, column)| flag(&features, column))
            .map(|(keyword, _)| *keyword)
            .collect();
        if !keywords.is_empty() {
            println!("  Suspicious Keywords: {}", keywords.join(", "));
        }

        let hyphens = count(&features, "count_-");
        println!(
            "  Special Chars: @ ({}), - ({}), . ({})",
            count(&features, "count_@"),
            hyphens,
            count(&features, "count_.")
        );

        let mut score = 0u32;
        if !is_https {
            score += 2;
        }
        if is_ip {
            score += 3;
        }
        if url_len > 75 {
            score += 2;
        }
        if parts.subdomain_depth() > 2 {
            score += 2;
        }
        score += keywords.len() as u32;
        if hyphens > 3.0 {
            score += 1;
        }

        println!(
            "  Heuristic Score: {}/10 {}",
            score,
            if score >= HEURISTIC_THRESHOLD {
                "⚠️ SUSPICIOUS"
            } else {
                "✓ Looks OK"
            }
        );
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("Test complete!");
    println!("{}", "=".repeat(80));
}
