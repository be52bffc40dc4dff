use anyhow::Context;
use clap::{Arg, Command};
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;
use url_risk::{
    load_config_or_default, AppConfig, FeatureExtractor, ScoringPipeline, ScoringResult,
    Tier, Verdict,
};

/// Contributions printed per URL with `--explain`.
const TOP_CONTRIBUTIONS: usize = 10;

#[derive(Clone, Copy)]
struct OutputOptions {
    json: bool,
    explain: bool,
}

fn main() {
    let matches = Command::new("url-risk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Score URLs for phishing and malware risk")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("url-risk.yaml"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging, including per-URL tier decisions")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Score a single URL and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Score every non-blank line of FILE")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("explain")
                .long("explain")
                .help("Show the features that contributed most to each score")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .value_name("URL")
                .help("Print the extracted feature vector for a URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load every configured file and report what was found")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("url-risk.yaml");

    let config = match load_config_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    let options = OutputOptions {
        json: matches.get_flag("json"),
        explain: matches.get_flag("explain"),
    };

    if let Some(url) = matches.get_one::<String>("features") {
        print_features(&config, url, options.json);
        return;
    }

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let pipeline = match config.build_pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error initializing scorer: {e:#}");
            process::exit(1);
        }
    };

    if let Some(url) = matches.get_one::<String>("url") {
        report(&pipeline, url, options);
        return;
    }

    if let Some(batch_file) = matches.get_one::<String>("batch") {
        if let Err(e) = run_batch(&pipeline, batch_file, options) {
            eprintln!("Error processing batch file: {e:#}");
            process::exit(1);
        }
        return;
    }

    if let Err(e) = ctrlc::set_handler(|| {
        println!();
        process::exit(0);
    }) {
        log::warn!("Failed to install Ctrl-C handler: {e}");
    }

    if let Err(e) = run_interactive(&pipeline, options) {
        eprintln!("Error reading input: {e}");
        process::exit(1);
    }
}

fn generate_default_config(path: &str) {
    match AppConfig::default().to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Edit the file to point at your domain lists and model artifact.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: &AppConfig) {
    println!("🔍 Testing configuration...");
    println!();

    let pipeline = match config.build_pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => fail_config("scoring pipeline", e),
    };

    let tiers = pipeline.tiers();
    println!(
        "Trusted domains: {} ({})",
        tiers.trusted.len(),
        config.trusted_domains.display()
    );
    println!(
        "Platform hosts: {} ({})",
        tiers.platform.len(),
        config.platform_hosts.display()
    );

    let extractor = pipeline.extractor();
    println!("Feature families: {}", extractor.family_names().join(", "));

    let schema = extractor.schema();
    let model = pipeline.classifier();
    let missing = model
        .expected_columns()
        .iter()
        .filter(|column| !schema.iter().any(|name| *name == column.as_str()))
        .count();
    println!(
        "Classifier: {} ({} columns, {} not produced by the extractor)",
        model.name(),
        model.expected_columns().len(),
        missing
    );
    if missing > 0 {
        println!("⚠️  Missing columns are scored as 0");
    }

    let policy = pipeline.policy();
    println!(
        "Verdict thresholds: suspicious >= {}, high risk >= {}",
        policy.suspicious_threshold, policy.high_risk_threshold
    );

    println!();
    println!("✅ Configuration is valid");
}

fn fail_config(what: &str, error: anyhow::Error) -> ! {
    println!("❌ Failed to load {what}:");
    println!("Error: {error:#}");
    process::exit(1);
}

fn print_features(config: &AppConfig, url: &str, json: bool) {
    let suffixes = match config.load_suffix_list() {
        Ok(suffixes) => suffixes,
        Err(e) => {
            eprintln!("Error loading public suffix list: {e:#}");
            process::exit(1);
        }
    };
    let features = FeatureExtractor::new(Arc::new(suffixes)).extract(url);

    if json {
        match serde_json::to_string_pretty(&features) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error serializing features: {e}"),
        }
        return;
    }

    println!("Features for {url}:");
    for (name, value) in features.iter() {
        println!("  {name:<24} {value}");
    }
}

/// Score `url` and print it in the requested format.
fn report(pipeline: &ScoringPipeline, url: &str, options: OutputOptions) -> ScoringResult {
    let (result, contributions) = if options.explain {
        pipeline.score_explained(url)
    } else {
        (pipeline.score(url), Vec::new())
    };

    if options.json {
        let value = if options.explain {
            serde_json::json!({
                "result": &result,
                "contributions": contributions
                    .iter()
                    .take(TOP_CONTRIBUTIONS)
                    .collect::<Vec<_>>(),
            })
        } else {
            serde_json::json!(&result)
        };
        println!("{value}");
        return result;
    }

    print_text_block(&result);
    if options.explain {
        if contributions.is_empty() {
            println!("  (no classifier contributions: trusted host)");
        } else {
            println!("Top contributing features:");
            for contribution in contributions.iter().take(TOP_CONTRIBUTIONS) {
                println!(
                    "  {:<24} {:+.4}",
                    contribution.feature, contribution.weight
                );
            }
        }
    }
    result
}

fn print_text_block(result: &ScoringResult) {
    println!();
    println!("URL:         {}", result.url);
    println!("Hostname:    {}", result.hostname);
    println!("Tier:        {}", result.tier);
    println!("Probability: {:.4}", result.probability);
    println!("Risk score:  {}/100", result.risk_score);
    println!("Verdict:     {}", result.verdict);
}

fn run_batch(
    pipeline: &ScoringPipeline,
    path: &str,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {path}"))?;

    let mut summary = BatchSummary::default();
    for url in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let result = if options.json || options.explain {
            report(pipeline, url, options)
        } else {
            let result = pipeline.score(url);
            println!(
                "{:<10} {:>3}/100  {:<8} {}",
                result.verdict.as_str(),
                result.risk_score,
                result.tier.as_str(),
                result.url
            );
            result
        };
        summary.record(&result);
    }

    if options.json {
        log::info!("Scored {} URLs from {}", summary.total, path);
    } else {
        summary.print();
    }
    Ok(())
}

#[derive(Default)]
struct BatchSummary {
    total: usize,
    by_verdict: [usize; 3],
    by_tier: [usize; 3],
}

impl BatchSummary {
    fn record(&mut self, result: &ScoringResult) {
        self.total += 1;
        self.by_verdict[match result.verdict {
            Verdict::LowRisk => 0,
            Verdict::Suspicious => 1,
            Verdict::HighRisk => 2,
        }] += 1;
        self.by_tier[match result.tier {
            Tier::Trusted => 0,
            Tier::Platform => 1,
            Tier::Normal => 2,
        }] += 1;
    }

    fn print(&self) {
        println!();
        println!("📊 Scored {} URLs", self.total);
        println!("═══════════════════════════════════════");
        for (verdict, count) in [Verdict::LowRisk, Verdict::Suspicious, Verdict::HighRisk]
            .iter()
            .zip(self.by_verdict)
        {
            println!("  {:<12} {}", verdict.as_str(), count);
        }
        println!();
        for (tier, count) in [Tier::Trusted, Tier::Platform, Tier::Normal]
            .iter()
            .zip(self.by_tier)
        {
            println!("  {:<12} {}", tier.as_str(), count);
        }
    }
}

fn run_interactive(pipeline: &ScoringPipeline, options: OutputOptions) -> io::Result<()> {
    println!("URL risk scorer. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("\nEnter URL: ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        report(pipeline, input, options);
    }
    Ok(())
}
