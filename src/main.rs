use anyhow::Context;
use clap::{Arg, Command};
use contact_vetter::batch::{process_record_set, BatchOutcome};
use contact_vetter::similarity::find_similar_profiles;
use contact_vetter::{Config, RawStudentRecord, ValidatorEngine};
use log::LevelFilter;
use std::process;

fn main() {
    let matches = Command::new("contact-vetter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validates student contact records and tracks where they came from")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Policy configuration file path")
                .default_value("contact-vetter.yaml"),
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
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Student records to validate (JSON or YAML array)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("similar")
                .long("similar")
                .value_name("ID")
                .help("List accepted profiles similar to the given student id")
                .value_parser(clap::value_parser!(u32))
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .value_name("N")
                .help("Maximum number of similar profiles")
                .value_parser(clap::value_parser!(usize))
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-email")
                .long("check-email")
                .value_name("ADDRESS")
                .help("Check a single email address against the policy")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("TAG")
                .help("Declared source used with --check-email")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-phone")
                .long("check-phone")
                .value_name("NUMBER")
                .help("Check a single phone number against the policy")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-url")
                .long("check-url")
                .value_name("URL")
                .help("Check a single source URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("show-review")
                .long("show-review")
                .help("Also list the manual review queue and rejection ledger")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging, one line per rejection")
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
        .unwrap_or("contact-vetter.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    let mut engine = match ValidatorEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        print_config_summary(&engine);
        return;
    }

    if let Some(address) = matches.get_one::<String>("check-email") {
        let source = matches.get_one::<String>("source").map(String::as_str);
        match engine.check_email(address, source) {
            Ok(email) => println!(
                "✅ {}: VERIFIED (provider: {})",
                email.address, email.provider
            ),
            Err(reason) => println!("❌ {}: REJECTED ({reason})", address.trim()),
        }
        return;
    }

    if let Some(number) = matches.get_one::<String>("check-phone") {
        match engine.check_phone(number) {
            Ok(phone) => match phone.calling_code {
                Some(code) => println!("✅ {}: VERIFIED (calling code {code})", phone.number),
                None => println!("✅ {}: VERIFIED", phone.number),
            },
            Err(reason) => println!("❌ {}: REJECTED ({reason})", number.trim()),
        }
        return;
    }

    if let Some(url) = matches.get_one::<String>("check-url") {
        match engine.check_source_url(url) {
            Ok(source) => println!("✅ {}: VALID (domain {})", source.url, source.domain),
            Err(reason) => println!("❌ {}: REJECTED ({reason})", url.trim()),
        }
        return;
    }

    let Some(input_path) = matches.get_one::<String>("input") else {
        eprintln!("❌ No input given; use --input FILE (or --check-email / --check-phone / --check-url)");
        process::exit(1);
    };

    let records = match load_records(input_path) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ Error reading records: {e:#}");
            process::exit(1);
        }
    };

    let outcome = process_record_set(&mut engine, &records);
    let json = matches.get_one::<String>("format").map(String::as_str) == Some("json");

    if let Some(&target_id) = matches.get_one::<u32>("similar") {
        let Some(target) = outcome.accepted.iter().find(|r| r.id == target_id) else {
            eprintln!("❌ Student {target_id} is not among the accepted records");
            process::exit(1);
        };
        let weights = &engine.config().similarity;
        let count = matches
            .get_one::<usize>("count")
            .copied()
            .unwrap_or(weights.default_count);
        let similar = find_similar_profiles(target, &outcome.accepted, count, weights);

        if json {
            print_json(&similar);
        } else {
            println!("🔎 Profiles similar to {} ({}):", target.display_name(), target_id);
            if similar.is_empty() {
                println!("  (none above the relevance floor)");
            }
            for scored in &similar {
                println!(
                    "  • [{}] {} - {} / {} / {} (score {})",
                    scored.record.id,
                    scored.record.display_name(),
                    scored.record.domain,
                    scored.record.level,
                    scored.record.specialization,
                    scored.score
                );
            }
        }
        return;
    }

    if json {
        print_json(&outcome);
    } else {
        print_report(&outcome);
    }

    if matches.get_flag("show-review") {
        print_review(&engine, &outcome, json);
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn load_records(path: &str) -> anyhow::Result<Vec<RawStudentRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {path}"))?;
    let records: Vec<RawStudentRecord> = if path.ends_with(".yaml") || path.ends_with(".yml") {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML records: {path}"))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON records: {path}"))?
    };
    Ok(records)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize output: {e}");
            process::exit(1);
        }
    }
}

fn print_config_summary(engine: &ValidatorEngine) {
    let config = engine.config();
    println!("🔍 Testing configuration...");
    println!();
    println!(
        "  Source URL:          {}",
        if config.policy.require_source_url {
            "required (records without one are dropped)"
        } else {
            "optional"
        }
    );
    println!("  Authorized sources:  {}", engine.sources().tags().join(", "));
    println!(
        "  Email providers:     {} (+ {}*)",
        config.email.allowed_providers.join(", "),
        config.email.institutional_prefix
    );
    println!("  Email TLDs:          {}", config.email.allowed_tlds.join(", "));
    println!("  Forbidden domains:   {}", config.email.forbidden_domains.len());
    println!("  Generic patterns:    {}", config.email.generic_patterns.len());
    println!(
        "  Blacklisted emails:  {}",
        config.email.blacklisted_addresses.len()
    );
    if config.phone.restrict_calling_codes {
        println!(
            "  Phone:               {} calling codes, {}-{} digits",
            config.phone.allowed_calling_codes.len(),
            config.phone.national_digits.min,
            config.phone.national_digits.max
        );
    } else {
        println!(
            "  Phone:               any calling code, {}-{} digits",
            config.phone.international_digits.min, config.phone.international_digits.max
        );
    }
    println!();
    println!("✅ All patterns compiled successfully.");
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn print_report(outcome: &BatchOutcome) {
    let quality = &outcome.contact_quality;
    let stats = &outcome.stats;

    println!("📊 Contact Validation Report");
    println!("═══════════════════════════════════════");
    println!();
    println!("📈 Accepted Profiles: {}", quality.total_valid);
    println!(
        "  ├─ Excellent (email + phone): {} ({:.1}%)",
        quality.excellent,
        percent(quality.excellent, quality.total_valid)
    );
    println!(
        "  ├─ Good: {} ({:.1}%)",
        quality.good,
        percent(quality.good, quality.total_valid)
    );
    println!("  │   ├─ Email only: {}", quality.email_only);
    println!("  │   └─ Phone only: {}", quality.phone_only);
    println!("  └─ With source URL: {}", quality.with_source_url);
    println!();
    println!("🚫 Rejections: {} distinct", stats.total_rejected);
    for (reason, count) in &stats.rejection_reasons {
        println!("  • {reason}: {count}");
    }
    println!();
    println!("📝 Pending manual review: {}", stats.manual_review_pending);
    println!("🔗 Source URLs tracked: {}", stats.source_urls_tracked);
    if stats.skipped_missing_identity > 0 {
        println!(
            "⚠️  Skipped (missing name): {}",
            stats.skipped_missing_identity
        );
    }

    if !outcome.source_domain_stats.is_empty() {
        println!();
        println!("🌐 Top sources:");
        let mut domains: Vec<(&String, &usize)> = outcome.source_domain_stats.iter().collect();
        domains.sort_by(|a, b| b.1.cmp(a.1));
        for (domain, count) in domains {
            println!("  • {domain}: {count}");
        }
    }

    if !outcome.email_domain_stats.is_empty() {
        println!();
        println!("📧 Verified email domains:");
        for entry in &outcome.email_domain_stats {
            println!("  • {}: {}", entry.domain, entry.count);
        }
    }

    if !outcome.source_validation_stats.is_empty() {
        println!();
        println!("🗂️  Email status by declared source:");
        for (source, counts) in &outcome.source_validation_stats {
            println!(
                "  • {source}: {} total, {} verified, {} rejected, {} missing, {} manual",
                counts.total, counts.verified, counts.rejected, counts.missing, counts.manual
            );
        }
    }

    println!();
    println!("✅ Accepted:");
    for record in &outcome.accepted {
        println!(
            "  • [{}] {} ({}, {}) - {:?} - {}",
            record.id,
            record.display_name(),
            record.country,
            record.domain,
            record.contact_quality,
            record.source_domain.as_deref().unwrap_or("no source")
        );
    }
}

fn print_review(engine: &ValidatorEngine, outcome: &BatchOutcome, json: bool) {
    let ledger = engine.ledger();
    if json {
        let entries: Vec<_> = ledger.entries().collect();
        print_json(&serde_json::json!({
            "manualReviewQueue": outcome.manual_review_queue,
            "rejections": entries,
            "tracedSourceDomains": ledger.source_domain_stats(),
        }));
        return;
    }

    println!();
    println!("📝 Manual review queue ({}):", outcome.manual_review_queue.len());
    for entry in &outcome.manual_review_queue {
        println!(
            "  • [{}] {} ({}, {}) - {} - {}",
            entry.student_id,
            entry.name,
            entry.country,
            entry.domain,
            entry.reason,
            entry.source_url.as_deref().unwrap_or("no source URL")
        );
    }

    println!();
    println!("🚫 Rejection ledger:");
    for entry in ledger.entries() {
        println!(
            "  • {} - {} x{} (first seen {})",
            entry.value,
            entry.reason,
            entry.count,
            entry.first_seen_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    println!();
    println!("🔗 Traced source domains:");
    for (domain, count) in ledger.source_domain_stats() {
        println!("  • {domain}: {count}");
    }
}
