//! `casewriter doctor`: Diagnose configuration, setup and credentials.

use casewriter_config::secrets::{GOOGLE_SEARCH_API_KEY, SEARCH_ENGINE_ID, generation_key_name};
use casewriter_config::{AppConfig, SecretResolver};
use casewriter_core::InstructorSpec;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 casewriter Doctor: System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!("\n  ⚠️  Fix the config file before running further checks.");
                return Ok(());
            }
        }
    } else {
        println!("  ⚠️  No config file, using defaults (run `casewriter onboard` to create one)");
        AppConfig::default()
    };

    println!(
        "  ℹ️  Provider: {} / model: {} / chain: {}",
        config.default_provider, config.active_model(), config.pipeline.variant
    );

    // Check instructor setup
    let instructor_path = config.instructor_path();
    match InstructorSpec::load(&instructor_path) {
        Ok(spec) => println!("  ✅ Instructor setup saved (topic: {})", spec.case_topic),
        Err(e) => {
            println!("  ❌ {e}; run `casewriter instructor save`");
            issues += 1;
        }
    }

    // Check credentials
    let resolver = match SecretResolver::standard(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            println!("  ❌ Secret store unreadable: {e}");
            return Ok(());
        }
    };

    let mut required: Vec<&str> = generation_key_name(&config.default_provider)
        .into_iter()
        .collect();
    if config.pipeline.variant.uses_search() {
        required.extend([GOOGLE_SEARCH_API_KEY, SEARCH_ENGINE_ID]);
    }

    for name in required {
        if resolver.lookup(name).is_some() {
            println!("  ✅ {name} set");
        } else {
            println!("  ❌ {name} missing (checked: {})", resolver.checked());
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
