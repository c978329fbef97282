//! `casewriter onboard`: First-time setup.

use casewriter_config::AppConfig;
use casewriter_config::secrets::{GEMINI_API_KEY, GOOGLE_SEARCH_API_KEY, SEARCH_ENGINE_ID};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let secrets_path = AppConfig::secrets_path();

    println!("casewriter: First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    if secrets_path.exists() {
        println!("  Secret store exists: {}", secrets_path.display());
    } else {
        std::fs::write(&secrets_path, secrets_template())?;
        println!("✅ Created secret store template at: {}", secrets_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Add your keys to {} (or export them / put them in ./.env)", secrets_path.display());
    println!("   2. Run: casewriter instructor save --case-topic \"...\"");
    println!("   3. Run: casewriter run --company \"...\" --job-title \"...\"\n");

    Ok(())
}

fn secrets_template() -> String {
    format!(
        "# Deployment secret store. Environment variables and ./.env take precedence.\n\
         # {GEMINI_API_KEY} = \"\"\n\
         # {GOOGLE_SEARCH_API_KEY} = \"\"\n\
         # {SEARCH_ENGINE_ID} = \"\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_valid_empty_toml() {
        let table: toml::Table = toml::from_str(&secrets_template()).unwrap();
        assert!(table.is_empty());
        assert!(secrets_template().contains("GOOGLE_SEARCH_API_KEY"));
    }
}
