//! `casewriter run`: Generate a full case study for one student.

use std::path::{Path, PathBuf};

use casewriter_config::{AppConfig, ConfigError, Credentials, PipelineVariant, SecretResolver};
use casewriter_core::StudentSpec;
use casewriter_core::error::{Error, InstructorError};
use casewriter_pipeline::{GenerationResults, RunReport, SECTIONS, build_writer};

pub struct RunArgs {
    pub company: String,
    pub job_title: String,
    pub output: PathBuf,
    pub show_steps: bool,
    pub variant: Option<PipelineVariant>,
    pub model: Option<String>,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(variant) = args.variant {
        config.pipeline.variant = variant;
    }
    if let Some(model) = args.model {
        config.override_model(model);
    }

    // Every required secret is checked before the first request goes out
    let resolver = SecretResolver::standard(&config)?;
    let needs_search = config.pipeline.variant.uses_search();
    let credentials = match Credentials::resolve(&config.default_provider, needs_search, &resolver) {
        Ok(credentials) => credentials,
        Err(ConfigError::MissingSecret { name, checked }) => {
            report_missing_secret(&name, &checked);
            return Err(format!("Missing required secret {name}. See above.").into());
        }
        Err(e) => return Err(e.into()),
    };

    let writer = build_writer(&config, &credentials)?;
    let student = StudentSpec::new(args.company, args.job_title);

    println!(
        "✍️  Writing a case study for {} ({}) with {} [{} chain]\n",
        student.company_name,
        student.job_title,
        writer.model(),
        writer.variant()
    );

    // Nothing can be generated before the instructor has saved a setup
    let report = match writer.run_saved(&config.instructor_path(), &student).await {
        Ok(report) => report,
        Err(Error::Instructor(InstructorError::NotFound(path))) => {
            eprintln!();
            eprintln!("  ERROR: No instructor setup found at {}", path.display());
            eprintln!();
            eprintln!("  Save one first:");
            eprintln!("    casewriter instructor save --case-topic \"How to break into a new market\"");
            eprintln!();
            return Err("Instructor setup missing. See above.".into());
        }
        Err(e) => return Err(e.into()),
    };

    std::fs::write(&args.output, &report.document)
        .map_err(|e| format!("Failed to write {}: {e}", args.output.display()))?;

    if args.show_steps {
        println!("{}", render_steps(&report.results));
    }

    println!("{}", summary_line(&args.output, &report));
    let failed = report.failed_steps();
    if !failed.is_empty() {
        println!("⚠️  Steps without output: {}", failed.join(", "));
    }

    Ok(())
}

fn report_missing_secret(name: &str, checked: &str) {
    eprintln!();
    eprintln!("  ERROR: Required secret {name} is not set!");
    eprintln!();
    eprintln!("  Checked: {checked}");
    eprintln!();
    eprintln!("  Set it in one of these places:");
    eprintln!("    export {name}='...'");
    eprintln!("    echo '{name}=...' >> .env");
    eprintln!("    {}  ({name} = \"...\")", AppConfig::secrets_path().display());
    eprintln!();
    eprintln!("  Web search keys are only needed for the researched and agentic chains;");
    eprintln!("  `casewriter run --variant basic` runs without them.");
    eprintln!();
}

fn summary_line(output: &Path, report: &RunReport) -> String {
    format!(
        "✅ Case study written to {} ({} of {} sections, {}s)",
        output.display(),
        report.sections_written(),
        SECTIONS.len(),
        report.duration().num_seconds()
    )
}

/// Every recorded step in display order, search results labelled separately.
fn render_steps(results: &GenerationResults) -> String {
    let mut out = String::from("Generation Process Details\n==========================\n");
    for entry in results.display_entries() {
        out.push_str(&format!("\n── {} ──\n", entry.label));
        match entry.value {
            Some(text) => out.push_str(text.trim_end()),
            None => out.push_str("(no output: this step failed)"),
        }
        out.push('\n');
    }
    out
}
