//! `casewriter instructor`: Save or show the course-level setup.

use casewriter_config::AppConfig;
use casewriter_core::InstructorSpec;
use casewriter_core::error::InstructorError;
use clap::Args;

/// Setup fields; anything not given keeps its default.
#[derive(Debug, Default, Args)]
pub struct InstructorFields {
    #[arg(long)]
    pub institution: Option<String>,

    #[arg(long)]
    pub course_title: Option<String>,

    #[arg(long)]
    pub discipline: Option<String>,

    #[arg(long)]
    pub target_audience: Option<String>,

    #[arg(long)]
    pub case_topic: Option<String>,

    #[arg(long)]
    pub learning_objectives: Option<String>,

    #[arg(long)]
    pub student_questions: Option<String>,
}

impl InstructorFields {
    pub fn into_spec(self) -> InstructorSpec {
        let defaults = InstructorSpec::default();
        InstructorSpec {
            institution: self.institution.unwrap_or(defaults.institution),
            course_title: self.course_title.unwrap_or(defaults.course_title),
            discipline: self.discipline.unwrap_or(defaults.discipline),
            target_audience: self.target_audience.unwrap_or(defaults.target_audience),
            case_topic: self.case_topic.unwrap_or(defaults.case_topic),
            learning_objectives: self
                .learning_objectives
                .unwrap_or(defaults.learning_objectives),
            student_questions: self.student_questions.unwrap_or(defaults.student_questions),
        }
    }
}

pub async fn save(fields: InstructorFields, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let path = config.instructor_path();
    let spec = fields.into_spec();

    match spec.save(&path, force) {
        Ok(()) => {
            println!("✅ Instructor setup saved to {}", path.display());
            println!("   Topic: {}", spec.case_topic);
            Ok(())
        }
        Err(InstructorError::AlreadySaved(path)) => {
            eprintln!();
            eprintln!("  An instructor setup is already saved at {}", path.display());
            eprintln!("  It is kept as-is. Re-run with --force to replace it.");
            eprintln!();
            Err("Instructor setup already saved".into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let path = config.instructor_path();
    let spec = InstructorSpec::load(&path)?;

    println!("Instructor setup ({})", path.display());
    println!("========================================\n");
    println!("  Institution:        {}", spec.institution);
    println!("  Course:             {}", spec.course_title);
    println!("  Discipline:         {}", spec.discipline);
    println!("  Target audience:    {}", spec.target_audience);
    println!("  Case topic:         {}", spec.case_topic);
    println!("\n  Learning objectives:\n{}", indent(&spec.learning_objectives));
    println!("\n  Questions for students:\n{}", indent(&spec.student_questions));

    Ok(())
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
