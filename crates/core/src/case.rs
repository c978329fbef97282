//! Case inputs: what the instructor sets up once and what each student run adds.
//!
//! The instructor setup is saved as TOML and treated as immutable afterwards;
//! a run refuses to start until it exists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::InstructorError;

/// Course-level parameters shared by every generated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorSpec {
    #[serde(default = "default_institution")]
    pub institution: String,

    #[serde(default = "default_course_title")]
    pub course_title: String,

    #[serde(default = "default_discipline")]
    pub discipline: String,

    #[serde(default = "default_target_audience")]
    pub target_audience: String,

    #[serde(default = "default_case_topic")]
    pub case_topic: String,

    #[serde(default = "default_learning_objectives")]
    pub learning_objectives: String,

    #[serde(default = "default_student_questions")]
    pub student_questions: String,
}

fn default_institution() -> String {
    "Harvard Business School".into()
}
fn default_course_title() -> String {
    "Strategic Management".into()
}
fn default_discipline() -> String {
    "Business Strategy".into()
}
fn default_target_audience() -> String {
    "MBA Students".into()
}
fn default_case_topic() -> String {
    "How to break into a new market".into()
}
fn default_learning_objectives() -> String {
    "1. Apply Porter's Five Forces to the new market.\n\
     2. Evaluate the pros and cons of different market entry modes.\n\
     3. Conduct a SWOT analysis of a key player."
        .into()
}
fn default_student_questions() -> String {
    "1. What are the primary barriers to entry in this market?\n\
     2. Which entry strategy would you recommend and why?\n\
     3. What are the biggest risks associated with your recommended strategy?"
        .into()
}

impl Default for InstructorSpec {
    fn default() -> Self {
        Self {
            institution: default_institution(),
            course_title: default_course_title(),
            discipline: default_discipline(),
            target_audience: default_target_audience(),
            case_topic: default_case_topic(),
            learning_objectives: default_learning_objectives(),
            student_questions: default_student_questions(),
        }
    }
}

impl InstructorSpec {
    /// Load a saved instructor setup.
    ///
    /// Unlike configuration, a missing file is an error: nothing can be
    /// generated before the instructor has saved a setup.
    pub fn load(path: &Path) -> Result<Self, InstructorError> {
        if !path.exists() {
            return Err(InstructorError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| InstructorError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| InstructorError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save this setup. Refuses to replace an existing one unless `overwrite`.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<(), InstructorError> {
        if path.exists() && !overwrite {
            return Err(InstructorError::AlreadySaved(path.to_path_buf()));
        }

        let write_err = |reason: String| InstructorError::WriteError {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| write_err(e.to_string()))
    }
}

/// The per-run parameters a student supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSpec {
    pub company_name: String,
    pub job_title: String,
}

impl StudentSpec {
    pub fn new(company_name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            job_title: job_title.into(),
        }
    }
}

impl Default for StudentSpec {
    fn default() -> Self {
        Self::new("Apple", "Head of Global Strategy")
    }
}
