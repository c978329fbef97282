//! The prompt orchestrator: runs the eleven-step chain for one student.
//!
//! Steps run strictly in order and never go back:
//!
//! | step | what | model call |
//! |------|------|------------|
//! | 0 | initial search battery (search variants) | no |
//! | 1 | research report | stateless |
//! | 2 | writer persona | none, or stateless in `generated` mode |
//! | 3 | outline | continuation |
//! | 4-10 | sections, optionally think-then-search first | continuation |
//! | 11 | collation | no |
//!
//! A failed step is recorded as `None` and the chain moves on. Only a
//! missing instructor setup stops a run before it starts.

use std::path::Path;

use casewriter_config::{PersonaMode, PipelineConfig, PipelineVariant, SectionFailurePolicy};
use casewriter_core::error::Result;
use casewriter_core::message::ConversationHistory;
use casewriter_core::{InstructorSpec, StudentSpec};
use casewriter_search::SearchClient;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::collate::collate;
use crate::decision::SearchDecision;
use crate::generation::GenerationClient;
use crate::prompts::{self, NO_SECTION_SEARCH, PERSONA_ACKNOWLEDGMENT, SectionContext};
use crate::results::{GenerationResults, INITIAL_SEARCH_KEY, OUTLINE_KEY, PERSONA_KEY, REPORT_KEY};
use crate::sections::{SECTIONS, SectionSpec, TOTAL_STEPS};

/// Default number of hits requested per query.
pub const DEFAULT_RESULTS_PER_QUERY: u32 = 3;

/// State owned by one run and threaded through every step.
#[derive(Debug, Default)]
pub struct RunContext {
    pub history: ConversationHistory,
    pub results: GenerationResults,
    /// `## {title}\n{text}` for every section written so far
    pub written: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a finished run hands back.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: GenerationResults,
    pub document: String,
    pub variant: PipelineVariant,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Number of sections that made it into the document.
    pub fn sections_written(&self) -> usize {
        SECTIONS
            .iter()
            .filter(|s| self.results.text(&s.result_key()).is_some())
            .count()
    }

    pub fn failed_steps(&self) -> Vec<&str> {
        self.results.failed_keys()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Drives one case study from instructor setup to markdown document.
pub struct CaseWriter {
    generation: GenerationClient,
    search: Option<SearchClient>,
    settings: PipelineConfig,
    results_per_query: u32,
}

impl CaseWriter {
    pub fn new(generation: GenerationClient, settings: PipelineConfig) -> Self {
        Self {
            generation,
            search: None,
            settings,
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
        }
    }

    /// Attach a search client. Without one, search variants run as `basic`.
    pub fn with_search(mut self, search: SearchClient, results_per_query: u32) -> Self {
        self.search = Some(search);
        self.results_per_query = results_per_query;
        self
    }

    /// The variant a run will actually execute.
    pub fn variant(&self) -> PipelineVariant {
        let configured = self.settings.variant;
        if configured.uses_search() && self.search.is_none() {
            PipelineVariant::Basic
        } else {
            configured
        }
    }

    pub fn model(&self) -> &str {
        self.generation.model()
    }

    /// Load the saved instructor setup, then [`run`](Self::run).
    pub async fn run_saved(&self, instructor_path: &Path, student: &StudentSpec) -> Result<RunReport> {
        let instructor = InstructorSpec::load(instructor_path)?;
        Ok(self.run(&instructor, student).await)
    }

    /// Execute the whole chain.
    pub async fn run(&self, instructor: &InstructorSpec, student: &StudentSpec) -> RunReport {
        let started_at = Utc::now();
        let variant = self.variant();
        if variant != self.settings.variant {
            warn!(
                configured = %self.settings.variant,
                "No search client available; running the {variant} chain instead"
            );
        }

        info!(
            variant = %variant,
            model = %self.generation.model(),
            company = %student.company_name,
            job_title = %student.job_title,
            "Starting case study run"
        );

        let mut ctx = RunContext::new();
        let search = match variant {
            PipelineVariant::Basic => None,
            _ => self.search.as_ref(),
        };

        let initial_sources = match search {
            Some(search) => Some(self.initial_search(&mut ctx, search, instructor, student).await),
            None => None,
        };

        self.write_report(&mut ctx, instructor, student, initial_sources.as_deref())
            .await;
        self.seed_persona(&mut ctx, instructor, student).await;
        self.write_outline(&mut ctx, instructor, student).await;

        let section_search = match variant {
            PipelineVariant::Agentic => search,
            _ => None,
        };
        for section in &SECTIONS {
            let written = self
                .write_section(&mut ctx, section, instructor, student, section_search)
                .await;
            if !written && self.settings.on_section_failure == SectionFailurePolicy::Halt {
                warn!(
                    section = section.title,
                    "Section failed; halting the section loop"
                );
                break;
            }
        }

        info!("Step {TOTAL_STEPS}/{TOTAL_STEPS}: Collating the final case study...");
        let model = self.generation.model();
        let document = collate(
            &instructor.case_topic,
            &student.company_name,
            self.settings.disclaimer.then_some(model),
            &ctx.results,
        );

        let report = RunReport {
            results: ctx.results,
            document,
            variant,
            model: model.to_string(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            sections = report.sections_written(),
            failed = report.failed_steps().len(),
            elapsed_ms = report.duration().num_milliseconds(),
            "Full case study generation complete"
        );
        report
    }

    async fn initial_search(
        &self,
        ctx: &mut RunContext,
        search: &SearchClient,
        instructor: &InstructorSpec,
        student: &StudentSpec,
    ) -> String {
        info!("Step 0/{TOTAL_STEPS}: Performing web search for sources...");
        let queries = prompts::initial_queries(student, instructor);
        let sources = search.search(&queries, self.results_per_query).await;
        ctx.results.record(INITIAL_SEARCH_KEY, Some(sources.clone()));
        sources
    }

    async fn write_report(
        &self,
        ctx: &mut RunContext,
        instructor: &InstructorSpec,
        student: &StudentSpec,
        sources: Option<&str>,
    ) {
        info!("Step 1/{TOTAL_STEPS}: Synthesizing research report...");
        let prompt = prompts::research_report(instructor, student, sources);
        let outcome = self.generation.generate(&prompt, None).await;
        ctx.results.record(REPORT_KEY, outcome.text);
    }

    async fn seed_persona(
        &self,
        ctx: &mut RunContext,
        instructor: &InstructorSpec,
        student: &StudentSpec,
    ) {
        info!("Step 2/{TOTAL_STEPS}: Defining writer persona...");
        let prompt = prompts::persona(instructor, student);

        ctx.history = match self.settings.persona_mode {
            PersonaMode::Seeded => ConversationHistory::seeded(&prompt, PERSONA_ACKNOWLEDGMENT),
            PersonaMode::Generated => {
                let outcome = self.generation.generate(&prompt, None).await;
                if outcome.succeeded() {
                    outcome.history
                } else {
                    warn!("Persona call failed; using the fixed acknowledgment");
                    ConversationHistory::seeded(&prompt, PERSONA_ACKNOWLEDGMENT)
                }
            }
        };

        ctx.results.record(PERSONA_KEY, Some(prompt));
    }

    async fn write_outline(
        &self,
        ctx: &mut RunContext,
        instructor: &InstructorSpec,
        student: &StudentSpec,
    ) {
        info!("Step 3/{TOTAL_STEPS}: Writing the case study outline...");
        let prompt = prompts::outline(instructor, student);
        let outcome = self.generation.generate(&prompt, Some(&ctx.history)).await;
        ctx.history = outcome.history;
        ctx.results.record(OUTLINE_KEY, outcome.text);
    }

    /// Steps 4 to 10. Returns whether the section produced text.
    async fn write_section(
        &self,
        ctx: &mut RunContext,
        section: &SectionSpec,
        instructor: &InstructorSpec,
        student: &StudentSpec,
        search: Option<&SearchClient>,
    ) -> bool {
        info!(
            "Step {}/{TOTAL_STEPS}: Writing the {}...",
            section.step, section.title
        );
        let preceding = prompts::preceding_parts(&ctx.written);

        let search_text = match search {
            Some(search) => Some(self.think_then_search(ctx, section, search, &preceding).await),
            None => None,
        };

        let prompt = prompts::section(&SectionContext {
            section,
            instructor,
            student,
            outline: ctx.results.text(OUTLINE_KEY),
            search_text: search_text.as_deref(),
            preceding: &preceding,
        });

        let outcome = self.generation.generate(&prompt, Some(&ctx.history)).await;
        ctx.history = outcome.history;

        let written = match &outcome.text {
            Some(text) => {
                ctx.written.push(format!("## {}\n{text}", section.title));
                true
            }
            None => {
                warn!(section = section.title, "Section could not be written");
                false
            }
        };
        ctx.results.record(section.result_key(), outcome.text);
        written
    }

    /// Ask the model whether the section needs sources, and fetch them.
    ///
    /// The decision exchange is not kept in the history.
    async fn think_then_search(
        &self,
        ctx: &mut RunContext,
        section: &SectionSpec,
        search: &SearchClient,
        preceding: &str,
    ) -> String {
        info!(
            "Thinking: What information do I need for the '{}' section?",
            section.title
        );
        let prompt = prompts::search_decision(section, preceding);
        let decision = self
            .generation
            .generate(&prompt, Some(&ctx.history))
            .await
            .text
            .map(|answer| SearchDecision::parse(&answer))
            .unwrap_or_else(SearchDecision::fallback);

        match decision {
            SearchDecision::NoSearchNeeded => NO_SECTION_SEARCH.to_string(),
            SearchDecision::SearchNeeded(queries) => {
                let text = search.search(&queries, self.results_per_query).await;
                ctx.results.record(section.search_key(), Some(text.clone()));
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingProvider, StaticSearch};
    use casewriter_core::error::{Error, InstructorError};
    use casewriter_search::SEARCH_FAILED;
    use std::sync::Arc;

    const NO_SEARCH: &str = r#"{"search_needed": false, "queries": []}"#;

    fn acme() -> (InstructorSpec, StudentSpec) {
        let instructor = InstructorSpec {
            case_topic: "market entry".into(),
            ..InstructorSpec::default()
        };
        (instructor, StudentSpec::new("Acme", "Head of Strategy"))
    }

    fn settings(variant: PipelineVariant) -> PipelineConfig {
        PipelineConfig {
            variant,
            ..PipelineConfig::default()
        }
    }

    /// Report, outline, then one reply per section.
    fn basic_script() -> Vec<Option<String>> {
        let mut script = vec![Some("REPORT".to_string()), Some("OUTLINE".to_string())];
        script.extend(SECTIONS.iter().map(|s| Some(format!("{} body", s.title))));
        script
    }

    fn writer(provider: &Arc<RecordingProvider>, variant: PipelineVariant) -> CaseWriter {
        CaseWriter::new(
            GenerationClient::new(provider.clone(), "test-model"),
            settings(variant),
        )
    }

    fn with_search(writer: CaseWriter, backend: &Arc<StaticSearch>) -> CaseWriter {
        writer.with_search(SearchClient::new(backend.clone()), 3)
    }

    #[tokio::test]
    async fn basic_chain_makes_nine_calls_and_no_searches() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let backend = Arc::new(StaticSearch::new());
        let writer = with_search(writer(&provider, PipelineVariant::Basic), &backend);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(provider.call_count(), 2 + SECTIONS.len());
        assert!(backend.queries().is_empty());
        assert!(!report.results.contains(INITIAL_SEARCH_KEY));
        assert_eq!(report.variant, PipelineVariant::Basic);
        assert_eq!(report.sections_written(), SECTIONS.len());

        let prompts = provider.prompts();
        assert!(prompts[0].contains("industry report"));
        assert!(!prompts[0].contains("live web search results"));
        assert!(prompts[1].contains("brief overview"));
        assert!(!prompts[2].contains("targeted search"));
    }

    #[tokio::test]
    async fn every_section_prompt_carries_all_prior_sections() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let writer = writer(&provider, PipelineVariant::Basic);
        let (instructor, student) = acme();

        writer.run(&instructor, &student).await;

        let prompts = provider.prompts();
        for (i, section) in SECTIONS.iter().enumerate() {
            let prompt = &prompts[2 + i];
            assert!(prompt.contains(&format!("'{}'", section.title)));
            assert!(prompt.contains("OUTLINE"));
            assert!(prompt.contains(&instructor.learning_objectives));
            assert!(prompt.contains("Acme"));
            for earlier in &SECTIONS[..i] {
                assert!(
                    prompt.contains(&format!("## {}\n{} body", earlier.title, earlier.title)),
                    "{} prompt is missing {}",
                    section.title,
                    earlier.title
                );
            }
        }
        assert!(prompts[2].contains("preceding parts of the case study: None."));
    }

    #[tokio::test]
    async fn history_grows_by_one_exchange_per_continuation() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let writer = writer(&provider, PipelineVariant::Basic);
        let (instructor, student) = acme();

        writer.run(&instructor, &student).await;

        let requests = provider.requests();
        // report is stateless
        assert_eq!(requests[0].messages.len(), 1);
        // persona seed + outline prompt
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].messages[1].content, PERSONA_ACKNOWLEDGMENT);
        for i in 0..SECTIONS.len() {
            assert_eq!(requests[2 + i].messages.len(), 5 + 2 * i);
        }
    }

    #[tokio::test]
    async fn agentic_acme_market_entry() {
        let mut script = vec![Some("REPORT".to_string()), Some("OUTLINE".to_string())];
        script.push(Some(
            "```json\n{\"search_needed\": true, \"queries\": [\"Acme Brazil launch\"]}\n```".into(),
        ));
        script.push(Some("Intro body".into()));
        for section in &SECTIONS[1..] {
            script.push(Some(NO_SEARCH.into()));
            script.push(Some(format!("{} body", section.title)));
        }

        let provider = Arc::new(RecordingProvider::new(script));
        let backend = Arc::new(
            StaticSearch::new()
                .with("Acme market entry", &["https://acme.example/entry"])
                .with("Acme Brazil launch", &["https://news.example/brazil"]),
        );
        let writer = with_search(writer(&provider, PipelineVariant::Agentic), &backend);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        let queries = backend.queries();
        assert_eq!(&queries[..4], prompts::initial_queries(&student, &instructor).as_slice());
        assert_eq!(queries[4], "Acme Brazil launch");
        assert_eq!(queries.len(), 5);

        let initial = report.results.text(INITIAL_SEARCH_KEY).unwrap();
        assert!(initial.contains("URL: https://acme.example/entry"));
        let intro_search = report.results.text("4_Introduction_search").unwrap();
        assert!(intro_search.contains("https://news.example/brazil"));
        assert!(!report.results.contains("5_Case Study Narrative_search"));

        let prompts = provider.prompts();
        assert!(prompts[0].contains("https://acme.example/entry"));
        assert!(prompts[2].starts_with("I am about to write the 'Introduction' section"));
        assert!(prompts[3].contains("https://news.example/brazil"));
        assert!(prompts[5].contains(NO_SECTION_SEARCH));

        // the decision exchange is not carried into the section call
        let requests = provider.requests();
        assert_eq!(requests[2].messages.len(), 5);
        assert_eq!(requests[3].messages.len(), 5);
        assert_eq!(requests[4].messages.len(), 7);

        assert!(report.document.starts_with("# Case Study: market entry for Acme\n\n"));
        assert!(report.document.contains("test-model"));
        assert!(report.document.contains("## Introduction\nIntro body"));
    }

    #[tokio::test]
    async fn researched_chain_searches_once_up_front() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let backend = Arc::new(StaticSearch::new());
        let writer = with_search(writer(&provider, PipelineVariant::Researched), &backend);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(backend.queries().len(), 4);
        assert_eq!(
            report.results.text(INITIAL_SEARCH_KEY),
            Some(casewriter_search::NO_RESULTS)
        );
        assert_eq!(provider.call_count(), 2 + SECTIONS.len());
        assert!(!provider.prompts()[2].contains("targeted search"));
    }

    #[tokio::test]
    async fn failed_search_is_recorded_and_run_continues() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let backend = Arc::new(StaticSearch::failing());
        let writer = with_search(writer(&provider, PipelineVariant::Researched), &backend);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(report.results.text(INITIAL_SEARCH_KEY), Some(SEARCH_FAILED));
        assert!(provider.prompts()[0].contains(SEARCH_FAILED));
        assert_eq!(report.sections_written(), SECTIONS.len());
    }

    #[tokio::test]
    async fn unreadable_decision_skips_search() {
        let mut script = vec![Some("REPORT".to_string()), Some("OUTLINE".to_string())];
        for section in &SECTIONS {
            script.push(Some("Let me think about that...".into()));
            script.push(Some(format!("{} body", section.title)));
        }
        let provider = Arc::new(RecordingProvider::new(script));
        let backend = Arc::new(StaticSearch::new());
        let writer = with_search(writer(&provider, PipelineVariant::Agentic), &backend);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(backend.queries().len(), 4);
        assert_eq!(report.sections_written(), SECTIONS.len());
    }

    #[tokio::test]
    async fn failed_section_is_skipped_under_continue() {
        let mut script = basic_script();
        script[3] = None; // Case Study Narrative
        let provider = Arc::new(RecordingProvider::new(script));
        let writer = writer(&provider, PipelineVariant::Basic);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(report.results.get("5_Case Study Narrative"), Some(None));
        assert_eq!(report.failed_steps(), vec!["5_Case Study Narrative"]);
        assert!(!report.document.contains("## Case Study Narrative"));
        assert!(report.document.contains("## Conclusion"));
        assert_eq!(report.sections_written(), SECTIONS.len() - 1);

        let analysis_prompt = &provider.prompts()[4];
        assert!(analysis_prompt.contains("## Introduction\nIntroduction body"));
        assert!(!analysis_prompt.contains("## Case Study Narrative"));
    }

    #[tokio::test]
    async fn halt_policy_stops_the_section_loop() {
        let mut script = basic_script();
        script[3] = None;
        script.truncate(4);
        let provider = Arc::new(RecordingProvider::new(script));
        let writer = CaseWriter::new(
            GenerationClient::new(provider.clone(), "test-model"),
            PipelineConfig {
                variant: PipelineVariant::Basic,
                on_section_failure: SectionFailurePolicy::Halt,
                ..PipelineConfig::default()
            },
        );
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(provider.call_count(), 4);
        assert!(!report.results.contains("6_Analysis of Strategic Decisions"));
        assert!(report.document.ends_with("## Introduction\nIntroduction body"));
    }

    #[tokio::test]
    async fn everything_failing_still_yields_a_document() {
        let provider = Arc::new(RecordingProvider::failing());
        let writer = writer(&provider, PipelineVariant::Basic);
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(report.sections_written(), 0);
        assert_eq!(report.results.get(REPORT_KEY), Some(None));
        assert!(report.results.text(PERSONA_KEY).is_some());
        assert_eq!(
            report.document,
            "# Case Study: market entry for Acme\n\n**_Disclaimer: This case study was written by test-model and may contain hallucinations._**\n\n---\n\n"
        );
    }

    #[tokio::test]
    async fn generated_persona_keeps_model_reply() {
        let mut script = vec![
            Some("REPORT".to_string()),
            Some("I am your case writer.".to_string()),
        ];
        script.extend(basic_script().into_iter().skip(1));
        let provider = Arc::new(RecordingProvider::new(script));
        let writer = CaseWriter::new(
            GenerationClient::new(provider.clone(), "test-model"),
            PipelineConfig {
                variant: PipelineVariant::Basic,
                persona_mode: PersonaMode::Generated,
                ..PipelineConfig::default()
            },
        );
        let (instructor, student) = acme();

        writer.run(&instructor, &student).await;

        let requests = provider.requests();
        assert_eq!(requests[1].messages.len(), 1);
        assert!(requests[1].messages[0].content.starts_with("Your role:"));
        assert_eq!(requests[2].messages[1].content, "I am your case writer.");
    }

    #[tokio::test]
    async fn generated_persona_falls_back_to_acknowledgment() {
        let mut script = vec![Some("REPORT".to_string()), None];
        script.extend(basic_script().into_iter().skip(1));
        let provider = Arc::new(RecordingProvider::new(script));
        let writer = CaseWriter::new(
            GenerationClient::new(provider.clone(), "test-model"),
            PipelineConfig {
                variant: PipelineVariant::Basic,
                persona_mode: PersonaMode::Generated,
                ..PipelineConfig::default()
            },
        );
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;

        assert_eq!(provider.requests()[2].messages[1].content, PERSONA_ACKNOWLEDGMENT);
        assert_eq!(report.sections_written(), SECTIONS.len());
    }

    #[tokio::test]
    async fn search_variant_without_client_runs_basic() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let writer = writer(&provider, PipelineVariant::Agentic);
        assert_eq!(writer.variant(), PipelineVariant::Basic);

        let (instructor, student) = acme();
        let report = writer.run(&instructor, &student).await;
        assert_eq!(report.variant, PipelineVariant::Basic);
        assert_eq!(provider.call_count(), 2 + SECTIONS.len());
    }

    #[tokio::test]
    async fn disclaimer_can_be_turned_off() {
        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let writer = CaseWriter::new(
            GenerationClient::new(provider.clone(), "test-model"),
            PipelineConfig {
                variant: PipelineVariant::Basic,
                disclaimer: false,
                ..PipelineConfig::default()
            },
        );
        let (instructor, student) = acme();

        let report = writer.run(&instructor, &student).await;
        assert!(report.document.starts_with("# Case Study: market entry for Acme\n\n## Introduction\n"));
    }

    #[tokio::test]
    async fn missing_instructor_setup_refuses_to_run() {
        let provider = Arc::new(RecordingProvider::failing());
        let writer = writer(&provider, PipelineVariant::Basic);
        let dir = tempfile::tempdir().unwrap();

        let err = writer
            .run_saved(&dir.path().join("instructor.toml"), &StudentSpec::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Instructor(InstructorError::NotFound(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn saved_setup_drives_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instructor.toml");
        let (instructor, student) = acme();
        instructor.save(&path, false).unwrap();

        let provider = Arc::new(RecordingProvider::new(basic_script()));
        let report = writer(&provider, PipelineVariant::Basic)
            .run_saved(&path, &student)
            .await
            .unwrap();

        assert!(report.document.starts_with("# Case Study: market entry for Acme"));
    }
}
