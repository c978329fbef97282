//! Prompt builders for every step of the chain.
//!
//! All builders are pure: same inputs, same text.

use casewriter_core::{InstructorSpec, StudentSpec};

use crate::sections::{CASE_STRUCTURE, SectionSpec};

/// The model turn that closes the seeded persona exchange.
pub const PERSONA_ACKNOWLEDGMENT: &str =
    "Understood. I will now act as this persona for all subsequent tasks.";

/// Stand-in for the search block when a section was written without a search.
pub const NO_SECTION_SEARCH: &str = "No new search was performed for this section.";

/// Stand-in for the preceding sections before the first one is written.
pub const NO_PRECEDING: &str = "None";

/// Step 0: the initial battery of four queries.
pub fn initial_queries(student: &StudentSpec, instructor: &InstructorSpec) -> Vec<String> {
    let company = &student.company_name;
    let topic = &instructor.case_topic;
    vec![
        format!("{company} {topic}"),
        format!("financial reports of {company} in the context of {topic}"),
        format!("performance analysis of {company} in the context of {topic}"),
        format!("strategic challenges and opportunities of {company} in the context of {topic}"),
    ]
}

/// Step 1: the leadership-board research report.
///
/// `sources` is the step 0 search text; without it the report is written
/// from the model's own knowledge.
pub fn research_report(
    instructor: &InstructorSpec,
    student: &StudentSpec,
    sources: Option<&str>,
) -> String {
    let mut prompt = format!(
        "In the role of an expert corporate analyst with over 10 years of experience in creating meaningful and effective reports for leadership boards of Fortune 500 companies, please create an industry report for the leadership board of {}. The topic of the report is: {}.",
        student.company_name, instructor.case_topic
    );

    if let Some(sources) = sources {
        prompt.push_str(&format!(
            "\nUse the following live web search results as the additional sources for your report:\n---\n{sources}\n---"
        ));
    }

    prompt.push_str(&format!(
        "\nThe leadership board wants to learn the following: {}. The leadership board wants to be able to answer the following questions: {}.",
        instructor.learning_objectives, instructor.student_questions
    ));
    prompt
}

/// Step 2: the writer persona.
pub fn persona(instructor: &InstructorSpec, student: &StudentSpec) -> String {
    let job = &student.job_title;
    let company = &student.company_name;
    let audience = &instructor.target_audience;

    format!(
        "Your role: You are a deep expert in {discipline} with over 10 years of experience as {job} at {company}.\n\n\
         Your personality: You are extroverted, joyful and kind. You are a deeply analytical thinking, above average creative and you always think outside of the box to find unconventional, yet effective solutions to problems.\n\n\
         Your expertise: You have over 10 years of experience as {job} at {company}. You have taught case studies at ivy league business schools for over 5 years. You also have over 5 years of experience in writing highly engaging and meaningful case studies for {audience} in top tier business schools.\n\n\
         Your writing style: When writing case studies for {audience} at top tier business schools, you adhere to the best practices of such quality case studies, but you add your own talent as an experienced storyteller to it. Your defining quality as a case study writer, which makes you stand out from others, is that you are able to write in such a way that the cases become particularly realistic and captivating for the students. You are also building in many engaging elements, which are not typical for case studies, but which make them much more engaging for students and therefore increase the completion rate significantly. Finally, you write based on high quality sources, which you rigorously cite throughout the document.",
        discipline = instructor.discipline,
    )
}

/// Step 3: the outline, following [`CASE_STRUCTURE`].
pub fn outline(instructor: &InstructorSpec, student: &StudentSpec) -> String {
    format!(
        "In this role, you are writing a case study focused on the job of {} at {}. In this role, please create a brief overview of the case study on {} which achieves the following learning objectives: {}. The overview must follow this structure:\n{CASE_STRUCTURE}",
        student.job_title, student.company_name, instructor.case_topic, instructor.learning_objectives
    )
}

/// Join written sections for the next prompt, or [`NO_PRECEDING`].
pub fn preceding_parts(written: &[String]) -> String {
    if written.is_empty() {
        NO_PRECEDING.to_string()
    } else {
        written.join("\n\n")
    }
}

/// Step a of the agentic loop: ask whether the section needs fresh sources.
pub fn search_decision(section: &SectionSpec, preceding: &str) -> String {
    format!(
        "I am about to write the '{title}' section of a case study.\n\
         My instructions for this section are: {description}.\n\
         The context from previous sections is: {preceding}.\n\n\
         Do I need more specific, real-time information to write this section comprehensively?\n\
         If yes, formulate up to 2 specific Google search queries that would give me the data, examples, or details I need.\n\
         Respond ONLY with a JSON object with two keys: \"search_needed\" (true/false) and \"queries\" (a list of strings).\n\
         If no search is needed, the \"queries\" list should be empty.",
        title = section.title,
        description = section.description,
    )
}

/// Everything a section prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct SectionContext<'a> {
    pub section: &'a SectionSpec,
    pub instructor: &'a InstructorSpec,
    pub student: &'a StudentSpec,
    /// Step 3 output; `None` when the outline call failed
    pub outline: Option<&'a str>,
    /// `Some` only in the agentic chain: the search text or [`NO_SECTION_SEARCH`]
    pub search_text: Option<&'a str>,
    /// Already rendered by [`preceding_parts`]
    pub preceding: &'a str,
}

/// Step c: write one section.
pub fn section(ctx: &SectionContext<'_>) -> String {
    let SectionContext {
        section,
        instructor,
        student,
        ..
    } = *ctx;

    let mut prompt = format!(
        "In your defined role, please write out all details of the section '{}' for the case study focused on the job of {} at {}.\n\
         The specific requirements for this section are:\n---\n{}\n---\n",
        section.title, student.job_title, student.company_name, section.description
    );

    if let Some(search) = ctx.search_text {
        prompt.push_str(&format!(
            "I have performed a targeted search for you. Use these new sources to inform your writing:\n---\n{search}\n---\n"
        ));
    }

    prompt.push_str(&format!(
        "Please make sure to take into consideration the content of the preceding parts of the case study: {}.\n\
         The overall case study outline is: '{}'.\n\
         Add relevant details, examples, research insights, data and testimonials of relevant personalities.\n\
         Ensure your writing is aligned with these learning objectives: {}.\n\
         IMPORTANT: Write ONLY the content for the section itself. Do not add meta-commentary.",
        ctx.preceding,
        ctx.outline.unwrap_or(NO_PRECEDING),
        instructor.learning_objectives
    ));

    if let Some(extra) = section.extra {
        prompt.push('\n');
        prompt.push_str(&extra.instruction(instructor));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SECTIONS;

    fn acme() -> (InstructorSpec, StudentSpec) {
        let instructor = InstructorSpec {
            case_topic: "market entry".into(),
            ..InstructorSpec::default()
        };
        (instructor, StudentSpec::new("Acme", "Head of Strategy"))
    }

    #[test]
    fn initial_queries_for_acme() {
        let (instructor, student) = acme();
        assert_eq!(
            initial_queries(&student, &instructor),
            vec![
                "Acme market entry",
                "financial reports of Acme in the context of market entry",
                "performance analysis of Acme in the context of market entry",
                "strategic challenges and opportunities of Acme in the context of market entry",
            ]
        );
    }

    #[test]
    fn report_for_acme_names_topic_objectives_and_questions() {
        let instructor = InstructorSpec {
            case_topic: "market entry".into(),
            learning_objectives: "X".into(),
            student_questions: "Y".into(),
            ..InstructorSpec::default()
        };
        let student = StudentSpec::new("Acme", "Head of Strategy");

        let prompt = research_report(&instructor, &student, None);

        assert!(prompt.contains("leadership board of Acme"));
        assert!(prompt.contains("The topic of the report is: market entry."));
        assert!(prompt.contains("The leadership board wants to learn the following: X."));
        assert!(prompt.contains("answer the following questions: Y."));
    }

    #[test]
    fn report_includes_sources_only_when_given() {
        let (instructor, student) = acme();
        let with = research_report(&instructor, &student, Some("- Title: X"));
        let without = research_report(&instructor, &student, None);

        assert!(with.contains("live web search results"));
        assert!(with.contains("- Title: X"));
        assert!(!without.contains("live web search results"));
        for prompt in [&with, &without] {
            assert!(prompt.contains("leadership board of Acme"));
            assert!(prompt.contains(&instructor.learning_objectives));
            assert!(prompt.contains(&instructor.student_questions));
        }
    }

    #[test]
    fn persona_has_four_paragraphs() {
        let (instructor, student) = acme();
        let prompt = persona(&instructor, &student);
        let paragraphs: Vec<&str> = prompt.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 4);
        assert!(paragraphs[0].starts_with("Your role: You are a deep expert in Business Strategy"));
        assert!(paragraphs[0].contains("Head of Strategy at Acme"));
        assert!(paragraphs[2].contains(&instructor.target_audience));
        assert!(paragraphs[3].starts_with("Your writing style:"));
    }

    #[test]
    fn outline_ends_with_structure() {
        let (instructor, student) = acme();
        assert!(outline(&instructor, &student).ends_with(CASE_STRUCTURE));
    }

    #[test]
    fn preceding_defaults_to_none() {
        assert_eq!(preceding_parts(&[]), "None");
        let written = vec!["## A\nx".to_string(), "## B\ny".to_string()];
        assert_eq!(preceding_parts(&written), "## A\nx\n\n## B\ny");
    }

    #[test]
    fn decision_prompt_asks_for_json() {
        let prompt = search_decision(&SECTIONS[1], "None");
        assert!(prompt.contains("'Case Study Narrative'"));
        assert!(prompt.contains("\"search_needed\""));
        assert!(prompt.contains("up to 2"));
    }

    #[test]
    fn section_prompt_carries_everything() {
        let (instructor, student) = acme();
        let ctx = SectionContext {
            section: &SECTIONS[6],
            instructor: &instructor,
            student: &student,
            outline: Some("THE OUTLINE"),
            search_text: Some(NO_SECTION_SEARCH),
            preceding: "## Introduction\nIntro text",
        };
        let prompt = section(&ctx);

        assert!(prompt.contains("'Conclusion'"));
        assert!(prompt.contains(SECTIONS[6].description));
        assert!(prompt.contains("THE OUTLINE"));
        assert!(prompt.contains(NO_SECTION_SEARCH));
        assert!(prompt.contains("## Introduction\nIntro text"));
        assert!(prompt.contains(&instructor.learning_objectives));
        assert!(prompt.contains("Write ONLY the content for the section itself. Do not add meta-commentary."));
        assert!(prompt.contains(&instructor.student_questions));
    }

    #[test]
    fn section_prompt_without_search_omits_block() {
        let (instructor, student) = acme();
        let ctx = SectionContext {
            section: &SECTIONS[0],
            instructor: &instructor,
            student: &student,
            outline: None,
            search_text: None,
            preceding: NO_PRECEDING,
        };
        let prompt = section(&ctx);
        assert!(!prompt.contains("targeted search"));
        assert!(!prompt.contains(NO_SECTION_SEARCH));
    }
}
