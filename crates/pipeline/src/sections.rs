//! The static section table driving steps 4 to 10.

use casewriter_core::InstructorSpec;

/// Total number of numbered steps in a run, collation included.
pub const TOTAL_STEPS: u8 = 11;

/// The structure the outline step asks for. It names the title page, which
/// has no section step of its own.
pub const CASE_STRUCTURE: &str = "- Title Page\n- Introduction\n- Case Study Narrative\n- Analysis of Strategic Decisions\n- Critical Discussion\n- Reflection and Application\n- Supplementary Materials\n- Conclusion";

/// An additional instruction appended to one section's prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraConstraint {
    /// Proper citations with URLs
    Citations,
    /// Thought-provoking close tied to the student questions
    QuestionsTone,
}

impl ExtraConstraint {
    pub fn instruction(self, instructor: &InstructorSpec) -> String {
        match self {
            Self::Citations => "Please make sure to create proper citations with corresponding URLs to the source, referencing the initial research report where applicable.".to_string(),
            Self::QuestionsTone => format!(
                "Please make sure to write elegantly and in a way that is thought provoking and engaging, and strongly aligned with these questions for the students: {}.",
                instructor.student_questions
            ),
        }
    }
}

/// One written section of the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub step: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub extra: Option<ExtraConstraint>,
}

impl SectionSpec {
    /// Key of the written text in the results mapping, e.g. `"4_Introduction"`.
    pub fn result_key(&self) -> String {
        format!("{}_{}", self.step, self.title)
    }

    /// Key of the per-section search text, e.g. `"6_Analysis of Strategic Decisions_search"`.
    pub fn search_key(&self) -> String {
        format!("{}_{}_search", self.step, self.title)
    }
}

pub static SECTIONS: [SectionSpec; 7] = [
    SectionSpec {
        step: 4,
        title: "Introduction",
        description: "Background Information: Provide a brief introduction to the company or brand featured in the case study.\nIndustry Context: Describe the industry landscape and the market conditions at the time of the case study.\nPurpose of the Case Study: Clarify the educational objectives and what students should aim to learn from this case study.",
        extra: None,
    },
    SectionSpec {
        step: 5,
        title: "Case Study Narrative",
        description: "Company Overview: Detail the company's history, mission, and market position prior to the implementation of the strategy being studied.\nStrategic Assessment: Outline specific challenges or opportunities for the company.",
        extra: None,
    },
    SectionSpec {
        step: 6,
        title: "Analysis of Strategic Decisions",
        description: "Strategic Decision-Making Process: Delve into how decisions were made, including the data and market research used.\nImplementation Challenges: Describe any obstacles encountered during the implementation of the strategy and how they were overcome.\nOutcomes and Performance: Short-Term Results (analyze immediate effects) and Long-Term Impact (assess long-term effects).",
        extra: None,
    },
    SectionSpec {
        step: 7,
        title: "Critical Discussion",
        description: "Discussion Points: Provide key points for students to consider, fostering critical thinking about strategic choices made by the company.\nAlternative Strategies: Propose alternative strategies that could have been considered, encouraging students to think about different approaches.\nLessons Learned: Highlight key takeaways and lessons learned from the case study.",
        extra: None,
    },
    SectionSpec {
        step: 8,
        title: "Reflection and Application",
        description: "Reflective Questions: Pose thought-provoking questions to help students apply the insights from the case study to their own or other business contexts.\nHow could these strategies be applied in different industries?\nWhat would you have done differently if you were in charge?",
        extra: None,
    },
    SectionSpec {
        step: 9,
        title: "Supplementary Materials",
        description: "Data Sources: Include data sources, as found online.\nFurther Readings: Suggest additional resources for students who wish to explore related topics in more depth.",
        extra: Some(ExtraConstraint::Citations),
    },
    SectionSpec {
        step: 10,
        title: "Conclusion",
        description: "Recap: Summarize the main insights and the educational value of the case study.\nNext Steps: Encourage further exploration of the concepts learned and how they tie into the upcoming course material.",
        extra: Some(ExtraConstraint::QuestionsTone),
    },
];
