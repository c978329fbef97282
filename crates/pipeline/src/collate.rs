//! Step 11: assemble the final markdown document.

use crate::results::GenerationResults;
use crate::sections::SECTIONS;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Title, optional disclaimer, then every section that has text.
///
/// Pure in its inputs: sections that failed or never ran are left out
/// together with their heading.
pub fn collate(
    topic: &str,
    company: &str,
    disclaimer_model: Option<&str>,
    results: &GenerationResults,
) -> String {
    let mut document = format!("# Case Study: {topic} for {company}\n\n");

    if let Some(model) = disclaimer_model {
        document.push_str(&format!(
            "**_Disclaimer: This case study was written by {model} and may contain hallucinations._**{SECTION_SEPARATOR}"
        ));
    }

    let body = SECTIONS
        .iter()
        .filter_map(|section| {
            results
                .text(&section.result_key())
                .map(|text| format!("## {}\n{text}", section.title))
        })
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR);

    document.push_str(&body);
    document
}
