//! Per-run record of every step's output, keyed the way the UI lists them.

use crate::sections::SECTIONS;

pub const INITIAL_SEARCH_KEY: &str = "0_initial_search";
pub const REPORT_KEY: &str = "1_report";
pub const PERSONA_KEY: &str = "2_persona_prompt";
pub const OUTLINE_KEY: &str = "3_outline";

/// Ordered, append-only mapping from step key to output.
///
/// `None` records a step that ran and failed; a missing key is a step that
/// never ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResults {
    entries: Vec<(String, Option<String>)>,
}

/// One entry ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry<'a> {
    pub key: &'a str,
    pub label: String,
    pub value: Option<&'a str>,
    pub is_search: bool,
}

impl GenerationResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step's output. A key is only ever recorded once per run;
    /// later writes to the same key are ignored.
    pub fn record(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        if self.contains(&key) {
            tracing::debug!(key = %key, "Step already recorded; keeping first value");
            return;
        }
        self.entries.push((key, value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// `None` when the step never ran, `Some(None)` when it ran and failed.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// The text of a step that ran and succeeded.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Keys of steps that ran and produced nothing.
    pub fn failed_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k)
            .collect()
    }

    /// Present entries in display order: steps 0 to 3, then each section
    /// with its search result (if any) listed just before it.
    pub fn display_entries(&self) -> Vec<StepEntry<'_>> {
        display_order()
            .into_iter()
            .filter_map(|key| {
                let (stored_key, value) = self.entries.iter().find(|(k, _)| *k == key)?;
                Some(StepEntry {
                    key: stored_key.as_str(),
                    label: label_for(stored_key),
                    value: value.as_deref(),
                    is_search: stored_key.ends_with("_search"),
                })
            })
            .collect()
    }
}

/// Every key a run can produce, in display order.
pub fn display_order() -> Vec<String> {
    let mut keys: Vec<String> = [INITIAL_SEARCH_KEY, REPORT_KEY, PERSONA_KEY, OUTLINE_KEY]
        .iter()
        .map(|k| k.to_string())
        .collect();
    for section in &SECTIONS {
        keys.push(section.search_key());
        keys.push(section.result_key());
    }
    keys
}

/// Human-readable label for a step key.
///
/// `"3_outline"` → `"Step 3: Outline"`,
/// `"6_Analysis of Strategic Decisions_search"` →
/// `"Agent Search Results for Analysis of Strategic Decisions"`.
pub fn label_for(key: &str) -> String {
    let (step, rest) = key.split_once('_').unwrap_or(("", key));

    if key != INITIAL_SEARCH_KEY {
        if let Some(title) = rest.strip_suffix("_search") {
            return format!("Agent Search Results for {title}");
        }
    }

    format!("Step {step}: {}", title_case(&rest.replace('_', " ")))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
