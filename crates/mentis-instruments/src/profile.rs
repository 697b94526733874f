use mentis_core::models::instrument::InstrumentKind;
use regex::Regex;

/// Inclusive range for numeric item responses.
#[derive(Debug, Clone, Copy)]
pub struct ResponseRange {
    pub min: i64,
    pub max: i64,
}

impl ResponseRange {
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One scored section of an instrument, with the item codes a complete
/// report is expected to contain.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub id: String,
    pub name: String,
    pub item_codes: Vec<String>,
}

/// Per-instrument knowledge shared by the classifier and validator.
#[derive(Debug)]
pub struct InstrumentProfile {
    pub kind: InstrumentKind,
    pub name: String,
    /// Keyword patterns for classification. Acronym patterns are
    /// case-sensitive; phrase patterns carry `(?i)`.
    pub keywords: Vec<Regex>,
    pub sections: Vec<SectionSpec>,
    pub response_range: Option<ResponseRange>,
    pub reaction_time_range_ms: Option<(f64, f64)>,
}

impl InstrumentProfile {
    /// Byte length of the longest keyword match in `text`, if any.
    /// A longer match is a more specific rule.
    pub fn match_strength(&self, text: &str) -> Option<usize> {
        self.keywords
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| m.len()))
            .max()
    }

    /// Expected item codes across all sections, in section order.
    /// Empty for instruments without a fixed item inventory.
    pub fn expected_item_codes(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| s.item_codes.iter().cloned())
            .collect()
    }

    /// Fixed item count, when the instrument defines one.
    pub fn expected_count(&self) -> Option<u32> {
        let n: usize = self.sections.iter().map(|s| s.item_codes.len()).sum();
        (n > 0).then_some(n as u32)
    }
}

pub(crate) fn keyword(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

pub(crate) fn codes(prefix: &str, from: u32, to: u32) -> Vec<String> {
    (from..=to).map(|n| format!("{prefix}{n}")).collect()
}
