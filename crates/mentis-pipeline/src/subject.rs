//! Subject identity scan over page segments.
//!
//! Reports carry a header block with labelled fields ("Patient ID:",
//! "Test Date:", "Age:", "Language:"). Each page is probed
//! independently; probes merge in page order with the earliest hit
//! winning per field.

use std::sync::LazyLock;

use jiff::civil::Date;
use mentis_core::models::segment::Segment;
use mentis_core::models::subject::SubjectInfo;
use regex::Regex;

static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:patient|subject)\s*(?:id)?\s*[:#]\s*([A-Za-z0-9][A-Za-z0-9_-]*)")
        .unwrap()
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:test\s+date|date\s+of\s+test)\s*[:#]\s*(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4})",
    )
    .unwrap()
});

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bage\s*[:#]\s*(\d{1,3})\b").unwrap()
});

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blanguage\s*[:#]\s*([A-Za-z]+)").unwrap()
});

/// ISO dates parse directly; slash dates go through strptime with the
/// year width deciding the century rule.
fn parse_date(raw: &str) -> Option<Date> {
    if let Ok(date) = raw.parse::<Date>() {
        return Some(date);
    }
    let year = raw.rsplit('/').next().unwrap_or_default();
    let format = if year.len() == 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
    Date::strptime(format, raw).ok()
}

/// Identity fields found on one page, each optional.
#[derive(Debug, Clone, Default)]
pub struct SubjectProbe {
    pub subject_id: Option<String>,
    pub test_date: Option<Date>,
    pub age: Option<u32>,
    pub language: Option<String>,
}

impl SubjectProbe {
    /// Scan one page's segments for labelled identity fields. Within a
    /// page the first hit per field wins.
    pub fn scan(segments: &[Segment]) -> Self {
        let mut probe = SubjectProbe::default();
        for segment in segments {
            let text = segment.text();
            if probe.subject_id.is_none()
                && let Some(caps) = ID_RE.captures(&text)
            {
                probe.subject_id = Some(caps[1].to_string());
            }
            if probe.test_date.is_none()
                && let Some(caps) = DATE_RE.captures(&text)
            {
                probe.test_date = parse_date(&caps[1]);
            }
            if probe.age.is_none()
                && let Some(caps) = AGE_RE.captures(&text)
            {
                probe.age = caps[1].parse().ok();
            }
            if probe.language.is_none()
                && let Some(caps) = LANGUAGE_RE.captures(&text)
            {
                probe.language = Some(caps[1].to_string());
            }
        }
        probe
    }

    /// Merge a later page's probe into this one. Fields already found
    /// keep their earlier value.
    pub fn merge(mut self, later: SubjectProbe) -> SubjectProbe {
        self.subject_id = self.subject_id.or(later.subject_id);
        self.test_date = self.test_date.or(later.test_date);
        self.age = self.age.or(later.age);
        self.language = self.language.or(later.language);
        self
    }

    /// Final subject info. Returns whether a real id was found; without
    /// one a placeholder id keeps the document's records from mixing
    /// with any other subject.
    pub fn resolve(self) -> (SubjectInfo, bool) {
        match self.subject_id {
            Some(subject_id) => (
                SubjectInfo {
                    subject_id,
                    test_date: self.test_date,
                    age: self.age,
                    language: self.language,
                },
                true,
            ),
            None => (
                SubjectInfo {
                    test_date: self.test_date,
                    age: self.age,
                    language: self.language,
                    ..SubjectInfo::unidentified()
                },
                false,
            ),
        }
    }
}
