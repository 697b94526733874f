//! Instrument classification over segmented pages.
//!
//! Keyword hits against an instrument profile win outright, longest
//! match first. Rows and tables that follow a matched segment inherit
//! its instrument as a continuation. An exact keyword tie is never
//! guessed: the segment stays unknown and an ambiguity finding is
//! recorded.

use mentis_core::models::finding::{Finding, IssueKind};
use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::segment::{ClassifiedSegment, MatchConfidence, Segment, SegmentKind};
use mentis_instruments::all_extractors;
use mentis_instruments::profile::InstrumentProfile;
use tracing::warn;

enum KeywordOutcome {
    Match(InstrumentKind),
    Tie(InstrumentKind, InstrumentKind),
    None,
}

/// Strongest keyword match across all profiles. The byte length of the
/// longest match decides; an exact tie is surfaced instead of guessed.
fn keyword_match(profiles: &[&'static InstrumentProfile], text: &str) -> KeywordOutcome {
    let mut best: Option<(usize, InstrumentKind)> = None;
    let mut tied: Option<InstrumentKind> = None;
    for profile in profiles {
        let Some(strength) = profile.match_strength(text) else {
            continue;
        };
        match best {
            None => best = Some((strength, profile.kind)),
            Some((top, _)) if strength > top => {
                best = Some((strength, profile.kind));
                tied = None;
            }
            Some((top, _)) if strength == top => tied = Some(profile.kind),
            Some(_) => {}
        }
    }
    match (best, tied) {
        (Some((_, first)), Some(second)) => KeywordOutcome::Tie(first, second),
        (Some((_, kind)), None) => KeywordOutcome::Match(kind),
        (None, _) => KeywordOutcome::None,
    }
}

/// Assign an instrument to every segment of one page.
///
/// The continuation hint only survives an unbroken run of assigned
/// segments: any segment that ends up unknown clears it, and a fresh
/// keyword match replaces it.
pub fn classify_page(segments: Vec<Segment>) -> (Vec<ClassifiedSegment>, Vec<Finding>) {
    let extractors = all_extractors();
    let profiles: Vec<&'static InstrumentProfile> =
        extractors.iter().map(|e| e.profile()).collect();

    let mut classified = Vec::with_capacity(segments.len());
    let mut findings = Vec::new();
    let mut hint: Option<InstrumentKind> = None;

    for segment in segments {
        let text = segment.text();
        let (instrument, confidence) = match keyword_match(&profiles, &text) {
            KeywordOutcome::Match(kind) => {
                hint = Some(kind);
                (kind, MatchConfidence::Keyword)
            }
            KeywordOutcome::Tie(first, second) => {
                warn!(
                    segment = %segment.id,
                    first = %first,
                    second = %second,
                    "keyword tie, segment left unknown"
                );
                findings.push(
                    Finding::new(
                        IssueKind::ClassificationAmbiguity,
                        format!("keyword tie between {first} and {second}"),
                    )
                    .at_segment(segment.id),
                );
                hint = None;
                (InstrumentKind::Unknown, MatchConfidence::Unmatched)
            }
            KeywordOutcome::None => match (hint, segment.kind) {
                (Some(kind), SegmentKind::Row | SegmentKind::Table) => {
                    (kind, MatchConfidence::Continuation)
                }
                _ => {
                    hint = None;
                    (InstrumentKind::Unknown, MatchConfidence::Unmatched)
                }
            },
        };
        classified.push(ClassifiedSegment {
            segment,
            instrument,
            confidence,
        });
    }

    (classified, findings)
}
