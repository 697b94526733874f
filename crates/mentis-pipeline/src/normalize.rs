//! Intermediate records into the canonical schema.
//!
//! Pure mapping. Validity is stamped from what the extractor already
//! knows (a field that failed to parse, a response off the printed
//! scale); cross-record checks such as duplicates happen later in
//! validation.

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{
    AsrsItem, DsmCriterion, IntermediateRecord, NpqDomainScore, NpqItem, SatTrial,
};
use mentis_core::models::record::{
    CanonicalRecord, CanonicalValue, Presence, RecordMetadata, RecordValidity, ScaleKind,
};

/// Stable item code for an NPQ domain summary row, derived from the
/// printed domain name ("Attention" -> "attention", "Anxiety/Depression"
/// -> "anxiety_depression").
fn domain_code(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn npq_item(item: NpqItem, subject_id: &str) -> CanonicalRecord {
    let (value, validity) = match item.response {
        Some(v) if item.out_of_scale => (CanonicalValue::Integer(v), RecordValidity::OutOfRange),
        Some(v) => (CanonicalValue::Integer(v), RecordValidity::Valid),
        None => (CanonicalValue::Missing, RecordValidity::Unparsed),
    };
    CanonicalRecord {
        subject_id: subject_id.to_string(),
        instrument: InstrumentKind::Npq,
        item_code: format!("Q{}", item.question_number),
        value,
        scale: ScaleKind::SeverityScale,
        source_page: item.origin.page,
        segment_id: item.origin.segment_id,
        validity,
        metadata: RecordMetadata {
            question_text: item.question_text,
            severity: item.severity,
            ..RecordMetadata::default()
        },
    }
}

fn npq_domain(domain: NpqDomainScore, subject_id: &str) -> CanonicalRecord {
    CanonicalRecord {
        subject_id: subject_id.to_string(),
        instrument: InstrumentKind::Npq,
        item_code: domain_code(&domain.domain),
        value: CanonicalValue::Integer(domain.score),
        scale: ScaleKind::DomainScore,
        source_page: domain.origin.page,
        segment_id: domain.origin.segment_id,
        validity: RecordValidity::Valid,
        metadata: RecordMetadata {
            question_text: Some(domain.domain),
            severity: domain.severity,
            ..RecordMetadata::default()
        },
    }
}

fn dsm_criterion(criterion: DsmCriterion, subject_id: &str) -> CanonicalRecord {
    let validity = match criterion.present {
        Presence::Unknown => RecordValidity::Unparsed,
        _ => RecordValidity::Valid,
    };
    CanonicalRecord {
        subject_id: subject_id.to_string(),
        instrument: InstrumentKind::Dsm,
        item_code: criterion.criterion_code,
        value: CanonicalValue::Presence(criterion.present),
        scale: ScaleKind::Criterion,
        source_page: criterion.origin.page,
        segment_id: criterion.origin.segment_id,
        validity,
        metadata: RecordMetadata {
            section: Some(criterion.category.label().to_string()),
            notes: criterion.notes,
            ..RecordMetadata::default()
        },
    }
}

fn asrs_item(item: AsrsItem, subject_id: &str) -> CanonicalRecord {
    let (value, validity) = match item.frequency {
        Some(v) => (CanonicalValue::Integer(v), RecordValidity::Valid),
        None => (CanonicalValue::Missing, RecordValidity::Unparsed),
    };
    CanonicalRecord {
        subject_id: subject_id.to_string(),
        instrument: InstrumentKind::Asrs,
        item_code: format!("{}{}", item.section.letter(), item.item_number),
        value,
        scale: ScaleKind::FrequencyScale,
        source_page: item.origin.page,
        segment_id: item.origin.segment_id,
        validity,
        metadata: RecordMetadata {
            section: Some(item.section.label().to_string()),
            response_text: item.response_text,
            ..RecordMetadata::default()
        },
    }
}

fn sat_trial(trial: SatTrial, subject_id: &str) -> CanonicalRecord {
    let (value, validity) = match trial.reaction_time_ms {
        Some(v) => (CanonicalValue::Real(v), RecordValidity::Valid),
        None => (CanonicalValue::Missing, RecordValidity::Unparsed),
    };
    CanonicalRecord {
        subject_id: subject_id.to_string(),
        instrument: InstrumentKind::Sat,
        item_code: format!("trial-{}", trial.trial_index),
        value,
        scale: ScaleKind::Milliseconds,
        source_page: trial.origin.page,
        segment_id: trial.origin.segment_id,
        validity,
        metadata: RecordMetadata {
            error_trial: Some(trial.is_error),
            ..RecordMetadata::default()
        },
    }
}

/// Map one intermediate record into the canonical schema under the
/// resolved subject id.
pub fn normalize_record(record: IntermediateRecord, subject_id: &str) -> CanonicalRecord {
    match record {
        IntermediateRecord::NpqItem(item) => npq_item(item, subject_id),
        IntermediateRecord::NpqDomain(domain) => npq_domain(domain, subject_id),
        IntermediateRecord::DsmCriterion(criterion) => dsm_criterion(criterion, subject_id),
        IntermediateRecord::AsrsItem(item) => asrs_item(item, subject_id),
        IntermediateRecord::SatTrial(trial) => sat_trial(trial, subject_id),
    }
}
