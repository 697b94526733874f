//! mentis-instruments
//!
//! Instrument definitions and extractors. Pure data and pure
//! functions: each extractor turns classified segments into
//! intermediate records and performs no I/O. Field-level parse
//! problems are carried inside the records, never raised.

pub mod extractors;
pub mod profile;

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::IntermediateRecord;
use mentis_core::models::segment::ClassifiedSegment;

use crate::profile::InstrumentProfile;

/// Trait implemented by each instrument extractor.
pub trait InstrumentExtractor: Send + Sync {
    /// Which instrument this extractor understands.
    fn kind(&self) -> InstrumentKind;

    /// Classification keywords, expected items, and ranges for the
    /// instrument.
    fn profile(&self) -> &'static InstrumentProfile;

    /// Parse one classified segment into intermediate records. A
    /// segment that carries nothing for this instrument yields an
    /// empty vec.
    fn extract(&self, segment: &ClassifiedSegment) -> Vec<IntermediateRecord>;
}

/// Return all registered extractors.
pub fn all_extractors() -> Vec<Box<dyn InstrumentExtractor>> {
    vec![
        Box::new(extractors::npq::NpqExtractor),
        Box::new(extractors::dsm::DsmExtractor),
        Box::new(extractors::asrs::AsrsExtractor),
        Box::new(extractors::sat::SatExtractor),
    ]
}

/// Look up an extractor by instrument kind.
pub fn extractor_for(kind: InstrumentKind) -> Option<Box<dyn InstrumentExtractor>> {
    all_extractors().into_iter().find(|e| e.kind() == kind)
}

/// Look up the profile for an instrument kind. `Unknown` has none.
pub fn profile_for(kind: InstrumentKind) -> Option<&'static InstrumentProfile> {
    extractor_for(kind).map(|e| e.profile())
}
