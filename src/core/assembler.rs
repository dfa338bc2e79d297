use crate::domain::model::{Feature, FeatureCollection, GeocodeOutcome, GeocodedRecord};

/// Turns ordered outcomes into a GeoJSON FeatureCollection.
///
/// Skipped records are dropped. Every other record yields exactly one
/// Feature whose properties are the untouched source record; the geometry is
/// the first candidate's, or `null` when there is none to take.
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn assemble(entries: Vec<GeocodedRecord>) -> FeatureCollection {
        let features = entries
            .into_iter()
            .filter_map(|entry| {
                let geometry = match entry.outcome {
                    GeocodeOutcome::Skipped => return None,
                    GeocodeOutcome::Success(result) => result
                        .first_candidate()
                        .and_then(|candidate| candidate.geometry.clone()),
                    // already reported by the orchestrator
                    GeocodeOutcome::Failure(_) => None,
                };
                Some(Feature::new(geometry, entry.record))
            })
            .collect();

        FeatureCollection::new(features)
    }
}
