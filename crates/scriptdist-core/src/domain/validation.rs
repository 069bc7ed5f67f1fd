use crate::domain::{
    entities::{DistributionSpec, ReleaseCoordinates, validate_layout},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Services validate through here rather than calling entity checks directly.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_layout(specs: &[DistributionSpec]) -> Result<(), DomainError> {
        validate_layout(specs)
    }

    /// Coordinates are valid by construction; this re-checks the invariants
    /// a hand-built value could break.
    pub fn validate_coordinates(coordinates: &ReleaseCoordinates) -> Result<(), DomainError> {
        let expected = ReleaseCoordinates::resolve(
            coordinates.release_version().clone(),
            coordinates.mode(),
        )?;
        if &expected != coordinates {
            return Err(DomainError::InvalidTagName {
                tag: coordinates.tag_name().to_string(),
                reason: "coordinates do not match the release rules".into(),
            });
        }
        Ok(())
    }
}
