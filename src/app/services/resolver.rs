//! Request resolution against the reference index
//!
//! Each request is looked up independently, in order. Hits are projected to
//! WGS84; misses and unusable coordinates become failures. Nothing here
//! aborts on bad data.

use crate::app::services::projection::Lambert93;
use crate::app::services::reference_index::ReferenceIndex;
use crate::models::{Failure, FailureReason, PointRequest, ReferenceRecord, ResolvedPoint};
use tracing::{debug, warn};

/// Points and failures produced by one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub points: Vec<ResolvedPoint>,
    pub failures: Vec<Failure>,
}

/// Joins requests to a borrowed reference index
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a ReferenceIndex,
    projection: Lambert93,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ReferenceIndex) -> Self {
        Self {
            index,
            projection: Lambert93::new(),
        }
    }

    /// Resolve every request, keeping input order in both outputs
    ///
    /// Duplicate requests are resolved independently and each yields its own
    /// point.
    pub fn resolve(&self, requests: &[PointRequest]) -> Resolution {
        let mut resolution = Resolution::default();

        for request in requests {
            match self.resolve_one(request) {
                Ok(point) => resolution.points.push(point),
                Err(failure) => resolution.failures.push(failure),
            }
        }

        debug!(
            "Resolved {} of {} request(s)",
            resolution.points.len(),
            requests.len()
        );
        resolution
    }

    /// Resolve a single request
    pub fn resolve_one(&self, request: &PointRequest) -> Result<ResolvedPoint, Failure> {
        let key = request.key();

        let Some(record) = self.index.get_key(&key) else {
            debug!("Unknown reference point {} (line {})", key, request.line_number);
            return Err(Failure::new(
                request.line_number,
                request.raw_line.clone(),
                FailureReason::UnknownIdentifier,
            ));
        };

        self.resolve_record(record, request.description.clone(), request.line_number)
            .ok_or_else(|| {
                Failure::new(
                    request.line_number,
                    request.raw_line.clone(),
                    FailureReason::InvalidCoordinates,
                )
            })
    }

    /// Project one reference record; `None` when it has no drawable position
    pub fn resolve_record(
        &self,
        record: &ReferenceRecord,
        description: Option<String>,
        line_number: usize,
    ) -> Option<ResolvedPoint> {
        let geo = match self.projection.to_wgs84(record.x, record.y) {
            Ok(geo) => geo,
            Err(e) => {
                warn!("Cannot project {}: {}", record.key(), e);
                return None;
            }
        };

        if !geo.is_within_bounds() {
            warn!(
                "Reference point {} projects outside geographic bounds: ({}, {})",
                record.key(),
                geo.longitude,
                geo.latitude
            );
            return None;
        }

        Some(ResolvedPoint {
            primary: record.primary.clone(),
            secondary: record.secondary.clone(),
            label: record.label.clone(),
            description,
            longitude: geo.longitude,
            latitude: geo.latitude,
            line_number,
        })
    }
}
