//! Projection seam.
//!
//! Projection math lives outside this crate. Callers inject anything that maps
//! geographic locations onto a metric plane; once projected, all distances
//! are planar.

use crate::error::{Result, TripError};
use crate::Location;

/// Maps longitude/latitude to planar x/y in meters.
pub trait Projection: Send + Sync {
    fn project(&self, points: &[Location]) -> Result<Vec<Location>>;
}

impl<F> Projection for F
where
    F: Fn(&[Location]) -> Result<Vec<Location>> + Send + Sync,
{
    fn project(&self, points: &[Location]) -> Result<Vec<Location>> {
        self(points)
    }
}

/// Project and check that the projection kept one output point per input.
pub fn project_checked(projection: &dyn Projection, points: &[Location]) -> Result<Vec<Location>> {
    let projected = projection.project(points)?;
    if projected.len() != points.len() {
        return Err(TripError::Projection {
            message: format!(
                "expected {} projected points, got {}",
                points.len(),
                projected.len()
            ),
        });
    }
    if let Some(bad) = projected
        .iter()
        .find(|p| !p.longitude.is_finite() || !p.latitude.is_finite())
    {
        return Err(TripError::Projection {
            message: format!("non-finite projected point {:?}", bad),
        });
    }
    Ok(projected)
}
