use serde::{Deserialize, Serialize};

use crate::coords::LatLng;

/// Axis-aligned bounding region in latitude/longitude.
///
/// Corners are `south_west = (min lat, min lng)` and
/// `north_east = (max lat, max lng)`. Regions never wrap the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl GeoBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        GeoBounds {
            south_west,
            north_east,
        }
    }

    /// Zero-extent region around a single coordinate.
    pub fn from_point(p: LatLng) -> Self {
        GeoBounds::new(p, p)
    }

    /// Minimal region enclosing every coordinate, or `None` for an empty input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = GeoBounds::from_point(first);
        for p in iter {
            out.extend(p);
        }
        Some(out)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }

    /// A region with no extent on either axis (all corners coincide).
    pub fn is_degenerate(&self) -> bool {
        self.lat_span() == 0.0 && self.lng_span() == 0.0
    }

    /// Finite, correctly ordered and with a non-zero extent.
    ///
    /// Fitting a camera to a degenerate region is undefined, so those count as
    /// invalid too.
    pub fn is_valid(&self) -> bool {
        self.south_west.is_finite()
            && self.north_east.is_finite()
            && self.lat_span() >= 0.0
            && self.lng_span() >= 0.0
            && !self.is_degenerate()
    }
}
