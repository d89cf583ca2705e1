use std::collections::HashMap;

use foundation::coords::LatLng;
use serde::{Deserialize, Serialize};

const BUILTIN_KYOTO_JSON: &str = include_str!("../data/kyoto.json");

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Primary,
    Secondary,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Primary, Category::Secondary];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::Secondary => "secondary",
        }
    }
}

/// Region tag of a point of interest. The set is closed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    RakuchuArashiyama,
    Higashiyama,
    RakunanUji,
    UmiNoKyoto,
}

impl Area {
    /// Presentation order of the area groups.
    pub const ALL: [Area; 4] = [
        Area::RakuchuArashiyama,
        Area::Higashiyama,
        Area::RakunanUji,
        Area::UmiNoKyoto,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Area::RakuchuArashiyama => "洛中・嵐山",
            Area::Higashiyama => "東山",
            Area::RakunanUji => "洛南（宇治）",
            Area::UmiNoKyoto => "海の京都",
        }
    }

    /// The sparse coastal region, far from the dense historic core.
    pub fn is_coastal(self) -> bool {
        matches!(self, Area::UmiNoKyoto)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub area: Area,
    pub lat: f64,
    pub lng: f64,
    pub desc: String,
    #[serde(alias = "type")]
    pub category: Category,
}

impl PointOfInterest {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Outbound route-planning link for this point.
    pub fn directions_url(&self) -> String {
        format!("{DIRECTIONS_BASE_URL}{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
    EmptyId { index: usize },
    DuplicateId(String),
    InvalidCoordinate(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {msg}"),
            CatalogError::EmptyId { index } => write!(f, "catalog entry #{index} has an empty id"),
            CatalogError::DuplicateId(id) => write!(f, "duplicate catalog id: {id}"),
            CatalogError::InvalidCoordinate(id) => {
                write!(f, "catalog entry {id} has an invalid coordinate")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Immutable, ordered collection of points of interest.
///
/// Ordering contract:
/// - Iteration yields points in insertion order; every derived view keeps it.
/// - Identifiers are unique.
#[derive(Debug, Clone)]
pub struct Catalog {
    points: Vec<PointOfInterest>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(points: Vec<PointOfInterest>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(points.len());
        for (index, p) in points.iter().enumerate() {
            if p.id.trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !p.position().is_valid() {
                return Err(CatalogError::InvalidCoordinate(p.id.clone()));
            }
            if by_id.insert(p.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
        }
        Ok(Self { points, by_id })
    }

    /// Parses a JSON array of point records.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let points = serde_json::from_str::<Vec<PointOfInterest>>(raw)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(points)
    }

    /// The Kyoto sightseeing catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_KYOTO_JSON)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> + '_ {
        self.points.iter()
    }

    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.by_id.get(id).map(|&idx| &self.points[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &PointOfInterest> + '_ {
        self.points.iter().filter(move |p| p.category == category)
    }
}
