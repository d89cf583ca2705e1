use catalog::{Area, Catalog, PointOfInterest};

use crate::filter::FilterState;

/// Points whose category is currently visible.
///
/// Ordering contract:
/// - Output follows catalog insertion order; catalog ids are unique, so the
///   result has no duplicates.
pub fn visible<'a>(catalog: &'a Catalog, filter: &FilterState) -> Vec<&'a PointOfInterest> {
    catalog
        .iter()
        .filter(|p| filter.is_visible(p.category))
        .collect()
}

/// Visible points sharing one area tag, for list presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaGroup<'a> {
    pub area: Area,
    pub points: Vec<&'a PointOfInterest>,
}

impl AreaGroup<'_> {
    pub fn count(&self) -> usize {
        self.points.len()
    }
}

/// Groups points by area in `Area::ALL` order, skipping empty areas.
/// Within a group the input order is kept.
pub fn group_by_area<'a>(points: &[&'a PointOfInterest]) -> Vec<AreaGroup<'a>> {
    Area::ALL
        .iter()
        .filter_map(|&area| {
            let members: Vec<_> = points.iter().copied().filter(|p| p.area == area).collect();
            (!members.is_empty()).then_some(AreaGroup {
                area,
                points: members,
            })
        })
        .collect()
}
