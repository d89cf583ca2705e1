use catalog::PointOfInterest;
use foundation::bounds::GeoBounds;
use foundation::coords::LatLng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::renderer::MapRenderer;

/// Identifies one issued camera transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub u64);

/// Easing curve the renderer applies over a flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
}

/// Animation parameters for a camera move.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flight {
    pub duration_s: f64,
    pub easing: Easing,
}

impl Default for Flight {
    fn default() -> Self {
        Self {
            duration_s: 1.2,
            easing: Easing::default(),
        }
    }
}

/// Zoom levels used when framing a single point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusZoom {
    /// Sparse coastal area: wider view for orientation.
    pub coastal: u8,
    /// Dense historic core.
    pub urban: u8,
}

impl Default for FocusZoom {
    fn default() -> Self {
        Self {
            coastal: 13,
            urban: 16,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Focus {
    pub center: LatLng,
    pub zoom: u8,
}

/// Camera target handed to the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Region { bounds: GeoBounds, padding_px: u32 },
    Focus(Focus),
}

/// Computes camera targets and issues animated transitions.
///
/// The controller keeps the last target it issued only for inspection; the
/// renderer's camera is the authority on what is displayed.
#[derive(Debug)]
pub struct ViewportController {
    flight: Flight,
    padding_px: u32,
    zoom: FocusZoom,
    next_transition: u64,
    last_target: Option<Viewport>,
}

impl ViewportController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            flight: config.flight,
            padding_px: config.region_padding_px,
            zoom: config.focus_zoom,
            next_transition: 0,
            last_target: None,
        }
    }

    pub fn flight(&self) -> Flight {
        self.flight
    }

    pub fn last_target(&self) -> Option<Viewport> {
        self.last_target
    }

    /// Minimal region enclosing `points`, or `None` when there is nothing to frame.
    pub fn enclosing_region(&self, points: &[&PointOfInterest]) -> Option<GeoBounds> {
        GeoBounds::enclosing(points.iter().map(|p| p.position()))
    }

    pub fn focus_on(&self, point: &PointOfInterest) -> Focus {
        let zoom = if point.area.is_coastal() {
            self.zoom.coastal
        } else {
            self.zoom.urban
        };
        Focus {
            center: point.position(),
            zoom,
        }
    }

    /// Target that frames all of `points`.
    ///
    /// A region the renderer cannot fit (zero extent, NaN) falls back to
    /// single-point framing of the first point.
    pub fn framing<R: MapRenderer + ?Sized>(
        &self,
        points: &[&PointOfInterest],
        renderer: &R,
    ) -> Option<Viewport> {
        let bounds = self.enclosing_region(points)?;
        if bounds.is_valid() && renderer.is_valid_region(&bounds) {
            return Some(Viewport::Region {
                bounds,
                padding_px: self.padding_px,
            });
        }
        tracing::debug!(?bounds, "region not fittable, framing a single point");
        points.first().map(|p| Viewport::Focus(self.focus_on(p)))
    }

    /// Animates to the region enclosing `points`. Issues nothing for an empty set.
    pub fn fit<R: MapRenderer + ?Sized>(
        &mut self,
        points: &[&PointOfInterest],
        renderer: &mut R,
    ) -> Option<TransitionId> {
        let target = self.framing(points, renderer)?;
        Some(self.issue(target, renderer))
    }

    pub fn fly_to_point<R: MapRenderer + ?Sized>(
        &mut self,
        point: &PointOfInterest,
        renderer: &mut R,
    ) -> TransitionId {
        let focus = self.focus_on(point);
        self.issue(Viewport::Focus(focus), renderer)
    }

    /// Fire-and-forget: a newer transition simply redirects the camera.
    pub fn issue<R: MapRenderer + ?Sized>(&mut self, target: Viewport, renderer: &mut R) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition = self.next_transition.wrapping_add(1);
        match target {
            Viewport::Region { bounds, padding_px } => {
                renderer.fly_to_bounds(id, bounds, padding_px, self.flight)
            }
            Viewport::Focus(focus) => renderer.fly_to(id, focus.center, focus.zoom, self.flight),
        }
        self.last_target = Some(target);
        id
    }
}
