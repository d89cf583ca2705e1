use std::collections::BTreeMap;

use catalog::PointOfInterest;
use foundation::bounds::GeoBounds;
use foundation::coords::LatLng;
use foundation::handles::Handle;
use serde::Serialize;

use crate::markers::MarkerHandle;
use crate::viewport::{Easing, Flight, TransitionId};

/// Map-rendering capability driven by the engine.
///
/// Camera calls are fire-and-forget: a call made while another transition is
/// in flight redirects the camera toward the new target. Marker objects are
/// owned by the renderer; the engine only keeps their handles.
pub trait MapRenderer {
    fn fly_to(&mut self, transition: TransitionId, center: LatLng, zoom: u8, flight: Flight);

    fn fly_to_bounds(
        &mut self,
        transition: TransitionId,
        bounds: GeoBounds,
        padding_px: u32,
        flight: Flight,
    );

    fn is_valid_region(&self, bounds: &GeoBounds) -> bool {
        bounds.is_valid()
    }

    fn create_marker(&mut self, point: &PointOfInterest) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn open_overlay(&mut self, handle: MarkerHandle);

    /// Whether the renderer calls back with `transition_settled` when a camera
    /// animation completes.
    fn reports_completion(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    FlyTo {
        transition: TransitionId,
        center: LatLng,
        zoom: u8,
        duration_s: f64,
        easing: Easing,
    },
    FlyToBounds {
        transition: TransitionId,
        bounds: GeoBounds,
        padding_px: u32,
        duration_s: f64,
        easing: Easing,
    },
    CreateMarker {
        id: String,
        handle: MarkerHandle,
    },
    RemoveMarker {
        id: String,
        handle: MarkerHandle,
    },
    OpenOverlay {
        id: String,
        handle: MarkerHandle,
    },
}

impl RenderCommand {
    pub fn is_camera(&self) -> bool {
        matches!(self, RenderCommand::FlyTo { .. } | RenderCommand::FlyToBounds { .. })
    }
}

/// Headless renderer that records every command it receives.
///
/// Marker handles are generational: a point that is removed and shown again
/// gets a fresh handle.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
    live: BTreeMap<MarkerHandle, String>,
    next_index: u32,
    generation: u32,
    completion: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that advertises animation-complete notifications.
    pub fn with_completion() -> Self {
        Self {
            completion: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn camera_commands(&self) -> impl Iterator<Item = &RenderCommand> + '_ {
        self.commands.iter().filter(|c| c.is_camera())
    }

    /// Ids of points whose overlay was opened, in order.
    pub fn opened_overlays(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::OpenOverlay { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn live_markers(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: MarkerHandle) -> bool {
        self.live.contains_key(&handle)
    }
}

impl MapRenderer for RecordingRenderer {
    fn fly_to(&mut self, transition: TransitionId, center: LatLng, zoom: u8, flight: Flight) {
        self.commands.push(RenderCommand::FlyTo {
            transition,
            center,
            zoom,
            duration_s: flight.duration_s,
            easing: flight.easing,
        });
    }

    fn fly_to_bounds(
        &mut self,
        transition: TransitionId,
        bounds: GeoBounds,
        padding_px: u32,
        flight: Flight,
    ) {
        self.commands.push(RenderCommand::FlyToBounds {
            transition,
            bounds,
            padding_px,
            duration_s: flight.duration_s,
            easing: flight.easing,
        });
    }

    fn create_marker(&mut self, point: &PointOfInterest) -> MarkerHandle {
        let handle = MarkerHandle(Handle::new(self.next_index, self.generation));
        self.next_index += 1;
        self.live.insert(handle, point.id.clone());
        self.commands.push(RenderCommand::CreateMarker {
            id: point.id.clone(),
            handle,
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let Some(id) = self.live.remove(&handle) else {
            tracing::warn!(?handle, "remove for unknown marker");
            return;
        };
        if self.live.is_empty() {
            // Indices restart once every marker is gone; bump the generation so
            // stale handles never alias new ones.
            self.next_index = 0;
            self.generation += 1;
        }
        self.commands.push(RenderCommand::RemoveMarker { id, handle });
    }

    fn open_overlay(&mut self, handle: MarkerHandle) {
        let Some(id) = self.live.get(&handle) else {
            tracing::warn!(?handle, "overlay requested for unknown marker");
            return;
        };
        self.commands.push(RenderCommand::OpenOverlay {
            id: id.clone(),
            handle,
        });
    }

    fn reports_completion(&self) -> bool {
        self.completion
    }
}
