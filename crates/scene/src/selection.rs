use std::fmt;

use catalog::PointOfInterest;
use foundation::time::{Time, TimeSpan};
use runtime::timers::{TimerId, TimerQueue};

use crate::engine::Deferred;
use crate::markers::{MarkerHandle, MarkerRegistry};
use crate::renderer::MapRenderer;
use crate::viewport::{TransitionId, ViewportController};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(String),
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    pub fn selected_id(&self) -> Option<&str> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(id) => Some(id),
        }
    }
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionState::Idle => write!(f, "idle"),
            SelectionState::Selected(id) => write!(f, "selected({id})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange {
    pub from: SelectionState,
    pub to: SelectionState,
    /// Camera transition issued for the change, if any.
    pub transition: Option<TransitionId>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Opened(MarkerHandle),
    /// The point has no live marker (filtered out since selection).
    NoMarker,
    /// The request no longer belongs to the current selection.
    Superseded,
}

/// Overlay-open request bound to the focus transition it follows.
#[derive(Debug, Clone)]
struct PendingOverlay {
    id: String,
    transition: TransitionId,
    timer: TimerId,
}

/// `Idle` / `Selected(id)` state machine.
///
/// Each selection flies the camera to the point first and only then arms the
/// overlay request; a newer selection or a reset cancels the older request, so
/// at most one overlay request exists at a time.
#[derive(Debug)]
pub struct SelectionController {
    state: SelectionState,
    pending: Option<PendingOverlay>,
    focus_flight: Option<(TransitionId, TimeSpan)>,
    overlay_delay_s: f64,
}

impl SelectionController {
    pub fn new(overlay_delay_s: f64) -> Self {
        Self {
            state: SelectionState::Idle,
            pending: None,
            focus_flight: None,
            overlay_delay_s,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn has_pending_overlay(&self) -> bool {
        self.pending.is_some()
    }

    /// True while a selection-driven camera focus is still animating.
    pub fn focus_in_flight(&self, now: Time) -> bool {
        self.focus_flight
            .is_some_and(|(_, span)| span.contains(now))
    }

    /// `Idle | Selected(_) -> Selected(point.id)`, replacing any previous
    /// selection without passing through `Idle`.
    pub fn select<R: MapRenderer + ?Sized>(
        &mut self,
        point: &PointOfInterest,
        viewport: &mut ViewportController,
        renderer: &mut R,
        timers: &mut TimerQueue<Deferred>,
    ) -> SelectionChange {
        self.cancel_pending(timers);
        let from = std::mem::replace(&mut self.state, SelectionState::Selected(point.id.clone()));

        let transition = viewport.fly_to_point(point, renderer);
        self.focus_flight = Some((
            transition,
            TimeSpan::starting_at(timers.now(), viewport.flight().duration_s),
        ));

        let timer = timers.schedule(self.overlay_delay_s, Deferred::OpenOverlay(transition));
        self.pending = Some(PendingOverlay {
            id: point.id.clone(),
            transition,
            timer,
        });

        SelectionChange {
            from,
            to: self.state.clone(),
            transition: Some(transition),
        }
    }

    /// `* -> Idle`, refitting the camera to `visible`.
    pub fn reset<R: MapRenderer + ?Sized>(
        &mut self,
        visible: &[&PointOfInterest],
        viewport: &mut ViewportController,
        renderer: &mut R,
        timers: &mut TimerQueue<Deferred>,
    ) -> SelectionChange {
        self.cancel_pending(timers);
        self.focus_flight = None;
        let from = std::mem::take(&mut self.state);
        let transition = viewport.fit(visible, renderer);
        SelectionChange {
            from,
            to: SelectionState::Idle,
            transition,
        }
    }

    /// Handles the overlay request armed for `transition`.
    ///
    /// Re-checks at fire time that the request still belongs to the current
    /// selection and that the point still has a marker.
    pub fn open_overlay<R: MapRenderer + ?Sized>(
        &mut self,
        transition: TransitionId,
        markers: &MarkerRegistry,
        renderer: &mut R,
    ) -> OverlayOutcome {
        let Some(pending) = self.pending.take_if(|p| p.transition == transition) else {
            return OverlayOutcome::Superseded;
        };
        if self.state.selected_id() != Some(pending.id.as_str()) {
            return OverlayOutcome::Superseded;
        }
        match markers.lookup(&pending.id) {
            Some(handle) => {
                renderer.open_overlay(handle);
                OverlayOutcome::Opened(handle)
            }
            None => OverlayOutcome::NoMarker,
        }
    }

    /// Renderer reported that `transition` finished animating.
    ///
    /// Opens the pending overlay right away if it follows that transition;
    /// returns `None` when nothing was waiting on it.
    pub fn transition_settled<R: MapRenderer + ?Sized>(
        &mut self,
        transition: TransitionId,
        markers: &MarkerRegistry,
        renderer: &mut R,
        timers: &mut TimerQueue<Deferred>,
    ) -> Option<OverlayOutcome> {
        if self.focus_flight.is_some_and(|(t, _)| t == transition) {
            self.focus_flight = None;
        }
        let timer = self
            .pending
            .as_ref()
            .filter(|p| p.transition == transition)
            .map(|p| p.timer)?;
        timers.cancel(timer);
        Some(self.open_overlay(transition, markers, renderer))
    }

    fn cancel_pending(&mut self, timers: &mut TimerQueue<Deferred>) {
        if let Some(prev) = self.pending.take() {
            timers.cancel(prev.timer);
            tracing::debug!(id = %prev.id, "pending overlay canceled");
        }
    }
}
