use catalog::{Catalog, Category, PointOfInterest};
use foundation::time::Time;
use runtime::event_bus::{Event, EventBus};
use runtime::metrics::Metrics;
use runtime::timers::{TimerId, TimerQueue};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::filter::FilterState;
use crate::markers::MarkerRegistry;
use crate::renderer::MapRenderer;
use crate::selection::{OverlayOutcome, SelectionChange, SelectionController, SelectionState};
use crate::viewport::{TransitionId, Viewport, ViewportController};
use crate::visibility::{AreaGroup, group_by_area, visible};

/// Work deferred through the engine's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Debounced camera refit after filter changes.
    Refit,
    /// Overlay request armed after the focus transition it names.
    OpenOverlay(TransitionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    UnknownPoint(String),
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::UnknownPoint(id) => write!(f, "no point of interest with id {id}"),
        }
    }
}

impl std::error::Error for SelectError {}

/// View-state synchronization engine.
///
/// Reconciles category visibility, the active selection and the camera, and
/// drives the renderer. Single-threaded: every operation runs to completion;
/// deferred work fires only from `advance`/`advance_to`, on a clock the caller
/// drives.
///
/// Ordering contract:
/// - A filter change updates visibility and the marker registry before its
///   refit timer is armed.
/// - A selection issues its camera focus before its overlay timer is armed.
pub struct ViewSync<R: MapRenderer> {
    catalog: Catalog,
    config: EngineConfig,
    filter: FilterState,
    markers: MarkerRegistry,
    viewport: ViewportController,
    selection: SelectionController,
    timers: TimerQueue<Deferred>,
    pending_refit: Option<TimerId>,
    renderer: R,
    bus: EventBus,
    metrics: Metrics,
}

impl<R: MapRenderer> ViewSync<R> {
    pub fn new(catalog: Catalog, config: EngineConfig, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            filter: config.initial_category_visibility,
            markers: MarkerRegistry::new(),
            viewport: ViewportController::new(&config),
            selection: SelectionController::new(config.overlay_open_delay_s),
            timers: TimerQueue::new(),
            pending_refit: None,
            catalog,
            config,
            renderer,
            bus: EventBus::new(),
            metrics: Metrics::new(),
        })
    }

    /// First display: creates markers for the visible set and fits the camera.
    pub fn start(&mut self) -> Option<TransitionId> {
        info!(
            points = self.catalog.len(),
            primary = self.filter.primary,
            secondary = self.filter.secondary,
            completion = self.renderer.reports_completion(),
            "view sync starting"
        );
        self.reconcile_markers();
        self.fit_visible("initial fit")
    }

    pub fn now(&self) -> Time {
        self.timers.now()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn visible(&self) -> Vec<&PointOfInterest> {
        visible(&self.catalog, &self.filter)
    }

    /// Visible points grouped by area, for the list view.
    pub fn grouped(&self) -> Vec<AreaGroup<'_>> {
        group_by_area(&self.visible())
    }

    /// Nothing is visible; the presentation shows its empty state.
    pub fn is_empty_state(&self) -> bool {
        !self.catalog.iter().any(|p| self.filter.is_visible(p.category))
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn selected_point(&self) -> Option<&PointOfInterest> {
        self.selection
            .state()
            .selected_id()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn last_target(&self) -> Option<Viewport> {
        self.viewport.last_target()
    }

    pub fn refit_pending(&self) -> bool {
        self.pending_refit.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Hands recorded events to the caller and forgets them, so a long
    /// session does not accumulate its whole history.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Flips a category and returns its new visibility.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        let now_visible = self.filter.toggle(category);
        self.filter_changed(category);
        now_visible
    }

    /// Returns `true` if the visibility changed; setting the current value is
    /// a no-op.
    pub fn set_category_visible(&mut self, category: Category, visible: bool) -> bool {
        if !self.filter.set(category, visible) {
            return false;
        }
        self.filter_changed(category);
        true
    }

    /// Selects a point (from the list or its marker). Unknown ids leave the
    /// state untouched.
    pub fn select(&mut self, id: &str) -> Result<SelectionChange, SelectError> {
        let Some(point) = self.catalog.get(id) else {
            return Err(SelectError::UnknownPoint(id.to_string()));
        };
        let change = self.selection.select(
            point,
            &mut self.viewport,
            &mut self.renderer,
            &mut self.timers,
        );
        let now = self.timers.now();
        self.bus
            .emit(now, "selection", format!("{} -> {}", change.from, change.to));
        self.metrics.inc_counter("camera.fly_to", 1);
        info!(%id, from = %change.from, "point selected");
        Ok(change)
    }

    /// "Fit all": clears the selection and frames the visible set.
    ///
    /// Returns `None` when nothing is visible; the camera is left untouched.
    pub fn reset_view(&mut self) -> Option<TransitionId> {
        // The reset frames the current visible set already.
        if let Some(refit) = self.pending_refit.take() {
            self.timers.cancel(refit);
        }
        let points = visible(&self.catalog, &self.filter);
        let change = self.selection.reset(
            &points,
            &mut self.viewport,
            &mut self.renderer,
            &mut self.timers,
        );
        let now = self.timers.now();
        self.bus
            .emit(now, "selection", format!("{} -> {}", change.from, change.to));
        match change.transition {
            Some(t) => {
                self.metrics.inc_counter("camera.fit", 1);
                self.bus.emit(now, "camera", format!("reset fit #{}", t.0));
            }
            None => {
                self.metrics.inc_counter("camera.skipped_empty", 1);
                self.bus.emit(now, "camera", "reset: nothing visible");
            }
        }
        change.transition
    }

    /// Renderer callback: `transition` finished animating.
    pub fn transition_settled(&mut self, transition: TransitionId) {
        let outcome = self.selection.transition_settled(
            transition,
            &self.markers,
            &mut self.renderer,
            &mut self.timers,
        );
        if let Some(outcome) = outcome {
            self.record_overlay(outcome);
        }
    }

    /// Advances the clock by `dt_s` seconds, firing due deferred work.
    pub fn advance(&mut self, dt_s: f64) {
        let target = self.timers.now().after(dt_s.max(0.0));
        self.advance_to(target);
    }

    /// Fires deferred work due at or before `t` in deadline order, then moves
    /// the clock to `t`. A non-finite `t` is ignored.
    pub fn advance_to(&mut self, t: Time) {
        if !t.0.is_finite() {
            warn!(t = t.0, "ignoring non-finite clock target");
            return;
        }
        while let Some((id, task)) = self.timers.pop_due(t) {
            match task {
                Deferred::Refit => {
                    if self.pending_refit == Some(id) {
                        self.pending_refit = None;
                    }
                    self.refit_after_filter();
                }
                Deferred::OpenOverlay(transition) => {
                    let outcome =
                        self.selection
                            .open_overlay(transition, &self.markers, &mut self.renderer);
                    self.record_overlay(outcome);
                }
            }
        }
        self.timers.set_now(t);
    }

    fn filter_changed(&mut self, category: Category) {
        let now = self.timers.now();
        let shown = self.filter.is_visible(category);
        debug!(category = category.as_str(), shown, "filter changed");
        self.bus.emit(
            now,
            "filter",
            format!("{} {}", category.as_str(), if shown { "shown" } else { "hidden" }),
        );
        self.reconcile_markers();

        if let Some(prev) = self.pending_refit.take() {
            self.timers.cancel(prev);
        }
        self.pending_refit = Some(
            self.timers
                .schedule(self.config.filter_debounce_s, Deferred::Refit),
        );
    }

    fn reconcile_markers(&mut self) {
        let points = visible(&self.catalog, &self.filter);
        let summary = self.markers.rebuild(&points, &mut self.renderer);
        self.metrics
            .inc_counter("markers.created", summary.created as u64);
        self.metrics
            .inc_counter("markers.removed", summary.removed as u64);
        self.metrics.set_gauge("markers.live", self.markers.len() as i64);
        self.bus.emit(
            self.timers.now(),
            "markers",
            format!(
                "+{} ={} -{}",
                summary.created, summary.kept, summary.removed
            ),
        );
    }

    fn refit_after_filter(&mut self) {
        let now = self.timers.now();
        if self.selection.focus_in_flight(now) {
            debug!("refit skipped: selection focus in flight");
            self.metrics.inc_counter("camera.skipped_in_flight", 1);
            self.bus
                .emit(now, "camera", "refit skipped: focus in flight");
            return;
        }
        let _ = self.fit_visible("refit");
    }

    fn fit_visible(&mut self, reason: &'static str) -> Option<TransitionId> {
        let now = self.timers.now();
        let points = visible(&self.catalog, &self.filter);
        match self.viewport.fit(&points, &mut self.renderer) {
            Some(t) => {
                self.metrics.inc_counter("camera.fit", 1);
                self.bus.emit(now, "camera", format!("{reason} #{}", t.0));
                Some(t)
            }
            None => {
                debug!(reason, "nothing visible, camera left in place");
                self.metrics.inc_counter("camera.skipped_empty", 1);
                self.bus
                    .emit(now, "camera", format!("{reason}: nothing visible"));
                None
            }
        }
    }

    fn record_overlay(&mut self, outcome: OverlayOutcome) {
        let now = self.timers.now();
        let selected = self.selection.state().to_string();
        match outcome {
            OverlayOutcome::Opened(_) => {
                self.metrics.inc_counter("overlay.opened", 1);
                self.bus.emit(now, "overlay", format!("opened {selected}"));
            }
            OverlayOutcome::NoMarker => {
                debug!(%selected, "overlay dropped: no marker");
                self.metrics.inc_counter("overlay.dropped", 1);
                self.bus.emit(now, "overlay", format!("dropped {selected}"));
            }
            OverlayOutcome::Superseded => {
                self.metrics.inc_counter("overlay.superseded", 1);
            }
        }
    }
}
