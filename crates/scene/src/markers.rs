use std::collections::HashMap;

use catalog::PointOfInterest;
use foundation::handles::Handle;
use serde::{Deserialize, Serialize};

use crate::renderer::MapRenderer;

/// Renderer-issued handle addressing one on-map marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    pub created: usize,
    pub kept: usize,
    pub removed: usize,
}

/// Point id → marker handle back-references.
///
/// The registry never owns markers. It is rebuilt from the visible set on
/// every visibility change; lookups must tolerate missing ids.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    handles: HashMap<String, MarkerHandle>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle previously registered for `id`, if any.
    pub fn register(&mut self, id: impl Into<String>, handle: MarkerHandle) -> Option<MarkerHandle> {
        self.handles.insert(id.into(), handle)
    }

    pub fn unregister(&mut self, id: &str) -> Option<MarkerHandle> {
        self.handles.remove(id)
    }

    pub fn lookup(&self, id: &str) -> Option<MarkerHandle> {
        self.handles.get(id).copied()
    }

    /// Rebuilds the map so that it holds exactly the `visible` points.
    ///
    /// Points that stay visible keep their marker; newly visible points get a
    /// marker from the renderer; markers of points no longer visible are
    /// handed back to the renderer for removal.
    pub fn rebuild<R: MapRenderer + ?Sized>(
        &mut self,
        visible: &[&PointOfInterest],
        renderer: &mut R,
    ) -> ReconcileSummary {
        let mut previous = std::mem::take(&mut self.handles);
        let mut summary = ReconcileSummary::default();

        for point in visible {
            let handle = match previous.remove(&point.id) {
                Some(handle) => {
                    summary.kept += 1;
                    handle
                }
                None => {
                    summary.created += 1;
                    renderer.create_marker(point)
                }
            };
            self.handles.insert(point.id.clone(), handle);
        }

        // Sorted so removal order does not depend on hash iteration.
        let mut stale: Vec<(String, MarkerHandle)> = previous.into_iter().collect();
        stale.sort_by(|a, b| a.0.cmp(&b.0));
        for (_id, handle) in stale {
            summary.removed += 1;
            renderer.remove_marker(handle);
        }

        tracing::debug!(
            created = summary.created,
            kept = summary.kept,
            removed = summary.removed,
            "marker registry rebuilt"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerHandle, MarkerRegistry, ReconcileSummary};
    use crate::filter::FilterState;
    use crate::renderer::RecordingRenderer;
    use crate::visibility::visible;
    use catalog::Catalog;
    use foundation::handles::Handle;

    #[test]
    fn register_lookup_unregister() {
        let mut reg = MarkerRegistry::new();
        let h = MarkerHandle(Handle::new(3, 0));
        assert!(reg.lookup("kiyomizu").is_none());
        assert!(reg.register("kiyomizu", h).is_none());
        assert_eq!(reg.lookup("kiyomizu"), Some(h));
        assert_eq!(reg.unregister("kiyomizu"), Some(h));
        assert!(reg.lookup("kiyomizu").is_none());
        assert!(reg.unregister("kiyomizu").is_none());
    }

    #[test]
    fn rebuild_tracks_visible_set_exactly() {
        let catalog = Catalog::builtin().unwrap();
        let mut reg = MarkerRegistry::new();
        let mut r = RecordingRenderer::new();

        let primary = visible(&catalog, &FilterState::new(true, false));
        let s = reg.rebuild(&primary, &mut r);
        assert_eq!(s, ReconcileSummary { created: 14, kept: 0, removed: 0 });
        let kinkakuji = reg.lookup("kinkakuji").unwrap();

        let both = visible(&catalog, &FilterState::new(true, true));
        let s = reg.rebuild(&both, &mut r);
        assert_eq!(s, ReconcileSummary { created: 7, kept: 14, removed: 0 });
        assert_eq!(reg.lookup("kinkakuji"), Some(kinkakuji));

        let secondary = visible(&catalog, &FilterState::new(false, true));
        let s = reg.rebuild(&secondary, &mut r);
        assert_eq!(s, ReconcileSummary { created: 0, kept: 7, removed: 14 });
        assert!(reg.lookup("kinkakuji").is_none());
        assert!(!r.is_live(kinkakuji));
        assert_eq!(reg.len(), 7);
        assert_eq!(r.live_markers(), 7);
        for p in &secondary {
            assert!(r.is_live(reg.lookup(&p.id).unwrap()));
        }
    }

    #[test]
    fn rebuild_to_empty_releases_everything() {
        let catalog = Catalog::builtin().unwrap();
        let mut reg = MarkerRegistry::new();
        let mut r = RecordingRenderer::new();
        reg.rebuild(&visible(&catalog, &FilterState::default()), &mut r);
        let s = reg.rebuild(&[], &mut r);
        assert_eq!(s.removed, 14);
        assert!(reg.is_empty());
        assert_eq!(r.live_markers(), 0);
    }
}
