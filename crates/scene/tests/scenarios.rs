use catalog::{Catalog, Category};
use foundation::bounds::GeoBounds;
use foundation::coords::LatLng;
use foundation::time::Time;
use pretty_assertions::assert_eq;
use scene::config::EngineConfig;
use scene::renderer::{RecordingRenderer, RenderCommand};
use scene::selection::SelectionState;
use scene::viewport::{Focus, Viewport};
use scene::{SelectError, ViewSync};

fn engine() -> ViewSync<RecordingRenderer> {
    let catalog = Catalog::builtin().unwrap();
    let mut e = ViewSync::new(catalog, EngineConfig::default(), RecordingRenderer::new()).unwrap();
    e.start();
    e
}

fn region_of(catalog: &Catalog, category: Category) -> GeoBounds {
    GeoBounds::enclosing(catalog.of_category(category).map(|p| p.position())).unwrap()
}

fn visible_ids(e: &ViewSync<RecordingRenderer>) -> Vec<String> {
    e.visible().iter().map(|p| p.id.clone()).collect()
}

fn camera_count(e: &ViewSync<RecordingRenderer>) -> usize {
    e.renderer().camera_commands().count()
}

fn last_camera(e: &ViewSync<RecordingRenderer>) -> RenderCommand {
    e.renderer().camera_commands().last().cloned().unwrap()
}

#[test]
fn start_shows_primary_points_and_fits_them() {
    let e = engine();
    let expected: Vec<String> = e
        .catalog()
        .of_category(Category::Primary)
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(visible_ids(&e), expected);
    assert_eq!(e.markers().len(), 14);
    assert_eq!(e.renderer().live_markers(), 14);

    let primary = region_of(e.catalog(), Category::Primary);
    assert_eq!(
        e.last_target(),
        Some(Viewport::Region {
            bounds: primary,
            padding_px: 50
        })
    );
    assert_eq!(camera_count(&e), 1);
}

#[test]
fn switching_to_secondary_only_shows_exactly_the_secondary_subset() {
    let mut e = engine();
    assert!(e.set_category_visible(Category::Secondary, true));
    assert!(e.set_category_visible(Category::Primary, false));

    let expected: Vec<String> = e
        .catalog()
        .of_category(Category::Secondary)
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(visible_ids(&e), expected);
    assert_eq!(e.markers().len(), 7);
    assert!(e.markers().lookup("kinkakuji").is_none());
    assert!(e.markers().lookup("nijojo").is_some());

    e.advance(0.5);
    let secondary = region_of(e.catalog(), Category::Secondary);
    assert!(matches!(
        last_camera(&e),
        RenderCommand::FlyToBounds { bounds, .. } if bounds == secondary
    ));
}

#[test]
fn markers_are_reconciled_before_the_refit_fires() {
    let mut e = engine();
    let before = camera_count(&e);
    e.toggle_category(Category::Secondary);
    assert_eq!(e.markers().len(), 21);
    assert!(e.refit_pending());
    assert_eq!(camera_count(&e), before);

    e.advance(0.1);
    assert!(!e.refit_pending());
    assert_eq!(camera_count(&e), before + 1);
}

#[test]
fn rapid_toggles_collapse_into_one_refit() {
    let mut e = engine();
    let before = camera_count(&e);

    e.toggle_category(Category::Secondary);
    e.advance(0.05);
    e.toggle_category(Category::Primary);
    e.advance(0.05);
    assert_eq!(camera_count(&e), before);

    e.advance_to(Time(1.0));
    assert_eq!(camera_count(&e), before + 1);
    assert_eq!(e.metrics().counter("camera.fit"), 2);
}

#[test]
fn setting_a_flag_to_its_current_value_does_nothing() {
    let mut e = engine();
    assert!(!e.set_category_visible(Category::Primary, true));
    assert!(!e.refit_pending());
    e.advance(1.0);
    assert_eq!(camera_count(&e), 1);
}

#[test]
fn coastal_selection_zooms_wider_than_urban_selection() {
    let mut e = engine();
    e.select("ine").unwrap();
    let coastal = match last_camera(&e) {
        RenderCommand::FlyTo { zoom, center, .. } => {
            assert_eq!(center, LatLng::new(35.67503, 135.28681));
            zoom
        }
        other => panic!("expected fly_to, got {other:?}"),
    };

    e.select("kiyomizu").unwrap();
    let urban = match last_camera(&e) {
        RenderCommand::FlyTo { zoom, .. } => zoom,
        other => panic!("expected fly_to, got {other:?}"),
    };
    assert!(coastal < urban);
    assert_eq!((coastal, urban), (13, 16));
}

#[test]
fn reset_after_selection_goes_idle_and_frames_visible_set() {
    let mut e = engine();
    e.select("kiyomizu").unwrap();
    e.advance(2.0);
    assert_eq!(
        e.selection(),
        &SelectionState::Selected("kiyomizu".to_string())
    );

    e.reset_view().unwrap();
    assert_eq!(e.selection(), &SelectionState::Idle);
    assert!(e.selected_point().is_none());
    let primary = region_of(e.catalog(), Category::Primary);
    assert_eq!(
        e.last_target(),
        Some(Viewport::Region {
            bounds: primary,
            padding_px: 50
        })
    );
}

#[test]
fn reset_twice_targets_the_same_region() {
    let mut e = engine();
    e.select("byodoin").unwrap();
    e.reset_view().unwrap();
    let first = e.last_target();
    e.reset_view().unwrap();
    assert_eq!(e.last_target(), first);
    assert!(matches!(first, Some(Viewport::Region { .. })));
}

#[test]
fn reselect_replaces_without_passing_through_idle() {
    let mut e = engine();
    e.select("kiyomizu").unwrap();
    e.advance(0.5);
    let change = e.select("fushimi").unwrap();
    assert_eq!(change.from, SelectionState::Selected("kiyomizu".into()));
    assert_eq!(change.to, SelectionState::Selected("fushimi".into()));

    e.advance(5.0);
    let transitions: Vec<&str> = e
        .events()
        .of_kind("selection")
        .map(|ev| ev.message.as_str())
        .collect();
    assert_eq!(
        transitions,
        vec![
            "idle -> selected(kiyomizu)",
            "selected(kiyomizu) -> selected(fushimi)"
        ]
    );
    assert_eq!(e.renderer().opened_overlays(), vec!["fushimi"]);
    assert_eq!(e.metrics().counter("overlay.opened"), 1);
}

#[test]
fn overlay_opens_only_after_the_flight() {
    let mut e = engine();
    e.select("kinkakuji").unwrap();
    e.advance(1.2);
    assert!(e.renderer().opened_overlays().is_empty());
    e.advance(0.5);
    assert_eq!(e.renderer().opened_overlays(), vec!["kinkakuji"]);

    let handle = e.markers().lookup("kinkakuji").unwrap();
    assert!(matches!(
        e.renderer().commands().last(),
        Some(RenderCommand::OpenOverlay { handle: h, .. }) if *h == handle
    ));
}

#[test]
fn filtered_out_selection_drops_its_overlay_silently() {
    let mut e = engine();
    e.select("kinkakuji").unwrap();
    e.advance(0.5);
    e.toggle_category(Category::Primary);
    e.advance(5.0);

    assert!(e.renderer().opened_overlays().is_empty());
    assert_eq!(e.metrics().counter("overlay.dropped"), 1);
    assert_eq!(
        e.selection(),
        &SelectionState::Selected("kinkakuji".to_string())
    );
}

#[test]
fn disabling_everything_issues_no_camera_transition() {
    let mut e = engine();
    let before = camera_count(&e);
    e.toggle_category(Category::Primary);
    e.advance(1.0);

    assert!(e.is_empty_state());
    assert!(e.visible().is_empty());
    assert!(e.grouped().is_empty());
    assert_eq!(e.markers().len(), 0);
    assert_eq!(camera_count(&e), before);

    assert!(e.reset_view().is_none());
    assert_eq!(camera_count(&e), before);
    assert_eq!(e.metrics().counter("camera.skipped_empty"), 2);
}

#[test]
fn refit_yields_to_a_selection_focus_in_flight() {
    let mut e = engine();
    e.select("kiyomizu").unwrap();
    e.advance(0.2);
    e.toggle_category(Category::Secondary);
    e.advance(0.5);

    assert_eq!(e.metrics().counter("camera.skipped_in_flight"), 1);
    assert!(matches!(e.last_target(), Some(Viewport::Focus(_))));

    e.advance(2.0);
    e.toggle_category(Category::Secondary);
    e.advance(0.5);
    assert!(matches!(e.last_target(), Some(Viewport::Region { .. })));
    assert_eq!(
        e.selection(),
        &SelectionState::Selected("kiyomizu".to_string())
    );
}

#[test]
fn completion_notification_opens_overlay_without_waiting() {
    let catalog = Catalog::builtin().unwrap();
    let mut e =
        ViewSync::new(catalog, EngineConfig::default(), RecordingRenderer::with_completion())
            .unwrap();
    e.start();

    let t = e.select("sannenzaka").unwrap().transition.unwrap();
    e.transition_settled(t);
    assert_eq!(e.renderer().opened_overlays(), vec!["sannenzaka"]);

    e.advance(5.0);
    assert_eq!(e.renderer().opened_overlays(), vec!["sannenzaka"]);
}

#[test]
fn settling_an_old_transition_does_not_open_the_new_selection() {
    let mut e = engine();
    let old = e.select("kiyomizu").unwrap().transition.unwrap();
    e.select("fushimi").unwrap();
    e.transition_settled(old);
    assert!(e.renderer().opened_overlays().is_empty());

    e.advance(5.0);
    assert_eq!(e.renderer().opened_overlays(), vec!["fushimi"]);
}

#[test]
fn unknown_selection_is_rejected_and_changes_nothing() {
    let mut e = engine();
    let before = e.renderer().commands().len();
    assert_eq!(
        e.select("osaka-castle").unwrap_err(),
        SelectError::UnknownPoint("osaka-castle".to_string())
    );
    assert_eq!(e.selection(), &SelectionState::Idle);
    assert_eq!(e.renderer().commands().len(), before);
}

#[test]
fn single_point_region_falls_back_to_focus_framing() {
    let raw = r#"[
        {"id":"ine","name":"伊根の舟屋","area":"umi-no-kyoto","lat":35.67503,"lng":135.28681,"desc":"","category":"primary"},
        {"id":"toji","name":"東寺","area":"rakunan-uji","lat":34.98114,"lng":135.74762,"desc":"","category":"secondary"}
    ]"#;
    let catalog = Catalog::from_json_str(raw).unwrap();
    let mut e = ViewSync::new(catalog, EngineConfig::default(), RecordingRenderer::new()).unwrap();
    e.start();
    assert_eq!(
        e.last_target(),
        Some(Viewport::Focus(Focus {
            center: LatLng::new(35.67503, 135.28681),
            zoom: 13
        }))
    );
}

#[test]
fn initial_visibility_comes_from_config() {
    let catalog = Catalog::builtin().unwrap();
    let config = EngineConfig::from_json_str(
        r#"{"initial_category_visibility": {"primary": true, "secondary": true}}"#,
    )
    .unwrap();
    let mut e = ViewSync::new(catalog, config, RecordingRenderer::new()).unwrap();
    e.start();
    assert_eq!(e.markers().len(), 21);
    assert_eq!(e.grouped().len(), 4);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let catalog = Catalog::builtin().unwrap();
    let mut config = EngineConfig::default();
    config.overlay_open_delay_s = 0.5;
    assert!(ViewSync::new(catalog, config, RecordingRenderer::new()).is_err());
}

#[test]
fn drained_events_are_released() {
    let mut e = engine();
    for _ in 0..50 {
        e.select("kiyomizu").unwrap();
        e.advance(2.0);
        e.reset_view();
    }
    let drained = e.drain_events();
    assert!(drained.iter().any(|ev| ev.kind == "selection"));
    assert!(e.events().events().is_empty());

    e.select("kiyomizu").unwrap();
    assert_eq!(e.events().events().len(), 1);
    assert_eq!(e.drain_events().len(), 1);
}

#[test]
fn non_finite_clock_target_fires_nothing() {
    let mut e = engine();
    e.select("kinkakuji").unwrap();
    e.advance_to(Time(f64::NAN));
    e.advance_to(Time(f64::INFINITY));
    assert_eq!(e.now(), Time::ZERO);
    assert!(e.renderer().opened_overlays().is_empty());

    e.advance(1.7);
    assert_eq!(e.renderer().opened_overlays(), vec!["kinkakuji"]);
}

#[test]
fn reset_during_debounce_cancels_the_pending_refit() {
    let mut e = engine();
    let before = camera_count(&e);
    e.toggle_category(Category::Secondary);
    assert!(e.refit_pending());

    e.reset_view().unwrap();
    assert!(!e.refit_pending());
    e.advance(1.0);
    assert_eq!(camera_count(&e), before + 1);
    assert_eq!(e.metrics().counter("camera.fit"), 2);
}
