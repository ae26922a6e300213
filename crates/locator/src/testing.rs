//! Recording fakes for the controller's collaborators.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::{FutureExt, LocalBoxFuture};

use foundation::math::{Ecef, Geodetic, HeadingPitchRange};
use foundation::{BoundingSphere, Handle};
use scene::CameraView;
use scene::entity::EntityId;

use crate::config::{LocatorConfig, StartView};
use crate::controller::{Collaborators, Locator, WeakLocator};
use crate::controls::ControlPanel;
use crate::error::{GeolocationError, GlobeError};
use crate::geolocation::{
    Geolocation, GeolocationErrorCode, OnError, OnFix, OnWatchError, OnWatchFix, PositionFix,
    PositionOptions, WatchId,
};
use crate::globe::{Globe, MarkerStyle, TerrainMode};
use crate::log::MemoryLog;

pub fn assert_close(a: f64, b: f64, eps: f64) {
    let diff = (a - b).abs();
    assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
}

/// Ellipsoid terrain, camera at (25, 60, 1000) pitched -30°, asset 12345.
pub fn scenario_config() -> LocatorConfig {
    LocatorConfig {
        use_world_terrain: false,
        start_view: StartView {
            longitude: 25.0,
            latitude: 60.0,
            height: 1000.0,
            heading: 0.0,
            pitch: -30.0,
            roll: 0.0,
        },
        ion_asset_id: 12345,
        discard_stale_fixes: false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlobeCall {
    SetTerrain(TerrainMode),
    SetCameraView(CameraView),
    FlyTo {
        destination: Geodetic,
        duration_s: f64,
    },
    FlyToBoundingSphere {
        sphere: BoundingSphere,
        offset: HeadingPitchRange,
        duration_s: f64,
    },
    LoadTileset(u64),
    Sample(Vec<Geodetic>),
    AddMarker,
    SetMarkerPosition(EntityId, Geodetic),
    SetMarkerVisible(EntityId, bool),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TerrainBehavior {
    Height(f64),
    NoHeight,
    Fail,
    /// Each sample waits for [`FakeGlobe::complete_sample`].
    Deferred,
}

type SampleResult = Result<Vec<Option<f64>>, GlobeError>;

#[derive(Default)]
struct FakeMarker {
    position: Option<Geodetic>,
    visible: bool,
}

pub struct FakeGlobe {
    calls: RefCell<Vec<GlobeCall>>,
    pub terrain: Cell<TerrainBehavior>,
    pub tileset: RefCell<Result<BoundingSphere, String>>,
    pub fail_world_terrain: Cell<bool>,
    samples: RefCell<Vec<Option<oneshot::Sender<SampleResult>>>>,
    markers: RefCell<Vec<FakeMarker>>,
}

impl FakeGlobe {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            terrain: Cell::new(TerrainBehavior::Height(0.0)),
            tileset: RefCell::new(Ok(BoundingSphere::new(
                Ecef::new(2_800_000.0, 1_300_000.0, 5_500_000.0),
                250.0,
            ))),
            fail_world_terrain: Cell::new(false),
            samples: RefCell::new(Vec::new()),
            markers: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GlobeCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn last_fly_to(&self) -> Option<(Geodetic, f64)> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            GlobeCall::FlyTo {
                destination,
                duration_s,
            } => Some((*destination, *duration_s)),
            _ => None,
        })
    }

    pub fn position(&self, marker: EntityId) -> Option<Geodetic> {
        self.markers
            .borrow()
            .get(marker.0.index() as usize)
            .and_then(|m| m.position)
    }

    pub fn is_visible(&self, marker: EntityId) -> bool {
        self.markers
            .borrow()
            .get(marker.0.index() as usize)
            .is_some_and(|m| m.visible)
    }

    pub fn pending_samples(&self) -> usize {
        self.samples.borrow().iter().filter(|s| s.is_some()).count()
    }

    /// Resolves the `index`-th deferred sample, counted from the first one.
    pub fn complete_sample(&self, index: usize, result: SampleResult) {
        let sender = self
            .samples
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take)
            .expect("pending sample");
        let _ = sender.send(result);
    }

    fn record(&self, call: GlobeCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Globe for FakeGlobe {
    fn set_terrain(&self, mode: TerrainMode) -> LocalBoxFuture<'static, Result<(), GlobeError>> {
        self.record(GlobeCall::SetTerrain(mode));
        let result = if mode == TerrainMode::World && self.fail_world_terrain.get() {
            Err(GlobeError::Unavailable("terrain/tileset.json missing".to_string()))
        } else {
            Ok(())
        };
        futures::future::ready(result).boxed_local()
    }

    fn set_camera_view(&self, view: CameraView) {
        self.record(GlobeCall::SetCameraView(view));
    }

    fn fly_to(&self, destination: Geodetic, duration_s: f64) {
        self.record(GlobeCall::FlyTo {
            destination,
            duration_s,
        });
    }

    fn fly_to_bounding_sphere(
        &self,
        sphere: BoundingSphere,
        offset: HeadingPitchRange,
        duration_s: f64,
    ) {
        self.record(GlobeCall::FlyToBoundingSphere {
            sphere,
            offset,
            duration_s,
        });
    }

    fn load_tileset(
        &self,
        asset_id: u64,
    ) -> LocalBoxFuture<'static, Result<BoundingSphere, GlobeError>> {
        self.record(GlobeCall::LoadTileset(asset_id));
        let result = self.tileset.borrow().clone().map_err(GlobeError::Unavailable);
        futures::future::ready(result).boxed_local()
    }

    fn sample_terrain_most_detailed(
        &self,
        positions: Vec<Geodetic>,
    ) -> LocalBoxFuture<'static, SampleResult> {
        let count = positions.len();
        self.record(GlobeCall::Sample(positions));
        match self.terrain.get() {
            TerrainBehavior::Height(h) => futures::future::ready(Ok(vec![Some(h); count])).boxed_local(),
            TerrainBehavior::NoHeight => futures::future::ready(Ok(vec![None; count])).boxed_local(),
            TerrainBehavior::Fail => futures::future::ready(Err(GlobeError::Unavailable(
                "terrain provider failed".to_string(),
            )))
            .boxed_local(),
            TerrainBehavior::Deferred => {
                let (tx, rx) = oneshot::channel();
                self.samples.borrow_mut().push(Some(tx));
                async move {
                    rx.await
                        .unwrap_or_else(|_| Err(GlobeError::Unavailable("cancelled".to_string())))
                }
                .boxed_local()
            }
        }
    }

    fn add_marker(&self, _style: &MarkerStyle) -> EntityId {
        self.record(GlobeCall::AddMarker);
        let mut markers = self.markers.borrow_mut();
        markers.push(FakeMarker::default());
        EntityId(Handle::new(markers.len() as u32 - 1, 0))
    }

    fn set_marker_position(&self, marker: EntityId, position: Geodetic) {
        self.record(GlobeCall::SetMarkerPosition(marker, position));
        if let Some(m) = self.markers.borrow_mut().get_mut(marker.0.index() as usize) {
            m.position = Some(position);
        }
    }

    fn marker_position(&self, marker: EntityId) -> Option<Geodetic> {
        self.position(marker)
    }

    fn set_marker_visible(&self, marker: EntityId, visible: bool) {
        self.record(GlobeCall::SetMarkerVisible(marker, visible));
        if let Some(m) = self.markers.borrow_mut().get_mut(marker.0.index() as usize) {
            m.visible = visible;
        }
    }
}

struct Watch {
    id: WatchId,
    options: PositionOptions,
    on_fix: OnWatchFix,
    on_error: OnWatchError,
}

pub struct FakeGeolocation {
    pub available: Cell<bool>,
    /// Refuse new subscriptions, reporting the refusal once the pool runs.
    pub refuse_watches: Cell<bool>,
    refused: RefCell<Vec<OnWatchError>>,
    one_shots: RefCell<VecDeque<(PositionOptions, OnFix, OnError)>>,
    watches: RefCell<Vec<Watch>>,
    cleared: RefCell<Vec<WatchId>>,
    next_id: Cell<i32>,
}

impl FakeGeolocation {
    pub fn new() -> Self {
        Self {
            available: Cell::new(true),
            refuse_watches: Cell::new(false),
            refused: RefCell::new(Vec::new()),
            one_shots: RefCell::new(VecDeque::new()),
            watches: RefCell::new(Vec::new()),
            cleared: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn pending_one_shots(&self) -> usize {
        self.one_shots.borrow().len()
    }

    pub fn one_shot_options(&self) -> Option<PositionOptions> {
        self.one_shots.borrow().front().map(|(options, _, _)| *options)
    }

    pub fn watch_options(&self) -> Option<PositionOptions> {
        self.watches.borrow().last().map(|w| w.options)
    }

    pub fn active_watches(&self) -> usize {
        self.watches.borrow().len()
    }

    pub fn cleared(&self) -> Vec<WatchId> {
        self.cleared.borrow().clone()
    }

    pub fn resolve_one_shot(&self, fix: PositionFix) {
        let pending = self.one_shots.borrow_mut().pop_front();
        if let Some((_, on_fix, _)) = pending {
            on_fix(fix);
        }
    }

    pub fn fail_one_shot(&self, err: GeolocationError) {
        let pending = self.one_shots.borrow_mut().pop_front();
        if let Some((_, _, on_error)) = pending {
            on_error(err);
        }
    }

    pub fn emit_watch_fix(&self, fix: PositionFix) {
        for watch in self.watches.borrow_mut().iter_mut() {
            (watch.on_fix)(fix);
        }
    }

    pub fn deliver_refusals(&self) {
        let refused: Vec<OnWatchError> = self.refused.borrow_mut().drain(..).collect();
        for mut on_error in refused {
            on_error(GeolocationError::new(
                GeolocationErrorCode::PermissionDenied,
                "watch refused",
            ));
        }
    }

    pub fn emit_watch_error(&self, err: GeolocationError) {
        for watch in self.watches.borrow_mut().iter_mut() {
            (watch.on_error)(err.clone());
        }
    }
}

impl Geolocation for FakeGeolocation {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn get_current_position(&self, options: PositionOptions, on_fix: OnFix, on_error: OnError) {
        self.one_shots
            .borrow_mut()
            .push_back((options, on_fix, on_error));
    }

    fn watch_position(
        &self,
        options: PositionOptions,
        on_fix: OnWatchFix,
        on_error: OnWatchError,
    ) -> Option<WatchId> {
        if self.refuse_watches.get() {
            self.refused.borrow_mut().push(on_error);
            return None;
        }
        let id = WatchId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.watches.borrow_mut().push(Watch {
            id,
            options,
            on_fix,
            on_error,
        });
        Some(id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.watches.borrow_mut().retain(|w| w.id != id);
        self.cleared.borrow_mut().push(id);
    }
}

#[derive(Default)]
pub struct FakeControls {
    bound: RefCell<Option<WeakLocator>>,
    follow_checked: Cell<Option<bool>>,
    label: RefCell<Option<String>>,
}

impl FakeControls {
    pub fn is_bound(&self) -> bool {
        self.bound.borrow().is_some()
    }

    pub fn follow_checked(&self) -> Option<bool> {
        self.follow_checked.get()
    }

    pub fn label(&self) -> Option<String> {
        self.label.borrow().clone()
    }
}

impl ControlPanel for FakeControls {
    fn bind(&self, locator: WeakLocator) {
        *self.bound.borrow_mut() = Some(locator);
    }

    fn set_follow_checked(&self, checked: bool) {
        self.follow_checked.set(Some(checked));
    }

    fn set_height_offset_label(&self, text: &str) {
        *self.label.borrow_mut() = Some(text.to_string());
    }
}

pub struct Harness {
    pub pool: LocalPool,
    pub globe: Rc<FakeGlobe>,
    pub geo: Rc<FakeGeolocation>,
    pub controls: Rc<FakeControls>,
    pub log: Rc<MemoryLog>,
    pub locator: Locator,
}

impl Harness {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let globe = Rc::new(FakeGlobe::new());
        let geo = Rc::new(FakeGeolocation::new());
        let controls = Rc::new(FakeControls::default());
        let log = Rc::new(MemoryLog::new());
        let locator = Locator::new(Collaborators {
            globe: globe.clone(),
            geolocation: geo.clone(),
            controls: controls.clone(),
            log: log.clone(),
            spawner: Rc::new(pool.spawner()),
        });
        Self {
            pool,
            globe,
            geo,
            controls,
            log,
            locator,
        }
    }

    pub fn boot(&mut self, config: LocatorConfig) {
        let locator = self.locator.clone();
        self.pool
            .run_until(async move { locator.start(&config).await });
    }

    pub fn terrain(&self, behavior: TerrainBehavior) {
        self.globe.terrain.set(behavior);
    }

    /// Runs the pipeline for `fix` to completion.
    pub fn update(&mut self, fix: PositionFix) {
        let locator = self.locator.clone();
        self.pool
            .run_until(async move { locator.update_position(fix).await });
    }

    /// Drives spawned pipeline runs until they block.
    pub fn run(&mut self) {
        self.geo.deliver_refusals();
        self.pool.run_until_stalled();
    }
}
