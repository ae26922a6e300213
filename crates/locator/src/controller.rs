//! Page controller: bootstrap, position pipeline and control handlers.
//!
//! All state sits in one `RefCell` owned by the controller. Borrows are
//! released before any collaborator call and before every await, so
//! callbacks arriving in between always see a consistent snapshot.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};

use foundation::math::Geodetic;
use scene::entity::EntityId;

use crate::config::{ConfigSource, LocatorConfig};
use crate::controls::ControlPanel;
use crate::error::LocatorError;
use crate::geolocation::{Geolocation, PositionFix, PositionOptions, WatchId};
use crate::globe::{FOLLOW_FLIGHT_S, Globe, MarkerStyle, TILESET_FLIGHT_S, TerrainMode, tileset_offset};
use crate::log::{LogSink, Logger};

/// The most recent fix together with the terrain height sampled under it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LastKnownPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub ground_height: f64,
}

impl LastKnownPosition {
    /// Marker placement: ground height plus the current offset.
    pub fn marker_position(&self, height_offset: f64) -> Geodetic {
        Geodetic::from_degrees(
            self.longitude,
            self.latitude,
            self.ground_height + height_offset,
        )
    }
}

/// Everything the controller talks to.
pub struct Collaborators {
    pub globe: Rc<dyn Globe>,
    pub geolocation: Rc<dyn Geolocation>,
    pub controls: Rc<dyn ControlPanel>,
    pub log: Rc<dyn LogSink>,
    pub spawner: Rc<dyn LocalSpawn>,
}

#[derive(Debug, Default)]
struct State {
    config: Option<LocatorConfig>,
    marker: Option<EntityId>,
    last: Option<LastKnownPosition>,
    height_offset: f64,
    follow: bool,
    watch: Option<WatchId>,
    // Sequence of the newest fix handed to the pipeline.
    fix_seq: u64,
    // Sequence of the newest fix whose terrain sample was applied.
    applied_seq: u64,
}

struct Inner {
    globe: Rc<dyn Globe>,
    geolocation: Rc<dyn Geolocation>,
    controls: Rc<dyn ControlPanel>,
    log: Logger,
    spawner: Rc<dyn LocalSpawn>,
    state: RefCell<State>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Locator {
    inner: Rc<Inner>,
}

/// Non-owning handle held by callbacks and page controls.
#[derive(Clone)]
pub struct WeakLocator {
    inner: Weak<Inner>,
}

impl WeakLocator {
    pub fn upgrade(&self) -> Option<Locator> {
        self.inner.upgrade().map(|inner| Locator { inner })
    }
}

impl Locator {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            globe,
            geolocation,
            controls,
            log,
            spawner,
        } = collaborators;
        Self {
            inner: Rc::new(Inner {
                globe,
                geolocation,
                controls,
                log: Logger::new(log),
                spawner,
                state: RefCell::new(State::default()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakLocator {
        WeakLocator {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.log
    }

    /// Runs [`Locator::bootstrap`] and logs a startup failure once.
    pub async fn start(&self, source: &dyn ConfigSource) {
        if let Err(err) = self.bootstrap(source).await {
            self.inner.log.warn(&format!("init failed: {err}"));
        }
    }

    /// Startup sequence. Only a configuration failure is fatal.
    pub async fn bootstrap(&self, source: &dyn ConfigSource) -> Result<(), LocatorError> {
        let inner = &self.inner;
        inner.log.info("init started");
        let config = source.load().await?;
        inner.log.info("config loaded");
        self.inner.state.borrow_mut().config = Some(config.clone());

        let globe = inner.globe.clone();
        if let Err(err) = globe
            .set_terrain(TerrainMode::from_flag(config.use_world_terrain))
            .await
        {
            inner
                .log
                .warn(&format!("world terrain unavailable, using ellipsoid: {err}"));
        }
        globe.set_camera_view(config.start_view.camera_view());

        match globe.load_tileset(config.ion_asset_id).await {
            Ok(sphere) => {
                globe.fly_to_bounding_sphere(sphere, tileset_offset(&sphere), TILESET_FLIGHT_S);
                inner.log.info(&format!(
                    "3D tileset loaded (asset id {})",
                    config.ion_asset_id
                ));
            }
            Err(err) => inner.log.warn(&format!("3D tileset failed to load: {err}")),
        }

        let marker = globe.add_marker(&MarkerStyle::you_are_here());
        globe.set_marker_visible(marker, false);
        inner.state.borrow_mut().marker = Some(marker);

        inner.controls.bind(self.downgrade());
        inner.log.info("UI wired");

        self.request_initial_permission();
        Ok(())
    }

    /// Early one-shot request so the browser prompts for permission. The
    /// fix itself is discarded.
    pub fn request_initial_permission(&self) {
        let inner = &self.inner;
        if !inner.geolocation.is_available() {
            inner.log.warn("geolocation not available (initial)");
            return;
        }
        inner.log.info("requesting location permission...");
        let on_fix = self.downgrade();
        let on_error = self.downgrade();
        inner.geolocation.get_current_position(
            PositionOptions::ONE_SHOT,
            Box::new(move |_fix| {
                if let Some(locator) = on_fix.upgrade() {
                    locator.inner.log.info("location permission granted");
                }
            }),
            Box::new(move |err| {
                if let Some(locator) = on_error.upgrade() {
                    locator
                        .inner
                        .log
                        .warn(&format!("location permission denied or failed: {err}"));
                }
            }),
        );
    }

    /// Position pipeline for one raw fix.
    pub async fn update_position(&self, fix: PositionFix) {
        let inner = &self.inner;
        inner.log.info("GPS update received");
        let seq = {
            let mut state = inner.state.borrow_mut();
            state.fix_seq += 1;
            state.fix_seq
        };

        let query = Geodetic::from_degrees(fix.longitude, fix.latitude, 0.0);
        let ground_height = match inner.globe.sample_terrain_most_detailed(vec![query]).await {
            Ok(heights) => heights
                .first()
                .copied()
                .flatten()
                .filter(|h| h.is_finite())
                .unwrap_or(0.0),
            Err(err) => {
                tracing::debug!(target: "locator", %err, "terrain sample failed, using 0");
                0.0
            }
        };

        let (follow, stale) = {
            let mut state = inner.state.borrow_mut();
            let discard = state
                .config
                .as_ref()
                .is_some_and(|config| config.discard_stale_fixes);
            if discard && seq < state.applied_seq {
                (false, true)
            } else {
                state.applied_seq = state.applied_seq.max(seq);
                state.last = Some(LastKnownPosition {
                    longitude: fix.longitude,
                    latitude: fix.latitude,
                    ground_height,
                });
                (state.follow, false)
            }
        };
        if stale {
            inner.log.info("stale GPS fix dropped");
            return;
        }

        let Some(position) = self.refresh_marker() else {
            return;
        };
        if follow {
            inner.globe.fly_to(position, FOLLOW_FLIGHT_S);
        }
    }

    /// Places the marker from the stored position and the current offset
    /// and makes it visible. Returns the placement, if there was one.
    pub fn refresh_marker(&self) -> Option<Geodetic> {
        let (marker, position) = {
            let state = self.inner.state.borrow();
            let marker = state.marker?;
            let last = state.last?;
            (marker, last.marker_position(state.height_offset))
        };
        self.inner.globe.set_marker_position(marker, position);
        self.inner.globe.set_marker_visible(marker, true);
        Some(position)
    }

    pub fn on_locate_clicked(&self) {
        let inner = &self.inner;
        inner.log.info("locate button pressed");
        if !inner.geolocation.is_available() {
            inner.log.warn("geolocation not available (locate)");
            return;
        }

        let has_last = inner.state.borrow().last.is_some();
        if has_last {
            inner.log.info("using last known position");
            if let Some(position) = self.refresh_marker() {
                inner.globe.fly_to(position, FOLLOW_FLIGHT_S);
            }
            return;
        }

        inner.log.info("no GPS position yet, requesting a single fix");
        let on_fix = self.downgrade();
        let on_error = self.downgrade();
        inner.geolocation.get_current_position(
            PositionOptions::ONE_SHOT,
            Box::new(move |fix| {
                if let Some(locator) = on_fix.upgrade() {
                    locator.inner.log.info("single GPS fix received");
                    locator.spawn_update(fix);
                }
            }),
            Box::new(move |err| {
                if let Some(locator) = on_error.upgrade() {
                    locator.inner.log.warn(&format!("GPS error (locate): {err}"));
                }
            }),
        );
    }

    pub fn on_follow_changed(&self, checked: bool) {
        let inner = &self.inner;
        if !inner.geolocation.is_available() {
            inner.log.warn("geolocation not available (follow)");
            inner.state.borrow_mut().follow = false;
            inner.controls.set_follow_checked(false);
            return;
        }

        if checked {
            inner.log.info("follow on");
            let prior = {
                let mut state = inner.state.borrow_mut();
                state.follow = true;
                state.watch.take()
            };
            if let Some(id) = prior {
                inner.geolocation.clear_watch(id);
            }
            let on_fix = self.downgrade();
            let on_error = self.downgrade();
            let id = inner.geolocation.watch_position(
                PositionOptions::WATCH,
                Box::new(move |fix| {
                    if let Some(locator) = on_fix.upgrade() {
                        locator.spawn_update(fix);
                    }
                }),
                Box::new(move |err| {
                    if let Some(locator) = on_error.upgrade() {
                        locator.inner.log.warn(&format!("GPS error (follow): {err}"));
                    }
                }),
            );
            inner.state.borrow_mut().watch = id;
        } else {
            inner.log.info("follow off");
            let prior = {
                let mut state = inner.state.borrow_mut();
                state.follow = false;
                state.watch.take()
            };
            if let Some(id) = prior {
                inner.geolocation.clear_watch(id);
            }
        }
    }

    /// Raw slider value. Empty input reads as 0; anything else that is not a
    /// finite number is logged and ignored.
    pub fn on_height_offset_input(&self, raw: &str) {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            0.0
        } else {
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    self.inner
                        .log
                        .warn(&format!("height offset ignored, not a number: {raw:?}"));
                    return;
                }
            }
        };
        self.on_height_offset_changed(value);
    }

    pub fn on_height_offset_changed(&self, offset_m: f64) {
        self.inner.state.borrow_mut().height_offset = offset_m;
        let text = offset_m.to_string();
        self.inner.controls.set_height_offset_label(&text);
        self.inner.log.info(&format!("height offset: {text} m"));
        self.refresh_marker();
    }

    fn spawn_update(&self, fix: PositionFix) {
        let locator = self.clone();
        if let Err(err) = self
            .inner
            .spawner
            .spawn_local(async move { locator.update_position(fix).await })
        {
            self.inner.log.warn(&format!("GPS update dropped: {err}"));
        }
    }

    pub fn config(&self) -> Option<LocatorConfig> {
        self.inner.state.borrow().config.clone()
    }

    pub fn marker(&self) -> Option<EntityId> {
        self.inner.state.borrow().marker
    }

    pub fn last_known_position(&self) -> Option<LastKnownPosition> {
        self.inner.state.borrow().last
    }

    pub fn height_offset(&self) -> f64 {
        self.inner.state.borrow().height_offset
    }

    pub fn is_following(&self) -> bool {
        self.inner.state.borrow().follow
    }

    pub fn active_watch(&self) -> Option<WatchId> {
        self.inner.state.borrow().watch
    }
}
