use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use futures::executor::LocalPool;
use serde::Serialize;
use thiserror::Error;

use foundation::Time;
use locator::engine::EngineGlobe;
use locator::{
    Collaborators, Geolocation, Globe, Locator, LocatorError, LogSink, NoControls, OnError, OnFix,
    OnWatchError, OnWatchFix, PositionFix, PositionOptions, WatchId,
};

use crate::assets::{FileAssetSource, FileConfigSource};
use crate::track::Track;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid track: {0}")]
    Track(#[from] serde_json::Error),
    #[error(transparent)]
    Startup(#[from] LocatorError),
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub config: PathBuf,
    pub track: PathBuf,
    /// Asset directory laid out like the served page.
    pub data: PathBuf,
    /// Feed fixes through a follow subscription instead of the raw pipeline.
    pub follow: bool,
    pub offset_m: Option<f64>,
    /// Print page log lines as they are appended.
    pub echo: bool,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplayReport {
    pub fixes: usize,
    /// `[lon_deg, lat_deg, height_m]`
    pub marker: Option<[f64; 3]>,
    pub ground_height_m: Option<f64>,
    pub height_offset_m: f64,
    /// `[lon_deg, lat_deg, height_m]`
    pub camera: [f64; 3],
    pub log: Vec<String>,
}

/// Log sink that keeps every line and optionally prints it.
#[derive(Debug, Default)]
struct PageLog {
    lines: RefCell<Vec<String>>,
    echo: bool,
}

impl LogSink for PageLog {
    fn append(&self, line: &str) {
        if self.echo {
            println!("{line}");
        }
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Device location fed from the track. One-shot requests are answered with
/// the next fix that is pushed.
#[derive(Default)]
struct ReplayGeolocation {
    one_shots: RefCell<VecDeque<OnFix>>,
    watches: RefCell<Vec<(WatchId, OnWatchFix)>>,
    next_id: Cell<i32>,
}

impl ReplayGeolocation {
    fn push(&self, fix: PositionFix) {
        let pending: Vec<OnFix> = self.one_shots.borrow_mut().drain(..).collect();
        for on_fix in pending {
            on_fix(fix);
        }
        for (_, on_fix) in self.watches.borrow_mut().iter_mut() {
            on_fix(fix);
        }
    }
}

impl Geolocation for ReplayGeolocation {
    fn is_available(&self) -> bool {
        true
    }

    fn get_current_position(&self, _options: PositionOptions, on_fix: OnFix, _on_error: OnError) {
        self.one_shots.borrow_mut().push_back(on_fix);
    }

    fn watch_position(
        &self,
        _options: PositionOptions,
        on_fix: OnWatchFix,
        _on_error: OnWatchError,
    ) -> Option<WatchId> {
        let id = WatchId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.watches.borrow_mut().push((id, on_fix));
        Some(id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.watches.borrow_mut().retain(|(watch, _)| *watch != id);
    }
}

/// Boots the controller against files and replays `options.track`.
pub fn replay(options: &ReplayOptions) -> Result<ReplayReport, ReplayError> {
    let track = Track::from_path(&options.track)?;
    let config = FileConfigSource::new(&options.config);

    let mut pool = LocalPool::new();
    let globe = Rc::new(EngineGlobe::new(Rc::new(FileAssetSource::new(&options.data))));
    let geolocation = Rc::new(ReplayGeolocation::default());
    let log = Rc::new(PageLog {
        lines: RefCell::new(Vec::new()),
        echo: options.echo,
    });
    let locator = Locator::new(Collaborators {
        globe: globe.clone(),
        geolocation: geolocation.clone(),
        controls: Rc::new(NoControls),
        log: log.clone(),
        spawner: Rc::new(pool.spawner()),
    });

    {
        let locator = locator.clone();
        pool.run_until(async move { locator.bootstrap(&config).await })?;
    }
    if let Some(offset) = options.offset_m {
        locator.on_height_offset_changed(offset);
    }
    if options.follow {
        locator.on_follow_changed(true);
    }

    let fixes = track.timed_fixes();
    let mut last_t = 0.0;
    for (t, fix) in &fixes {
        globe.tick(Time(*t));
        if options.follow {
            geolocation.push(*fix);
            pool.run_until_stalled();
        } else {
            let locator = locator.clone();
            let fix = *fix;
            pool.run_until(async move { locator.update_position(fix).await });
        }
        last_t = *t;
    }
    // Let any running flight land.
    globe.tick(Time(last_t + 10.0));
    tracing::debug!(fixes = fixes.len(), "replay finished");

    let marker = locator
        .marker()
        .and_then(|m| globe.marker_position(m))
        .map(|p| [p.lon_deg(), p.lat_deg(), p.height_m]);
    let camera = globe.camera_view().destination;
    let report = ReplayReport {
        fixes: fixes.len(),
        marker,
        ground_height_m: locator.last_known_position().map(|p| p.ground_height),
        height_offset_m: locator.height_offset(),
        camera: [camera.lon_deg(), camera.lat_deg(), camera.height_m],
        log: log.lines.borrow().clone(),
    };
    Ok(report)
}
