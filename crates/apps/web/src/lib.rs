use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::Time;
use locator::engine::EngineGlobe;
use locator::{Collaborators, Globe, Locator};

mod assets;
mod dom;
mod geolocation;
mod preview;

use assets::{HttpAssetSource, HttpConfigSource};
use dom::{DomControls, DomLogSink};
use geolocation::BrowserGeolocation;
use preview::Preview;

// Guard against double initialization during hot reload.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

struct App {
    locator: Locator,
    globe: Rc<EngineGlobe>,
    preview: Option<Preview>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Runs controller futures on the browser's microtask queue.
struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        spawn_local(future);
        Ok(())
    }
}

fn init_tracing() {
    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .build();
    tracing_wasm::set_as_global_default_with_config(config);
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    init_tracing();

    let document = dom::document()?;
    let preview = match Preview::from_document(&document) {
        Ok(preview) => Some(preview),
        Err(err) => {
            tracing::warn!(?err, "preview canvas unavailable");
            None
        }
    };

    let globe = Rc::new(EngineGlobe::new(Rc::new(HttpAssetSource::new(""))));
    let locator = Locator::new(Collaborators {
        globe: globe.clone(),
        geolocation: Rc::new(BrowserGeolocation::new()),
        controls: Rc::new(DomControls::new(&document)),
        log: Rc::new(DomLogSink::new(&document)),
        spawner: Rc::new(BrowserSpawner),
    });

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            locator: locator.clone(),
            globe,
            preview,
        });
    });

    spawn_local(async move {
        locator.start(&HttpConfigSource::new("config.json")).await;
    });
    Ok(())
}

/// Advances the camera to `now_ms` (a `requestAnimationFrame` timestamp)
/// and redraws the preview. Returns `true` while a camera flight runs.
#[wasm_bindgen]
pub fn tick(now_ms: f64) -> Result<bool, JsValue> {
    let result = APP.try_with(|app| -> Result<bool, JsValue> {
        let app = app.borrow();
        let Some(app) = app.as_ref() else {
            return Ok(false);
        };
        let flying = app.globe.tick(Time(now_ms / 1000.0));
        if let Some(preview) = &app.preview {
            preview.render(&app.globe)?;
        }
        Ok(flying)
    });
    match result {
        Ok(res) => res,
        // Callbacks can still fire briefly during teardown.
        Err(_) => Ok(false),
    }
}

/// Resizes the preview canvas backing store.
#[wasm_bindgen]
pub fn set_canvas_size(width: u32, height: u32) -> Result<(), JsValue> {
    let canvas = dom::document()?
        .get_element_by_id(preview::CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("missing #app canvas"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(())
}

/// Current marker placement as `[lon_deg, lat_deg, height_m]`, or
/// `undefined` before the first fix.
#[wasm_bindgen]
pub fn marker_position() -> Option<Vec<f64>> {
    APP.with(|app| {
        let app = app.borrow();
        let app = app.as_ref()?;
        let marker = app.locator.marker()?;
        let p = app.globe.marker_position(marker)?;
        Some(vec![p.lon_deg(), p.lat_deg(), p.height_m])
    })
}
