//! `navigator.geolocation` behind the `Geolocation` trait.

use std::cell::RefCell;
use std::collections::BTreeMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Position as GeolocationPosition, PositionError as GeolocationPositionError};

use locator::{
    Geolocation, GeolocationError, GeolocationErrorCode, OnError, OnFix, OnWatchError, OnWatchFix,
    PositionFix, PositionOptions, WatchId,
};

type FixClosure = Closure<dyn FnMut(GeolocationPosition)>;
type ErrorClosure = Closure<dyn FnMut(GeolocationPositionError)>;

#[derive(Default)]
pub struct BrowserGeolocation {
    // Watch callbacks stay alive until the watch is cleared.
    watches: RefCell<BTreeMap<i32, (FixClosure, ErrorClosure)>>,
}

impl BrowserGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    fn api(&self) -> Option<web_sys::Geolocation> {
        let navigator = web_sys::window()?.navigator();
        let present = js_sys::Reflect::get(&navigator, &JsValue::from_str("geolocation"))
            .map(|v| !v.is_undefined() && !v.is_null())
            .unwrap_or(false);
        if !present {
            return None;
        }
        navigator.geolocation().ok()
    }
}

fn to_fix(position: &GeolocationPosition) -> PositionFix {
    let coords = position.coords();
    PositionFix {
        longitude: coords.longitude(),
        latitude: coords.latitude(),
        altitude: coords.altitude(),
        accuracy_m: coords.accuracy(),
        timestamp_ms: position.timestamp(),
    }
}

fn to_error(err: &GeolocationPositionError) -> GeolocationError {
    GeolocationError::new(GeolocationErrorCode::from_code(err.code()), err.message())
}

fn unavailable() -> GeolocationError {
    GeolocationError::new(
        GeolocationErrorCode::PositionUnavailable,
        "geolocation not available",
    )
}

fn to_js_options(options: PositionOptions) -> web_sys::PositionOptions {
    let js = web_sys::PositionOptions::new();
    js.set_enable_high_accuracy(options.enable_high_accuracy);
    js.set_maximum_age(options.maximum_age.as_millis() as u32);
    js.set_timeout(options.timeout.as_millis() as u32);
    js
}

impl Geolocation for BrowserGeolocation {
    fn is_available(&self) -> bool {
        self.api().is_some()
    }

    fn get_current_position(&self, options: PositionOptions, on_fix: OnFix, on_error: OnError) {
        let Some(api) = self.api() else {
            spawn_local(async move { on_error(unavailable()) });
            return;
        };
        // Only one of the two fires; the other is reclaimed with the page.
        let success = Closure::once_into_js(move |position: GeolocationPosition| {
            on_fix(to_fix(&position));
        });
        let failure = Closure::once_into_js(move |err: GeolocationPositionError| {
            on_error(to_error(&err));
        });
        if let Err(err) = api.get_current_position_with_error_callback_and_options(
            success.unchecked_ref(),
            Some(failure.unchecked_ref()),
            &to_js_options(options),
        ) {
            tracing::warn!(?err, "getCurrentPosition rejected");
        }
    }

    fn watch_position(
        &self,
        options: PositionOptions,
        mut on_fix: OnWatchFix,
        mut on_error: OnWatchError,
    ) -> Option<WatchId> {
        let Some(api) = self.api() else {
            spawn_local(async move { on_error(unavailable()) });
            return None;
        };
        let success: FixClosure =
            Closure::new(move |position: GeolocationPosition| on_fix(to_fix(&position)));
        let failure: ErrorClosure =
            Closure::new(move |err: GeolocationPositionError| on_error(to_error(&err)));
        let id = match api.watch_position_with_error_callback_and_options(
            success.as_ref().unchecked_ref(),
            Some(failure.as_ref().unchecked_ref()),
            &to_js_options(options),
        ) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(?err, "watchPosition rejected");
                return None;
            }
        };
        self.watches.borrow_mut().insert(id, (success, failure));
        Some(WatchId(id))
    }

    fn clear_watch(&self, id: WatchId) {
        if let Some(api) = self.api() {
            api.clear_watch(id.0);
        }
        self.watches.borrow_mut().remove(&id.0);
    }
}
