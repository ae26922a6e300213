//! Page controls and the visible log region.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement};

use locator::{ControlPanel, LogSink, WeakLocator};

pub const LOCATE_BUTTON_ID: &str = "locateBtn";
pub const FOLLOW_CHECKBOX_ID: &str = "followMe";
pub const OFFSET_SLIDER_ID: &str = "heightOffset";
pub const OFFSET_LABEL_ID: &str = "heightValue";
pub const LOG_ID: &str = "log";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn input(document: &Document, id: &str) -> Option<HtmlInputElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

/// Appends to `#log` and keeps it scrolled to the newest line.
pub struct DomLogSink {
    element: Option<Element>,
}

impl DomLogSink {
    pub fn new(document: &Document) -> Self {
        Self {
            element: document.get_element_by_id(LOG_ID),
        }
    }
}

impl LogSink for DomLogSink {
    fn append(&self, line: &str) {
        let Some(el) = &self.element else {
            return;
        };
        if let Err(err) = el.append_with_str_1(&format!("\n{line}")) {
            tracing::warn!(?err, "could not append log line");
            return;
        }
        el.set_scroll_top(el.scroll_height());
    }
}

/// Locate button, follow checkbox and height-offset slider with its label.
/// Missing elements are skipped.
pub struct DomControls {
    locate: Option<Element>,
    follow: Option<HtmlInputElement>,
    slider: Option<HtmlInputElement>,
    label: Option<Element>,
}

impl DomControls {
    pub fn new(document: &Document) -> Self {
        Self {
            locate: document.get_element_by_id(LOCATE_BUTTON_ID),
            follow: input(document, FOLLOW_CHECKBOX_ID),
            slider: input(document, OFFSET_SLIDER_ID),
            label: document.get_element_by_id(OFFSET_LABEL_ID),
        }
    }
}

fn listen(target: &Element, event: &str, handler: Closure<dyn FnMut(web_sys::Event)>) {
    if let Err(err) =
        target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
    {
        tracing::warn!(event, ?err, "could not attach listener");
    }
    // Listeners live as long as the page.
    handler.forget();
}

impl ControlPanel for DomControls {
    fn bind(&self, locator: WeakLocator) {
        if let Some(button) = &self.locate {
            let weak = locator.clone();
            listen(
                button,
                "click",
                Closure::new(move |_event: web_sys::Event| {
                    if let Some(locator) = weak.upgrade() {
                        locator.on_locate_clicked();
                    }
                }),
            );
        }

        if let Some(checkbox) = &self.follow {
            let weak = locator.clone();
            let source = checkbox.clone();
            listen(
                checkbox,
                "change",
                Closure::new(move |_event: web_sys::Event| {
                    if let Some(locator) = weak.upgrade() {
                        locator.on_follow_changed(source.checked());
                    }
                }),
            );
        }

        // The slider only counts when its label exists too.
        if let (Some(slider), Some(_)) = (&self.slider, &self.label) {
            let weak = locator;
            let source = slider.clone();
            listen(
                slider,
                "input",
                Closure::new(move |_event: web_sys::Event| {
                    if let Some(locator) = weak.upgrade() {
                        locator.on_height_offset_input(&source.value());
                    }
                }),
            );
        }
    }

    fn set_follow_checked(&self, checked: bool) {
        if let Some(checkbox) = &self.follow {
            checkbox.set_checked(checked);
        }
    }

    fn set_height_offset_label(&self, text: &str) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(text));
        }
    }
}
