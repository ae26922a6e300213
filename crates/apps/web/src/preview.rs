//! Top-down 2D preview of the engine scene.
//!
//! The canvas is centered on the ground point under the camera; the scale
//! follows camera height so a wider area shows as the camera climbs.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use foundation::math::ecef_to_enu;
use layers::tileset::TilesetState;
use locator::engine::EngineGlobe;
use scene::DrawableMarker;

pub const CANVAS_ID: &str = "app";

pub struct Preview {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Preview {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        let canvas = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| JsValue::from_str("missing #app canvas"))?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn render(&self, globe: &EngineGlobe) -> Result<(), JsValue> {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        let ctx = &self.ctx;
        ctx_set_fill_style(ctx, "#0b1320");
        ctx.fill_rect(0.0, 0.0, w, h);

        let view = globe.camera_view();
        let ground = view.destination.with_height(0.0);
        // Meters per pixel; the camera sees roughly its own height across
        // the shorter canvas side.
        let mpp = (view.destination.height_m.abs().max(10.0)) / w.min(h).max(1.0);
        let (cx, cy) = (w / 2.0, h / 2.0);

        ctx_set_stroke_style(ctx, "rgba(255, 255, 255, 0.3)");
        ctx.begin_path();
        ctx.move_to(cx - 8.0, cy);
        ctx.line_to(cx + 8.0, cy);
        ctx.move_to(cx, cy - 8.0);
        ctx.line_to(cx, cy + 8.0);
        ctx.stroke();

        for marker in globe.drawable_markers() {
            let enu = ecef_to_enu(marker.transform.ecef, ground);
            let x = cx + enu.east / mpp;
            let y = cy - enu.north / mpp;
            self.draw_marker(&marker, x, y)?;
        }

        ctx_set_fill_style(ctx, "#e2e8f0");
        ctx.set_font("12px sans-serif");
        ctx.fill_text(
            &format!(
                "camera {:.5}, {:.5}  {:.0} m",
                view.destination.lon_deg(),
                view.destination.lat_deg(),
                view.destination.height_m
            ),
            8.0,
            h - 28.0,
        )?;
        let tilesets: Vec<String> = globe
            .tilesets()
            .iter()
            .map(|t| match &t.state {
                TilesetState::Requested => format!("#{} loading", t.asset_id),
                TilesetState::Ready(s) => format!("#{} r={:.0} m", t.asset_id, s.radius),
                TilesetState::Failed(_) => format!("#{} failed", t.asset_id),
            })
            .collect();
        let terrain = if globe.terrain_is_ellipsoid() {
            "ellipsoid"
        } else {
            "world terrain"
        };
        ctx.fill_text(&format!("{terrain}  {}", tilesets.join("  ")), 8.0, h - 12.0)?;
        Ok(())
    }

    fn draw_marker(&self, marker: &DrawableMarker, x: f64, y: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        if let Some(point) = marker.point {
            ctx_set_fill_style(ctx, &point.color.to_css());
            ctx.begin_path();
            ctx.arc(x, y, point.pixel_size as f64 / 2.0, 0.0, std::f64::consts::TAU)?;
            ctx.fill();
        }
        if let Some(label) = &marker.label {
            let lx = x + label.pixel_offset[0] as f64;
            let ly = y + label.pixel_offset[1] as f64;
            ctx.set_font("14px sans-serif");
            ctx.set_text_align("center");
            if label.show_background {
                let width = ctx.measure_text(&label.text)?.width();
                ctx_set_fill_style(ctx, "rgba(255, 255, 255, 0.8)");
                ctx.fill_rect(lx - width / 2.0 - 4.0, ly - 14.0, width + 8.0, 20.0);
            }
            ctx_set_fill_style(ctx, &label.fill_color.to_css());
            ctx.fill_text(&label.text, lx, ly)?;
            ctx.set_text_align("start");
        }
        Ok(())
    }
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(value),
    );
}

fn ctx_set_stroke_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(value),
    );
}
