//! Globe camera with instant views and timed flights.
//!
//! A flight interpolates longitude (along the shorter arc), latitude and
//! height independently, plus the orientation angles, with a cubic
//! ease-in-out. The camera keeps its own clock; `update` advances it.

use foundation::bounds::BoundingSphere;
use foundation::math::{
    Geodetic, HeadingPitchRange, HeadingPitchRoll, WGS84_A, ecef_to_geodetic, enu_to_ecef,
};
use foundation::time::{Time, progress};

/// Camera pose: eye position and orientation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub destination: Geodetic,
    pub orientation: HeadingPitchRoll,
}

impl CameraView {
    pub fn new(destination: Geodetic, orientation: HeadingPitchRoll) -> Self {
        Self {
            destination,
            orientation,
        }
    }
}

impl Default for CameraView {
    fn default() -> Self {
        // Whole-globe view above the equator at the prime meridian.
        Self::new(
            Geodetic::from_degrees(0.0, 0.0, 2.0 * WGS84_A),
            HeadingPitchRoll::top_down(),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Flight {
    pub from: CameraView,
    pub to: CameraView,
    pub start: Time,
    pub duration_s: f64,
}

impl Flight {
    pub fn sample(&self, now: Time) -> CameraView {
        let t = ease_in_out(progress(self.start, self.duration_s, now));
        if t >= 1.0 {
            return self.to;
        }

        let a = self.from.destination;
        let b = self.to.destination;
        let destination = Geodetic::new(
            a.lon_rad + shortest_delta(a.lon_rad, b.lon_rad) * t,
            a.lat_rad + (b.lat_rad - a.lat_rad) * t,
            a.height_m + (b.height_m - a.height_m) * t,
        );

        let oa = self.from.orientation;
        let ob = self.to.orientation;
        let orientation = HeadingPitchRoll::new(
            oa.heading + shortest_delta(oa.heading, ob.heading) * t,
            oa.pitch + (ob.pitch - oa.pitch) * t,
            oa.roll + shortest_delta(oa.roll, ob.roll) * t,
        );

        CameraView::new(destination, orientation)
    }

    pub fn is_complete(&self, now: Time) -> bool {
        progress(self.start, self.duration_s, now) >= 1.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    view: CameraView,
    flight: Option<Flight>,
    clock: Time,
}

impl Camera {
    pub fn new(view: CameraView) -> Self {
        Self {
            view,
            flight: None,
            clock: Time::ZERO,
        }
    }

    pub fn view(&self) -> CameraView {
        self.view
    }

    pub fn flight(&self) -> Option<&Flight> {
        self.flight.as_ref()
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    /// Jump to `view`, cancelling any flight in progress.
    pub fn set_view(&mut self, view: CameraView) {
        self.flight = None;
        self.view = view;
    }

    /// Fly from the current pose to `destination`, keeping the orientation.
    pub fn fly_to(&mut self, destination: Geodetic, duration_s: f64) {
        let to = CameraView::new(destination, self.view.orientation);
        self.fly_to_view(to, duration_s);
    }

    pub fn fly_to_view(&mut self, to: CameraView, duration_s: f64) {
        if duration_s <= 0.0 {
            self.set_view(to);
            return;
        }
        self.flight = Some(Flight {
            from: self.view,
            to,
            start: self.clock,
            duration_s,
        });
    }

    /// Fly to look at `sphere` from the given offset around its center.
    pub fn fly_to_bounding_sphere(
        &mut self,
        sphere: BoundingSphere,
        offset: HeadingPitchRange,
        duration_s: f64,
    ) {
        self.fly_to_view(view_of_bounding_sphere(sphere, offset), duration_s);
    }

    /// Advance the clock to `now` and step any flight.
    ///
    /// Returns `true` while a flight is still in progress.
    pub fn update(&mut self, now: Time) -> bool {
        self.clock = now;
        let Some(flight) = self.flight else {
            return false;
        };
        self.view = flight.sample(now);
        if flight.is_complete(now) {
            self.flight = None;
            return false;
        }
        true
    }
}

/// Camera pose that looks at the sphere center from `offset`.
pub fn view_of_bounding_sphere(sphere: BoundingSphere, offset: HeadingPitchRange) -> CameraView {
    let center = ecef_to_geodetic(sphere.center);
    let eye = enu_to_ecef(offset.camera_offset(), center);
    CameraView::new(ecef_to_geodetic(eye), offset.orientation())
}

fn shortest_delta(from: f64, to: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let d = (to - from).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraView, shortest_delta, view_of_bounding_sphere};
    use foundation::bounds::BoundingSphere;
    use foundation::math::{Geodetic, HeadingPitchRange, HeadingPitchRoll};
    use foundation::time::Time;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn start_view() -> CameraView {
        CameraView::new(
            Geodetic::from_degrees(25.0, 60.0, 1000.0),
            HeadingPitchRoll::from_degrees(0.0, -30.0, 0.0),
        )
    }

    #[test]
    fn set_view_is_immediate() {
        let mut camera = Camera::default();
        camera.set_view(start_view());
        assert_eq!(camera.view(), start_view());
        assert!(!camera.is_flying());
    }

    #[test]
    fn flight_reaches_destination_after_duration() {
        let mut camera = Camera::new(start_view());
        camera.update(Time(1.0));
        let target = Geodetic::from_degrees(25.1, 60.1, 50.0);
        camera.fly_to(target, 0.5);
        assert!(camera.is_flying());

        assert!(camera.update(Time(1.25)));
        let mid = camera.view().destination;
        assert!(mid.height_m < 1000.0 && mid.height_m > 50.0);

        assert!(!camera.update(Time(1.5)));
        assert_eq!(camera.view().destination, target);
        assert_eq!(camera.view().orientation, start_view().orientation);
        assert!(!camera.is_flying());
    }

    #[test]
    fn zero_duration_flight_jumps() {
        let mut camera = Camera::new(start_view());
        let target = Geodetic::from_degrees(0.0, 0.0, 10.0);
        camera.fly_to(target, 0.0);
        assert_eq!(camera.view().destination, target);
        assert!(!camera.is_flying());
    }

    #[test]
    fn set_view_cancels_flight() {
        let mut camera = Camera::new(start_view());
        camera.fly_to(Geodetic::from_degrees(0.0, 0.0, 10.0), 2.0);
        camera.set_view(start_view());
        assert!(!camera.is_flying());
        camera.update(Time(10.0));
        assert_eq!(camera.view(), start_view());
    }

    #[test]
    fn longitude_takes_the_short_way_round() {
        let d = shortest_delta(179f64.to_radians(), (-179f64).to_radians());
        assert_close(d, 2f64.to_radians(), 1e-12);
    }

    #[test]
    fn bounding_sphere_view_looks_down_from_range() {
        let center = Geodetic::from_degrees(25.0, 60.0, 0.0).to_ecef();
        let sphere = BoundingSphere::new(center, 100.0);
        let offset = HeadingPitchRange::new(0.0, (-35f64).to_radians(), 200.0);
        let view = view_of_bounding_sphere(sphere, offset);

        assert_close(view.destination.to_ecef().distance(center), 200.0, 1e-6);
        assert_close(view.destination.height_m, 200.0 * 35f64.to_radians().sin(), 0.1);
        assert!(view.destination.lat_deg() < 60.0);
        assert_eq!(view.orientation, HeadingPitchRoll::new(0.0, (-35f64).to_radians(), 0.0));
    }
}
