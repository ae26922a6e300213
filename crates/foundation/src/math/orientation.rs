use super::Enu;

/// Camera orientation in radians.
///
/// Heading is clockwise from north, pitch is positive above the local
/// horizon, roll is about the view direction.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading_deg: f64, pitch_deg: f64, roll_deg: f64) -> Self {
        Self::new(
            heading_deg.to_radians(),
            pitch_deg.to_radians(),
            roll_deg.to_radians(),
        )
    }

    /// Straight down, north up.
    pub fn top_down() -> Self {
        Self::new(0.0, -std::f64::consts::FRAC_PI_2, 0.0)
    }
}

/// Camera placement relative to a target point: look along `heading` and
/// `pitch` from `range` meters away.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadingPitchRange {
    pub heading: f64,
    pub pitch: f64,
    pub range: f64,
}

impl HeadingPitchRange {
    pub fn new(heading: f64, pitch: f64, range: f64) -> Self {
        Self {
            heading,
            pitch,
            range,
        }
    }

    /// Unit view direction in the target's ENU frame.
    pub fn direction(&self) -> Enu {
        let (sin_h, cos_h) = self.heading.sin_cos();
        let (sin_p, cos_p) = self.pitch.sin_cos();
        Enu::new(cos_p * sin_h, cos_p * cos_h, sin_p)
    }

    /// Camera position relative to the target, in the target's ENU frame.
    pub fn camera_offset(&self) -> Enu {
        let d = self.direction();
        Enu::new(-d.east * self.range, -d.north * self.range, -d.up * self.range)
    }

    pub fn orientation(&self) -> HeadingPitchRoll {
        HeadingPitchRoll::new(self.heading, self.pitch, 0.0)
    }
}
