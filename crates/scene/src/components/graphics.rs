/// Linear RGBA color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `rgba(r, g, b, a)` with 0-255 channels, for canvas styles.
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({}, {}, {}, {})", c(self.r), c(self.g), c(self.b), self.a)
    }
}

/// Screen-space point drawn at the entity position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointGraphic {
    pub pixel_size: f32,
    pub color: Color,
}

/// Text drawn next to the entity position.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGraphic {
    pub text: String,
    /// Screen offset in pixels; negative y is up.
    pub pixel_offset: [f32; 2],
    pub fill_color: Color,
    pub show_background: bool,
}

impl LabelGraphic {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pixel_offset: [0.0, 0.0],
            fill_color: Color::WHITE,
            show_background: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, LabelGraphic};

    #[test]
    fn css_color_uses_byte_channels() {
        assert_eq!(Color::BLUE.to_css(), "rgba(0, 0, 255, 1)");
    }

    #[test]
    fn label_defaults() {
        let label = LabelGraphic::new("Me");
        assert_eq!(label.text, "Me");
        assert_eq!(label.pixel_offset, [0.0, 0.0]);
        assert!(!label.show_background);
    }
}
