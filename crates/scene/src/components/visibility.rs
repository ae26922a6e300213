#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Visibility {
    pub visible: bool,
}

impl Visibility {
    pub fn visible() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Self { visible }
    }
}
