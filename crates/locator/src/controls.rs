use crate::controller::WeakLocator;

/// Page controls: locate button, follow checkbox, height-offset slider and
/// its label.
///
/// Events flow into the controller through the [`WeakLocator`] handed to
/// [`ControlPanel::bind`]; the controller writes back through the setters.
pub trait ControlPanel {
    fn bind(&self, locator: WeakLocator);

    fn set_follow_checked(&self, checked: bool);

    fn set_height_offset_label(&self, text: &str);
}

/// Controls that ignore every write. Used by the replay tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl ControlPanel for NoControls {
    fn bind(&self, _locator: WeakLocator) {}

    fn set_follow_checked(&self, _checked: bool) {}

    fn set_height_offset_label(&self, _text: &str) {}
}
