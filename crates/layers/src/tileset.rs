use foundation::bounds::BoundingSphere;

/// Load lifecycle of a remote 3D tileset.
#[derive(Debug, Clone, PartialEq)]
pub enum TilesetState {
    Requested,
    Ready(BoundingSphere),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilesetLayer {
    pub asset_id: u64,
    pub state: TilesetState,
}

impl TilesetLayer {
    pub fn new(asset_id: u64) -> Self {
        Self {
            asset_id,
            state: TilesetState::Requested,
        }
    }

    pub fn mark_ready(&mut self, sphere: BoundingSphere) {
        self.state = TilesetState::Ready(sphere);
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.state = TilesetState::Failed(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::{TilesetLayer, TilesetState};
    use foundation::bounds::BoundingSphere;
    use foundation::math::Ecef;

    #[test]
    fn load_lifecycle() {
        let mut layer = TilesetLayer::new(12345);
        assert_eq!(layer.state, TilesetState::Requested);

        let sphere = BoundingSphere::new(Ecef::new(1.0, 2.0, 3.0), 50.0);
        layer.mark_ready(sphere);
        assert_eq!(layer.state, TilesetState::Ready(sphere));

        layer.mark_failed("404");
        assert_eq!(layer.state, TilesetState::Failed("404".to_string()));
        assert_eq!(layer.asset_id, 12345);
    }
}
