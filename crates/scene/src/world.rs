use crate::components::{LabelGraphic, PointGraphic, Transform, Visibility};
use crate::entity::EntityId;
use foundation::handles::Handle;

/// A visible entity ready to draw: placement plus its graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableMarker {
    pub entity: EntityId,
    pub transform: Transform,
    pub point: Option<PointGraphic>,
    pub label: Option<LabelGraphic>,
}

#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    visibility: Vec<Option<Visibility>>,
    points: Vec<Option<PointGraphic>>,
    labels: Vec<Option<LabelGraphic>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, 0));
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        id
    }

    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms.get(entity.index() as usize).and_then(|t| *t)
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.index() as usize);
        self.visibility[entity.index() as usize] = Some(visibility);
    }

    /// Entities without a visibility component are visible.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.visibility
            .get(entity.index() as usize)
            .and_then(|v| *v)
            .map(|v| v.visible)
            .unwrap_or(true)
    }

    pub fn set_point(&mut self, entity: EntityId, point: PointGraphic) {
        self.ensure_capacity(entity.index() as usize);
        self.points[entity.index() as usize] = Some(point);
    }

    pub fn point(&self, entity: EntityId) -> Option<PointGraphic> {
        self.points.get(entity.index() as usize).and_then(|p| *p)
    }

    pub fn set_label(&mut self, entity: EntityId, label: LabelGraphic) {
        self.ensure_capacity(entity.index() as usize);
        self.labels[entity.index() as usize] = Some(label);
    }

    pub fn label(&self, entity: EntityId) -> Option<&LabelGraphic> {
        self.labels
            .get(entity.index() as usize)
            .and_then(|l| l.as_ref())
    }

    /// Visible, placed entities that carry a point or a label, in spawn order.
    pub fn drawable_markers(&self) -> Vec<DrawableMarker> {
        let mut out = Vec::new();
        for idx in 0..self.next_index as usize {
            let entity = EntityId(Handle::new(idx as u32, 0));
            let Some(transform) = self.transform(entity) else {
                continue;
            };
            if !self.is_visible(entity) {
                continue;
            }
            let point = self.point(entity);
            let label = self.label(entity).cloned();
            if point.is_none() && label.is_none() {
                continue;
            }
            out.push(DrawableMarker {
                entity,
                transform,
                point,
                label,
            });
        }
        out
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.points.resize(new_len, None);
            self.labels.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{Color, LabelGraphic, PointGraphic, Transform, Visibility};
    use foundation::math::Geodetic;

    fn point() -> PointGraphic {
        PointGraphic {
            pixel_size: 12.0,
            color: Color::BLUE,
        }
    }

    #[test]
    fn spawn_and_collect_markers() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::at(Geodetic::from_degrees(25.0, 60.0, 0.0)));
        world.set_point(entity, point());
        world.set_label(entity, LabelGraphic::new("Me"));

        let markers = world.drawable_markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].entity, entity);
        assert_eq!(markers[0].label.as_ref().map(|l| l.text.as_str()), Some("Me"));
    }

    #[test]
    fn hidden_entities_are_filtered() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::at(Geodetic::from_degrees(0.0, 0.0, 0.0)));
        world.set_point(entity, point());
        world.set_visibility(entity, Visibility::hidden());

        assert!(!world.is_visible(entity));
        assert!(world.drawable_markers().is_empty());

        world.set_visibility(entity, Visibility::visible());
        assert_eq!(world.drawable_markers().len(), 1);
    }

    #[test]
    fn unplaced_entities_are_not_drawn() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_point(entity, point());
        assert!(world.transform(entity).is_none());
        assert!(world.drawable_markers().is_empty());
        assert_eq!(world.len(), 1);
    }
}
