use super::{
    Arena, ChildShape, CollisionObject, CollisionShape, Joint, JointId, PcoId, PhysicsError,
    ShapeId, Transform,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A direct owner of a collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserId {
    Object(PcoId),
    Shape(ShapeId),
}

/// Storage for the shapes, collision objects and joints of one world.
#[derive(Clone, Default)]
pub struct PhysicsSpace {
    shapes: Arena<CollisionShape>,
    objects: Arena<CollisionObject>,
    joints: Arena<Joint>,
}

impl PhysicsSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: CollisionShape) -> ShapeId {
        ShapeId::from_handle(self.shapes.insert(shape))
    }

    pub fn shape(&self, id: ShapeId) -> Option<&CollisionShape> {
        self.shapes.get(id.handle())
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut CollisionShape> {
        self.shapes.get_mut(id.handle())
    }

    pub fn require_shape(&self, id: ShapeId) -> Result<&CollisionShape, PhysicsError> {
        self.shape(id).ok_or(PhysicsError::NoSuchShape(id))
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Result<CollisionShape, PhysicsError> {
        self.shapes
            .remove(id.handle())
            .map_err(|_| PhysicsError::NoSuchShape(id))
    }

    /// Total shapes stored, reachable or not.
    pub fn stored_shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Appends `child` to a compound. Rejects additions that would make the
    /// compound contain itself.
    pub fn add_child(
        &mut self,
        parent: ShapeId,
        child: ShapeId,
        offset: Transform,
    ) -> Result<(), PhysicsError> {
        self.require_shape(child)?;
        if !self.require_shape(parent)?.is_compound() {
            return Err(PhysicsError::NotCompound(parent));
        }
        if child == parent || self.descendants(child).contains(&parent) {
            return Err(PhysicsError::CyclicCompound { parent, child });
        }

        let children = self
            .shape_mut(parent)
            .and_then(CollisionShape::children_mut)
            .ok_or(PhysicsError::NotCompound(parent))?;
        children.push(ChildShape {
            shape: child,
            offset,
        });
        Ok(())
    }

    pub fn add_object(&mut self, object: CollisionObject) -> Result<PcoId, PhysicsError> {
        self.require_shape(object.shape)?;
        Ok(PcoId::from_handle(self.objects.insert(object)))
    }

    pub fn object(&self, id: PcoId) -> Option<&CollisionObject> {
        self.objects.get(id.handle())
    }

    pub fn object_mut(&mut self, id: PcoId) -> Option<&mut CollisionObject> {
        self.objects.get_mut(id.handle())
    }

    pub fn require_object(&self, id: PcoId) -> Result<&CollisionObject, PhysicsError> {
        self.object(id).ok_or(PhysicsError::NoSuchObject(id))
    }

    pub fn remove_object(&mut self, id: PcoId) -> Result<CollisionObject, PhysicsError> {
        self.objects
            .remove(id.handle())
            .map_err(|_| PhysicsError::NoSuchObject(id))
    }

    pub fn add_joint(&mut self, joint: Joint) -> Result<JointId, PhysicsError> {
        if let Some(a) = joint.end_a {
            self.require_object(a)?;
        }
        self.require_object(joint.end_b)?;
        Ok(JointId::from_handle(self.joints.insert(joint)))
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.handle())
    }

    pub fn remove_joint(&mut self, id: JointId) -> Result<Joint, PhysicsError> {
        self.joints
            .remove(id.handle())
            .map_err(|_| PhysicsError::NoSuchJoint(id))
    }

    /// Collision objects in ascending id order.
    pub fn object_ids(&self) -> Vec<PcoId> {
        let mut ids: Vec<_> = self
            .objects
            .handles()
            .into_iter()
            .map(PcoId::from_handle)
            .collect();
        ids.sort();
        ids
    }

    /// Joints in ascending id order.
    pub fn joint_ids(&self) -> Vec<JointId> {
        let mut ids: Vec<_> = self
            .joints
            .handles()
            .into_iter()
            .map(JointId::from_handle)
            .collect();
        ids.sort();
        ids
    }

    pub fn count_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn count_joints(&self) -> usize {
        self.joints.len()
    }

    /// Every shape reachable from a collision object, compound children
    /// included at any depth.
    pub fn shape_map(&self) -> BTreeMap<ShapeId, &CollisionShape> {
        let mut result = BTreeMap::new();
        let mut pending: Vec<ShapeId> = self.objects.iter().map(|(_, pco)| pco.shape).collect();
        while let Some(id) = pending.pop() {
            if result.contains_key(&id) {
                continue;
            }
            if let Some(shape) = self.shape(id) {
                pending.extend(shape.children().iter().map(|child| child.shape));
                result.insert(id, shape);
            }
        }
        result
    }

    /// Reachable shapes in ascending id order.
    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.shape_map().into_keys().collect()
    }

    pub fn count_shapes(&self) -> usize {
        self.shape_map().len()
    }

    pub fn is_reachable(&self, id: ShapeId) -> bool {
        self.shape_map().contains_key(&id)
    }

    /// True if `user` is `used` or has it as an immediate child.
    pub fn uses_shape(&self, user: ShapeId, used: ShapeId) -> bool {
        user == used || self.shape(user).is_some_and(|shape| shape.has_child(used))
    }

    /// Direct owners of a shape: objects using it and reachable compounds
    /// holding it as an immediate child. Owners of those owners are not
    /// included.
    pub fn user_set(&self, used: ShapeId) -> BTreeSet<UserId> {
        let mut result = BTreeSet::new();
        for (handle, pco) in self.objects.iter() {
            if pco.shape == used {
                result.insert(UserId::Object(PcoId::from_handle(handle)));
            }
        }
        for (id, shape) in self.shape_map() {
            if id != used && shape.has_child(used) {
                result.insert(UserId::Shape(id));
            }
        }
        result
    }

    /// Points every object that uses `old` at `new`. Returns how many changed.
    pub fn replace_in_objects(&mut self, old: ShapeId, new: ShapeId) -> usize {
        let mut count = 0;
        let handles = self.objects.handles();
        for handle in handles {
            if let Some(pco) = self.objects.get_mut(handle) {
                if pco.shape == old {
                    pco.shape = new;
                    count += 1;
                }
            }
        }
        count
    }

    /// Substitutes `new` for `old` in every reachable compound, keeping each
    /// child's offset and position in the child list. Returns how many
    /// children changed.
    pub fn replace_in_compounds(&mut self, old: ShapeId, new: ShapeId) -> usize {
        let compounds: Vec<ShapeId> = self
            .shape_map()
            .into_iter()
            .filter(|(_, shape)| shape.has_child(old))
            .map(|(id, _)| id)
            .collect();

        let mut count = 0;
        for id in compounds {
            if let Some(children) = self.shape_mut(id).and_then(CollisionShape::children_mut) {
                for child in children.iter_mut().filter(|child| child.shape == old) {
                    child.shape = new;
                    count += 1;
                }
            }
        }
        count
    }

    /// Removes shapes no collision object can reach. Returns the removed ids
    /// in ascending order.
    pub fn purge_orphans(&mut self) -> Vec<ShapeId> {
        let reachable: BTreeSet<ShapeId> = self.shape_map().into_keys().collect();
        let mut orphans: Vec<ShapeId> = self
            .shapes
            .handles()
            .into_iter()
            .map(ShapeId::from_handle)
            .filter(|id| !reachable.contains(id))
            .collect();
        orphans.sort();
        for id in &orphans {
            let _ = self.shapes.remove(id.handle());
        }
        orphans
    }

    pub fn object_transform(&self, id: PcoId) -> Option<Transform> {
        self.object(id).map(CollisionObject::transform)
    }

    /// World transform of a shape, following the chain of unique owners up
    /// to a collision object. Identity when any link in the chain has zero
    /// or several owners.
    pub fn shape_transform(&self, id: ShapeId) -> Transform {
        let mut local = Transform::IDENTITY;
        let mut current = id;
        let mut visited = BTreeSet::new();
        while visited.insert(current) {
            let users = self.user_set(current);
            if users.len() != 1 {
                return Transform::IDENTITY;
            }
            match users.into_iter().next() {
                Some(UserId::Object(pco)) => {
                    return self
                        .object_transform(pco)
                        .map_or(Transform::IDENTITY, |world| local.combine_with_parent(&world));
                }
                Some(UserId::Shape(parent)) => {
                    let offset = self
                        .shape(parent)
                        .and_then(|shape| {
                            shape.children().iter().find(|child| child.shape == current)
                        })
                        .map_or(Transform::IDENTITY, |child| child.offset);
                    local = local.combine_with_parent(&offset);
                    current = parent;
                }
                None => return Transform::IDENTITY,
            }
        }
        Transform::IDENTITY
    }

    /// Scaled volume; compounds sum their children.
    pub fn scaled_volume(&self, id: ShapeId) -> Option<f32> {
        let shape = self.shape(id)?;
        let scale = shape.scale().element_product();
        match shape.volume() {
            Some(volume) => Some(volume * scale),
            None => {
                let mut total = 0.0;
                for child in shape.children() {
                    if child.shape == id {
                        continue;
                    }
                    total += self.scaled_volume(child.shape)?;
                }
                Some(total * scale)
            }
        }
    }

    fn descendants(&self, id: ShapeId) -> BTreeSet<ShapeId> {
        let mut result = BTreeSet::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(shape) = self.shape(current) {
                for child in shape.children() {
                    if result.insert(child.shape) {
                        pending.push(child.shape);
                    }
                }
            }
        }
        result
    }
}
