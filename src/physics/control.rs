use super::{
    CollisionObject, CollisionShape, Joint, JointId, JointKind, PcoId, PhysicsError,
    PhysicsSpace, RigidBodyParameter, RigidBodyParams, ShapeId, ShapeKind, Transform,
    require_non_negative,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Blueprint for the collision shape of a new body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeSpec {
    /// A fresh non-compound shape.
    Primitive(CollisionShape),
    /// A fresh compound assembled from child blueprints.
    Compound(Vec<ChildSpec>),
    /// A shape already in the model space, shared with its other users.
    Existing(ShapeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSpec {
    pub shape: ShapeSpec,
    #[serde(default)]
    pub offset: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub shape: ShapeSpec,
    #[serde(default)]
    pub transform: Transform,
}

/// One bone of a ragdoll. `parent` indexes an earlier link; the root link
/// has none and gets no joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub name: String,
    pub body: BodySpec,
    #[serde(default)]
    pub params: RigidBodyParams,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub joint: JointKind,
    /// Joint pivot in the link's own frame.
    #[serde(default)]
    pub pivot: Vec3,
}

/// Serializable description of a physics control to attach to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlSpec {
    RigidBody {
        body: BodySpec,
        #[serde(default)]
        params: RigidBodyParams,
    },
    Ghost {
        body: BodySpec,
    },
    Character {
        body: BodySpec,
    },
    Ragdoll {
        links: Vec<LinkSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsLink {
    pub name: String,
    pub body: PcoId,
    /// Joint to the parent link. `None` for the root.
    pub joint: Option<JointId>,
    /// Index of the parent link within the same ragdoll.
    #[serde(default)]
    pub parent: Option<usize>,
}

/// A control instantiated in one physics space, holding the ids it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicsControl {
    RigidBody { body: PcoId },
    Ghost { ghost: PcoId },
    Character { character: PcoId },
    Ragdoll { links: Vec<PhysicsLink> },
}

impl PhysicsControl {
    pub fn objects(&self) -> Vec<PcoId> {
        match self {
            PhysicsControl::RigidBody { body } => vec![*body],
            PhysicsControl::Ghost { ghost } => vec![*ghost],
            PhysicsControl::Character { character } => vec![*character],
            PhysicsControl::Ragdoll { links } => links.iter().map(|link| link.body).collect(),
        }
    }

    pub fn joints(&self) -> Vec<JointId> {
        match self {
            PhysicsControl::Ragdoll { links } => links.iter().filter_map(|link| link.joint).collect(),
            _ => Vec::new(),
        }
    }

    /// Ragdoll links in creation order; empty for other controls.
    pub fn links(&self) -> &[PhysicsLink] {
        match self {
            PhysicsControl::Ragdoll { links } => links,
            _ => &[],
        }
    }

    pub fn link_index(&self, name: &str) -> Option<usize> {
        self.links().iter().position(|link| link.name == name)
    }

    /// Indices of the links whose parent is `parent`.
    pub fn child_links(&self, parent: usize) -> Vec<usize> {
        self.links()
            .iter()
            .enumerate()
            .filter(|(_, link)| link.parent == Some(parent))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            PhysicsControl::RigidBody { .. } => "RigidBody",
            PhysicsControl::Ghost { .. } => "Ghost",
            PhysicsControl::Character { .. } => "Character",
            PhysicsControl::Ragdoll { .. } => "Ragdoll",
        }
    }
}

/// Result of instantiating a blueprint. `created_shapes` lists fresh shapes
/// in creation order, so two instantiations of one blueprint pair up
/// element by element.
#[derive(Debug, Clone, PartialEq)]
pub struct Instantiation {
    pub control: PhysicsControl,
    pub created_shapes: Vec<ShapeId>,
}

impl ControlSpec {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ControlSpec::RigidBody { .. } => "RigidBody",
            ControlSpec::Ghost { .. } => "Ghost",
            ControlSpec::Character { .. } => "Character",
            ControlSpec::Ragdoll { .. } => "Ragdoll",
        }
    }

    fn bodies(&self) -> Vec<&BodySpec> {
        match self {
            ControlSpec::RigidBody { body, .. }
            | ControlSpec::Ghost { body }
            | ControlSpec::Character { body } => vec![body],
            ControlSpec::Ragdoll { links } => links.iter().map(|link| &link.body).collect(),
        }
    }

    /// Model shapes the blueprint shares rather than creates.
    pub fn existing_shapes(&self) -> Vec<ShapeId> {
        let mut existing = Vec::new();
        for body in self.bodies() {
            collect_existing(&body.shape, &mut existing);
        }
        existing
    }

    /// Checks the blueprint against a model space without changing it.
    pub fn validate(&self, model: &PhysicsSpace) -> Result<(), PhysicsError> {
        match self {
            ControlSpec::RigidBody { params, .. } => validate_params(params)?,
            ControlSpec::Ghost { .. } | ControlSpec::Character { .. } => {}
            ControlSpec::Ragdoll { links } => {
                if links.is_empty() {
                    return Err(PhysicsError::EmptyRagdoll);
                }
                for (index, link) in links.iter().enumerate() {
                    validate_params(&link.params)?;
                    if links[..index].iter().any(|earlier| earlier.name == link.name) {
                        return Err(PhysicsError::DuplicateLinkName(link.name.clone()));
                    }
                    if let Some(parent) = link.parent {
                        if parent >= index {
                            return Err(PhysicsError::InvalidLinkParent {
                                link: index,
                                parent,
                            });
                        }
                    }
                }
            }
        }
        for body in self.bodies() {
            validate_shape_spec(&body.shape, model)?;
        }
        Ok(())
    }

    /// Creates the control's shapes, objects and joints in `space`.
    /// `resolve` translates `Existing` model shape ids into ids of `space`.
    /// Every existing shape is resolved before anything is inserted, so a
    /// failed call leaves the space untouched.
    pub fn instantiate(
        &self,
        space: &mut PhysicsSpace,
        resolve: &dyn Fn(ShapeId) -> Option<ShapeId>,
    ) -> Result<Instantiation, PhysicsError> {
        for id in self.existing_shapes() {
            let resolved = resolve(id).ok_or(PhysicsError::NoSuchShape(id))?;
            space.require_shape(resolved)?;
        }

        let mut created_shapes = Vec::new();
        let control = match self {
            ControlSpec::RigidBody { body, params } => {
                let shape = build_shape(&body.shape, space, resolve, &mut created_shapes)?;
                let object =
                    CollisionObject::rigid_body(shape, *params).with_transform(body.transform);
                PhysicsControl::RigidBody {
                    body: space.add_object(object)?,
                }
            }
            ControlSpec::Ghost { body } => {
                let shape = build_shape(&body.shape, space, resolve, &mut created_shapes)?;
                let object = CollisionObject::ghost(shape).with_transform(body.transform);
                PhysicsControl::Ghost {
                    ghost: space.add_object(object)?,
                }
            }
            ControlSpec::Character { body } => {
                let shape = build_shape(&body.shape, space, resolve, &mut created_shapes)?;
                let object = CollisionObject::character(shape).with_transform(body.transform);
                PhysicsControl::Character {
                    character: space.add_object(object)?,
                }
            }
            ControlSpec::Ragdoll { links } => {
                let mut built: Vec<PhysicsLink> = Vec::with_capacity(links.len());
                for link in links {
                    let shape =
                        build_shape(&link.body.shape, space, resolve, &mut created_shapes)?;
                    let object = CollisionObject::rigid_body(shape, link.params)
                        .with_transform(link.body.transform);
                    let body = space.add_object(object)?;

                    let joint = match link.parent.and_then(|parent| built.get(parent)) {
                        Some(parent) => {
                            let mut joint = Joint::new(link.joint, Some(parent.body), body);
                            joint.pivot_b = link.pivot;
                            let parent_frame = space
                                .object_transform(parent.body)
                                .ok_or(PhysicsError::NoSuchObject(parent.body))?;
                            let world = link.body.transform.rotation * link.pivot
                                + link.body.transform.location;
                            joint.pivot_a = parent_frame.rotation.inverse()
                                * (world - parent_frame.location);
                            Some(space.add_joint(joint)?)
                        }
                        None => None,
                    };

                    built.push(PhysicsLink {
                        name: link.name.clone(),
                        body,
                        joint,
                        parent: link.parent,
                    });
                }
                PhysicsControl::Ragdoll { links: built }
            }
        };

        Ok(Instantiation {
            control,
            created_shapes,
        })
    }
}

fn validate_params(params: &RigidBodyParams) -> Result<(), PhysicsError> {
    for parameter in RigidBodyParameter::ALL {
        let value = parameter.read(params);
        if !parameter.can_set(value) {
            return Err(PhysicsError::InvalidValue {
                name: parameter.label(),
                value,
            });
        }
    }
    Ok(())
}

fn validate_shape_spec(spec: &ShapeSpec, model: &PhysicsSpace) -> Result<(), PhysicsError> {
    match spec {
        ShapeSpec::Primitive(shape) => {
            if shape.is_compound() {
                return Err(PhysicsError::CompoundNotAllowed);
            }
            require_non_negative("margin", shape.margin())?;
            if let Some(extents) = shape.half_extents() {
                for value in extents.to_array() {
                    require_non_negative("half extent", value)?;
                }
            }
            if let ShapeKind::Capsule { height, .. } | ShapeKind::Cone { height, .. } = shape.kind()
            {
                require_non_negative("height", *height)?;
            }
            Ok(())
        }
        ShapeSpec::Compound(children) => children
            .iter()
            .try_for_each(|child| validate_shape_spec(&child.shape, model)),
        ShapeSpec::Existing(id) => model.require_shape(*id).map(|_| ()),
    }
}

fn collect_existing(spec: &ShapeSpec, out: &mut Vec<ShapeId>) {
    match spec {
        ShapeSpec::Primitive(_) => {}
        ShapeSpec::Compound(children) => {
            for child in children {
                collect_existing(&child.shape, out);
            }
        }
        ShapeSpec::Existing(id) => out.push(*id),
    }
}

fn build_shape(
    spec: &ShapeSpec,
    space: &mut PhysicsSpace,
    resolve: &dyn Fn(ShapeId) -> Option<ShapeId>,
    created: &mut Vec<ShapeId>,
) -> Result<ShapeId, PhysicsError> {
    match spec {
        ShapeSpec::Primitive(shape) => {
            let id = space.add_shape(shape.clone());
            created.push(id);
            Ok(id)
        }
        ShapeSpec::Compound(children) => {
            let id = space.add_shape(CollisionShape::compound());
            created.push(id);
            for child in children {
                let child_id = build_shape(&child.shape, space, resolve, created)?;
                space.add_child(id, child_id, child.offset)?;
            }
            Ok(id)
        }
        ShapeSpec::Existing(id) => resolve(*id).ok_or(PhysicsError::NoSuchShape(*id)),
    }
}
