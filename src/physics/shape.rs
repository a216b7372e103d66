use super::{PhysicsError, ShapeId, Transform, require_non_negative};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// Collision margin given to new shapes unless configured otherwise.
pub const DEFAULT_MARGIN: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    fn component(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    fn with_component(self, mut v: Vec3, value: f32) -> Vec3 {
        v[self.index()] = value;
        v
    }

    /// The two extents perpendicular to this axis, in X/Y/Z order.
    fn radial(self, v: Vec3) -> (f32, f32) {
        match self {
            Axis::X => (v.y, v.z),
            Axis::Y => (v.x, v.z),
            Axis::Z => (v.x, v.y),
        }
    }

    fn extents(self, axial: f32, radius: f32) -> Vec3 {
        self.with_component(Vec3::splat(radius), axial)
    }
}

/// A child of a compound shape, positioned in the compound's frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildShape {
    pub shape: ShapeId,
    #[serde(default)]
    pub offset: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Box { half_extents: Vec3 },
    Capsule { radius: f32, height: f32, axis: Axis },
    Cone { radius: f32, height: f32, axis: Axis },
    Cylinder { half_extents: Vec3, axis: Axis },
    Sphere { radius: f32 },
    Compound { children: Vec<ChildShape> },
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    kind: ShapeKind,
    #[serde(default = "default_margin")]
    margin: f32,
    #[serde(default = "unit_scale")]
    scale: Vec3,
}

impl CollisionShape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            margin: DEFAULT_MARGIN,
            scale: Vec3::ONE,
        }
    }

    pub fn new_box(half_extents: Vec3) -> Self {
        Self::new(ShapeKind::Box { half_extents })
    }

    pub fn capsule(radius: f32, height: f32, axis: Axis) -> Self {
        Self::new(ShapeKind::Capsule {
            radius,
            height,
            axis,
        })
    }

    pub fn cone(radius: f32, height: f32, axis: Axis) -> Self {
        Self::new(ShapeKind::Cone {
            radius,
            height,
            axis,
        })
    }

    pub fn cylinder(half_extents: Vec3, axis: Axis) -> Self {
        Self::new(ShapeKind::Cylinder { half_extents, axis })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(ShapeKind::Sphere { radius })
    }

    pub fn compound() -> Self {
        Self::new(ShapeKind::Compound {
            children: Vec::new(),
        })
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn set_margin(&mut self, margin: f32) {
        self.margin = margin;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, ShapeKind::Compound { .. })
    }

    /// Short type name, e.g. "Box" or "Compound".
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            ShapeKind::Box { .. } => "Box",
            ShapeKind::Capsule { .. } => "Capsule",
            ShapeKind::Cone { .. } => "Cone",
            ShapeKind::Cylinder { .. } => "Cylinder",
            ShapeKind::Sphere { .. } => "Sphere",
            ShapeKind::Compound { .. } => "Compound",
        }
    }

    pub fn children(&self) -> &[ChildShape] {
        match &self.kind {
            ShapeKind::Compound { children } => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ChildShape>> {
        match &mut self.kind {
            ShapeKind::Compound { children } => Some(children),
            _ => None,
        }
    }

    /// True if `id` is an immediate child of this compound.
    pub fn has_child(&self, id: ShapeId) -> bool {
        self.children().iter().any(|child| child.shape == id)
    }

    pub fn axis(&self) -> Option<Axis> {
        match self.kind {
            ShapeKind::Capsule { axis, .. }
            | ShapeKind::Cone { axis, .. }
            | ShapeKind::Cylinder { axis, .. } => Some(axis),
            _ => None,
        }
    }

    /// Unscaled half extents on the local axes; `None` for compounds.
    pub fn half_extents(&self) -> Option<Vec3> {
        match self.kind {
            ShapeKind::Box { half_extents } | ShapeKind::Cylinder { half_extents, .. } => {
                Some(half_extents)
            }
            ShapeKind::Capsule {
                radius,
                height,
                axis,
            } => Some(axis.extents(height / 2.0 + radius, radius)),
            ShapeKind::Cone {
                radius,
                height,
                axis,
            } => Some(axis.extents(height / 2.0, radius)),
            ShapeKind::Sphere { radius } => Some(Vec3::splat(radius)),
            ShapeKind::Compound { .. } => None,
        }
    }

    /// Height along the shape's axis, or NaN if the shape has none.
    pub fn height(&self) -> f32 {
        match self.kind {
            ShapeKind::Capsule { height, .. } | ShapeKind::Cone { height, .. } => height,
            ShapeKind::Cylinder { half_extents, axis } => 2.0 * axis.component(half_extents),
            ShapeKind::Sphere { radius } => 2.0 * radius,
            ShapeKind::Box { .. } | ShapeKind::Compound { .. } => f32::NAN,
        }
    }

    /// Radius, or NaN if the shape is not round.
    pub fn radius(&self) -> f32 {
        match self.kind {
            ShapeKind::Capsule { radius, .. }
            | ShapeKind::Cone { radius, .. }
            | ShapeKind::Sphere { radius } => radius,
            ShapeKind::Cylinder { half_extents, axis } => {
                let (a, b) = axis.radial(half_extents);
                if a == b { a } else { f32::NAN }
            }
            ShapeKind::Box { .. } | ShapeKind::Compound { .. } => f32::NAN,
        }
    }

    /// Unscaled volume; `None` for compounds, whose volume depends on the space.
    pub fn volume(&self) -> Option<f32> {
        let volume = match self.kind {
            ShapeKind::Box { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            ShapeKind::Capsule { radius, height, .. } => {
                PI * radius * radius * height + 4.0 / 3.0 * PI * radius.powi(3)
            }
            ShapeKind::Cone { radius, height, .. } => PI * radius * radius * height / 3.0,
            ShapeKind::Cylinder { half_extents, axis } => {
                let (a, b) = axis.radial(half_extents);
                PI * a * b * 2.0 * axis.component(half_extents)
            }
            ShapeKind::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            ShapeKind::Compound { .. } => return None,
        };
        Some(volume)
    }

    /// Builds a shape of the same kind with new half extents. Returns
    /// `Ok(None)` when the kind cannot represent them, e.g. a sphere with
    /// unequal extents.
    pub fn with_half_extents(&self, half_extents: Vec3) -> Result<Option<Self>, PhysicsError> {
        for value in half_extents.to_array() {
            require_non_negative("half extent", value)?;
        }

        let kind = match self.kind {
            ShapeKind::Box { .. } => Some(ShapeKind::Box { half_extents }),
            ShapeKind::Capsule { axis, .. } => {
                let (r1, r2) = axis.radial(half_extents);
                (r1 == r2 && axis.component(half_extents) >= r1).then(|| ShapeKind::Capsule {
                    radius: r1,
                    height: 2.0 * (axis.component(half_extents) - r1),
                    axis,
                })
            }
            ShapeKind::Cone { axis, .. } => {
                let (r1, r2) = axis.radial(half_extents);
                (r1 == r2).then(|| ShapeKind::Cone {
                    radius: r1,
                    height: 2.0 * axis.component(half_extents),
                    axis,
                })
            }
            ShapeKind::Cylinder { axis, .. } => Some(ShapeKind::Cylinder { half_extents, axis }),
            ShapeKind::Sphere { .. } => {
                let uniform = half_extents.x == half_extents.y && half_extents.y == half_extents.z;
                uniform.then(|| ShapeKind::Sphere {
                    radius: half_extents.x,
                })
            }
            ShapeKind::Compound { .. } => return Err(PhysicsError::CompoundNotAllowed),
        };

        Ok(kind.map(|kind| self.respawn(kind)))
    }

    /// Builds a shape of the same kind with a new radius.
    pub fn with_radius(&self, radius: f32) -> Result<Self, PhysicsError> {
        require_non_negative("radius", radius)?;

        let kind = match self.kind {
            ShapeKind::Box { .. } => ShapeKind::Box {
                half_extents: Vec3::splat(radius),
            },
            ShapeKind::Capsule { height, axis, .. } => ShapeKind::Capsule {
                radius,
                height,
                axis,
            },
            ShapeKind::Cone { height, axis, .. } => ShapeKind::Cone {
                radius,
                height,
                axis,
            },
            ShapeKind::Cylinder { half_extents, axis } => ShapeKind::Cylinder {
                half_extents: axis.extents(axis.component(half_extents), radius),
                axis,
            },
            ShapeKind::Sphere { .. } => ShapeKind::Sphere { radius },
            ShapeKind::Compound { .. } => return Err(PhysicsError::CompoundNotAllowed),
        };

        Ok(self.respawn(kind))
    }

    /// Builds a shape of the same kind with a new height.
    pub fn with_height(&self, height: f32) -> Result<Self, PhysicsError> {
        require_non_negative("height", height)?;

        let kind = match self.kind {
            ShapeKind::Box { .. } => ShapeKind::Box {
                half_extents: Vec3::splat(height / 2.0),
            },
            ShapeKind::Capsule { radius, axis, .. } => ShapeKind::Capsule {
                radius,
                height,
                axis,
            },
            ShapeKind::Cone { radius, axis, .. } => ShapeKind::Cone {
                radius,
                height,
                axis,
            },
            ShapeKind::Cylinder { half_extents, axis } => ShapeKind::Cylinder {
                half_extents: axis.with_component(half_extents, height / 2.0),
                axis,
            },
            ShapeKind::Sphere { .. } => ShapeKind::Sphere {
                radius: height / 2.0,
            },
            ShapeKind::Compound { .. } => return Err(PhysicsError::CompoundNotAllowed),
        };

        Ok(self.respawn(kind))
    }

    fn respawn(&self, kind: ShapeKind) -> Self {
        Self {
            kind,
            margin: self.margin,
            scale: self.scale,
        }
    }
}

/// Editable and readable parameters of a collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeParameter {
    HalfExtentX,
    HalfExtentY,
    HalfExtentZ,
    Height,
    Margin,
    Radius,
    ScaleX,
    ScaleY,
    ScaleZ,
    ScaledVolume,
}

impl ShapeParameter {
    pub const ALL: [ShapeParameter; 10] = [
        ShapeParameter::HalfExtentX,
        ShapeParameter::HalfExtentY,
        ShapeParameter::HalfExtentZ,
        ShapeParameter::Height,
        ShapeParameter::Margin,
        ShapeParameter::Radius,
        ShapeParameter::ScaleX,
        ShapeParameter::ScaleY,
        ShapeParameter::ScaleZ,
        ShapeParameter::ScaledVolume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeParameter::HalfExtentX => "HalfExtentX",
            ShapeParameter::HalfExtentY => "HalfExtentY",
            ShapeParameter::HalfExtentZ => "HalfExtentZ",
            ShapeParameter::Height => "Height",
            ShapeParameter::Margin => "Margin",
            ShapeParameter::Radius => "Radius",
            ShapeParameter::ScaleX => "ScaleX",
            ShapeParameter::ScaleY => "ScaleY",
            ShapeParameter::ScaleZ => "ScaleZ",
            ShapeParameter::ScaledVolume => "ScaledVolume",
        }
    }

    /// Margin is altered in place; every other settable parameter requires a
    /// replacement shape.
    pub fn is_in_place(self) -> bool {
        matches!(self, ShapeParameter::Margin)
    }

    pub fn can_set(self, shape: &CollisionShape) -> bool {
        let kind = &shape.kind;
        let boxy = matches!(kind, ShapeKind::Box { .. } | ShapeKind::Cylinder { .. });
        match self {
            ShapeParameter::HalfExtentX | ShapeParameter::HalfExtentY | ShapeParameter::HalfExtentZ => {
                boxy
            }
            ShapeParameter::Height | ShapeParameter::Radius => !shape.is_compound(),
            ShapeParameter::Margin => {
                !matches!(kind, ShapeKind::Sphere { .. } | ShapeKind::Capsule { .. })
            }
            ShapeParameter::ScaleX
            | ShapeParameter::ScaleY
            | ShapeParameter::ScaleZ
            | ShapeParameter::ScaledVolume => false,
        }
    }

    /// Reads the parameter; NaN when it does not apply. `ScaledVolume` of a
    /// compound is NaN here, see `PhysicsSpace::scaled_volume`.
    pub fn read(self, shape: &CollisionShape) -> f32 {
        let half_extent = |axis: Axis| {
            shape
                .half_extents()
                .map_or(f32::NAN, |extents| axis.component(extents))
        };
        match self {
            ShapeParameter::HalfExtentX => half_extent(Axis::X),
            ShapeParameter::HalfExtentY => half_extent(Axis::Y),
            ShapeParameter::HalfExtentZ => half_extent(Axis::Z),
            ShapeParameter::Height => shape.height(),
            ShapeParameter::Margin => shape.margin,
            ShapeParameter::Radius => shape.radius(),
            ShapeParameter::ScaleX => shape.scale.x,
            ShapeParameter::ScaleY => shape.scale.y,
            ShapeParameter::ScaleZ => shape.scale.z,
            ShapeParameter::ScaledVolume => shape
                .volume()
                .map_or(f32::NAN, |volume| volume * shape.scale.element_product()),
        }
    }

    pub fn min_value(self) -> f32 {
        match self {
            ShapeParameter::ScaledVolume => 0.0,
            _ => f32::MIN_POSITIVE,
        }
    }

    pub fn max_value(self) -> f32 {
        f32::MAX
    }

    /// Builds the replacement shape for a size parameter. `Ok(None)` means the
    /// shape kind cannot take the requested value.
    pub fn resized(
        self,
        shape: &CollisionShape,
        value: f32,
    ) -> Result<Option<CollisionShape>, PhysicsError> {
        let axis = match self {
            ShapeParameter::HalfExtentX => Axis::X,
            ShapeParameter::HalfExtentY => Axis::Y,
            ShapeParameter::HalfExtentZ => Axis::Z,
            ShapeParameter::Height => return shape.with_height(value).map(Some),
            ShapeParameter::Radius => return shape.with_radius(value).map(Some),
            _ => return Ok(None),
        };
        match shape.half_extents() {
            Some(extents) => shape.with_half_extents(axis.with_component(extents, value)),
            None => Err(PhysicsError::CompoundNotAllowed),
        }
    }
}

impl fmt::Display for ShapeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
