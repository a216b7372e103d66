use crate::mirror::CgmPhysics;
use crate::selection::Selections;

/// A loaded scene: its mirrored physics state and the selections made in it.
/// Cloning a `Cgm` yields an independent snapshot.
#[derive(Clone, Default)]
pub struct Cgm {
    pub(crate) physics: CgmPhysics,
    pub(crate) selection: Selections,
}

impl Cgm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn physics(&self) -> &CgmPhysics {
        &self.physics
    }

    pub fn selection(&self) -> &Selections {
        &self.selection
    }

    /// Read access to the physics alongside write access to the selection
    /// slots, e.g. `let (physics, selection) = cgm.selecting();` followed by
    /// `selection.shape.select_next(physics)`.
    pub fn selecting(&mut self) -> (&CgmPhysics, &mut Selections) {
        (&self.physics, &mut self.selection)
    }
}
