use super::MirrorError;
use std::collections::BTreeMap;
use std::fmt::Display;

/// One-to-one association between model entities and their view
/// counterparts, indexed in both directions.
#[derive(Debug, Clone)]
pub struct IdentityMap<M, V> {
    forward: BTreeMap<M, V>,
    reverse: BTreeMap<V, M>,
}

impl<M, V> Default for IdentityMap<M, V> {
    fn default() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }
}

impl<M, V> IdentityMap<M, V>
where
    M: Copy + Ord + Display,
    V: Copy + Ord + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn associate(&mut self, view: V, model: M) -> Result<(), MirrorError> {
        if self.forward.contains_key(&model) {
            return Err(MirrorError::AlreadyAssociated(model.to_string()));
        }
        if self.reverse.contains_key(&view) {
            return Err(MirrorError::ViewAlreadyAssociated(view.to_string()));
        }
        self.forward.insert(model, view);
        self.reverse.insert(view, model);
        Ok(())
    }

    /// Removes the association of `model`, returning its view counterpart.
    pub fn disassociate(&mut self, model: M) -> Result<V, MirrorError> {
        let view = self
            .forward
            .remove(&model)
            .ok_or_else(|| MirrorError::NotAssociated(model.to_string()))?;
        self.reverse.remove(&view);
        Ok(view)
    }

    pub fn view_of(&self, model: M) -> Option<V> {
        self.forward.get(&model).copied()
    }

    pub fn model_of(&self, view: V) -> Option<M> {
        self.reverse.get(&view).copied()
    }

    pub fn contains(&self, model: M) -> bool {
        self.forward.contains_key(&model)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs in ascending model order.
    pub fn iter(&self) -> impl Iterator<Item = (M, V)> + '_ {
        self.forward.iter().map(|(model, view)| (*model, *view))
    }
}
