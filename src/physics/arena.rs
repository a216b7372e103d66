use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle referencing a slot within an [`Arena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    generation: u32,
    index: u32,
}

impl Handle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { generation, index }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the handle as `(generation << 32) | index`.
    pub const fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self {
            generation: (raw >> 32) as u32,
            index: raw as u32,
        }
    }
}

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Errors returned by arena operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ArenaError {
    NoSuchHandle(Handle),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::NoSuchHandle(handle) => {
                write!(f, "handle {:x} is not alive in this arena", handle.to_raw())
            }
        }
    }
}

impl std::error::Error for ArenaError {}

/// Slot storage with generation-checked handles. Removing a value bumps the
/// slot generation so stale handles never resolve to a later occupant.
#[derive(Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            Handle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            Handle::new(index, 0)
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Result<T, ArenaError> {
        if !self.contains(handle) {
            return Err(ArenaError::NoSuchHandle(handle));
        }
        let slot = &mut self.slots[handle.index as usize];
        let value = slot.value.take().ok_or(ArenaError::NoSuchHandle(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        Ok(value)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        let handle = arena.insert("box");
        assert_eq!(arena.get(handle), Some(&"box"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn remove_bumps_generation() {
        let mut arena = Arena::new();
        let first = arena.insert(1u32);
        arena.remove(first).expect("first alive");

        let second = arena.insert(2u32);
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&2));
    }

    #[test]
    fn remove_stale_handle_fails() {
        let mut arena: Arena<u8> = Arena::new();
        let stale = Handle::new(7, 3);

        let err = arena.remove(stale).expect_err("stale handle should error");
        assert_eq!(err, ArenaError::NoSuchHandle(stale));
    }

    #[test]
    fn raw_form_keeps_generation_in_high_bits() {
        let handle = Handle::new(3, 1);
        assert_eq!(handle.to_raw(), 0x1_0000_0003);
        assert_eq!(Handle::from_raw(handle.to_raw()), handle);
    }

    #[test]
    fn iteration_skips_vacant_slots() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');
        let c = arena.insert('c');
        arena.remove(b).unwrap();

        assert_eq!(arena.handles(), vec![a, c]);
        assert!(!arena.is_empty());
    }
}
