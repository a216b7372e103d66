pub mod editor;
pub mod mirror;
pub mod physics;
pub mod selection;
