//! Container image names and the persisted default image

pub mod reference;
pub mod store;

pub use reference::{ImageRef, Reference};
pub use store::{DefaultImageStore, FileImageStore};
