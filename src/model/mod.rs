//! Document types persisted through the [`crate::store`] gateway.

mod cat;
mod dog;

pub use cat::Cat;
pub use dog::Dog;
