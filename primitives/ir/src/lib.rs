#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! keymesh intermediate representation
//!
//! This crate defines the data a collection description is reduced to before
//! code generation: the structural [`shape`] of a collection, the
//! [`key_descriptor`] of each key/value dimension, and the normalized
//! [`configuration`] snapshot that ties them together.
//!
//! Nothing here validates caller input; that is the builder's job. The types
//! only guarantee their own structural invariants (unique dimension names,
//! write-once fields).

pub mod configuration;
pub mod key_descriptor;
pub mod shape;

pub use configuration::*;
pub use key_descriptor::*;
pub use shape::*;
