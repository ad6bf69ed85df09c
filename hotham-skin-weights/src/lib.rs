#![deny(missing_docs)]

//! Skin weights for Hotham meshes.
//!
//! Every point in a mesh is deformed by some number of influences (usually joints), each with a
//! weight. Rather than giving every point its own list, [`SkinWeights`] stores the lists back to
//! back in two flat arrays and records where each point's run starts and how long it is. The
//! name and bind pose of every influence live alongside.
//!
//! Because deformation code walks these arrays without checking them, a [`SkinWeights`] should
//! always be run through [`SkinWeights::validate`] (or a configured [`Validator`]) after it has
//! been built, loaded or mutated. [`SkinWeights::validated`] hands back a
//! [`ValidatedSkinWeights`] that borrows the table, so it can't be changed underneath you.
//!
//! ```
//! use hotham_skin_weights::{glam::Mat4, SkinWeights};
//!
//! let mut skin_weights = SkinWeights::new();
//! let hip = skin_weights.push_influence("hip", Mat4::IDENTITY) as i32;
//! let knee = skin_weights.push_influence("knee", Mat4::IDENTITY) as i32;
//! skin_weights.push_point([(hip, 1.0)]).unwrap();
//! skin_weights.push_point([(hip, 0.5), (knee, 0.5)]).unwrap();
//!
//! let validated = skin_weights.validated().unwrap();
//! assert_eq!(validated.point_influences(1).unwrap().count(), 2);
//! ```

pub use glam;

pub use memory::{MemoryAccumulator, MemoryUsage};
pub use persistence::{JsonContainer, ObjectContainer, IO_VERSION, TYPE_NAME};
pub use skin_weights::{fields, SkinWeights, SkinWeightsBuilder};
pub use skin_weights_error::SkinWeightsError;
pub use validation::{ValidatedSkinWeights, Validator, ValidatorBuilder};

/// Reporting the memory owned by skin weights
pub mod memory;
/// Saving and loading skin weights through versioned, named-field containers
pub mod persistence;
mod skin_weights;
mod skin_weights_error;
mod validation;

/// Skin weights result type
pub type SkinWeightsResult<T> = std::result::Result<T, SkinWeightsError>;
