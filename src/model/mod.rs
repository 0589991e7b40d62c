//! # Document Graph Model
//!
//! Plain data types shared by every layer: the dynamically-typed [`Value`],
//! its ordering class [`TypeWeight`], and the graph views over stored
//! documents ([`Vertex`], [`Edge`], [`Path`]).
//!
//! This module is pure data. No I/O, no state.

pub mod document;
pub mod edge;
pub mod path;
pub mod type_weight;
pub mod value;
pub mod vertex;

pub use document::{Document, DocumentId};
pub use edge::{Direction, Edge};
pub use path::Path;
pub use type_weight::TypeWeight;
pub use value::{Object, Value};
pub use vertex::Vertex;
