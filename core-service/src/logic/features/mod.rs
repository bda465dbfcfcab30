//! Features Module - Clinical feature layout and vector
//!
//! The eight measurements collected by the form, in training order.

pub mod layout;
pub mod vector;


// Re-export common types
pub use layout::{FieldSpec, FEATURE_COUNT, FEATURE_LAYOUT, FIELD_SPECS};
pub use vector::{FeatureVector, FeatureVectorBuilder};
