//! Logic Module - Risk pipeline
//!
//! - `features/` - Feature layout and vector (8 clinical measurements)
//! - `model/` - Classifier adapter, artifacts, normalizer, risk bands
//! - `presenter/` - Risk tiers, advice and rendering
//! - `pipeline` - Load-once service composing the above

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod presenter;
