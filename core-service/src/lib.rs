//! Diabetes Risk Core
//!
//! Scores eight health measurements with a pre-trained binary classifier and
//! turns the probability into a risk tier with advice.

pub mod api;
pub mod cli;
pub mod constants;
pub mod logic;
