//! Polariser rotation vs. measured light intensity.
//!
//! Images taken at known rotation angles are reduced to a mean intensity
//! each, normalised across the set with propagated uncertainties, and drawn
//! against rotation, optionally next to Malus's law `cos²(θ)`.

pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod state;
pub mod ui;
