//! # Communications interface crate.
//!
//! Provides the data exchanged between the flight software and its external
//! collaborators: vehicle feedback and operator input devices.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Feedback reported by vehicle equipment
pub mod eqpt;

/// Operator input device events
pub mod input;
