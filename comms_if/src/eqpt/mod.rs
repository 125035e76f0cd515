//! # Equipment Interface
//!
//! This module defines the structures reported by the vehicle's equipment to the flight software.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod flight;
