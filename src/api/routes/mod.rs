//! API Routes
//!
//! Route handlers organized by functionality.

pub mod directions;
pub mod health;
