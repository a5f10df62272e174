//! API Routes
//!
//! Route handlers organized by upstream service.

pub mod cubes;
pub mod health;
pub mod indicators;
pub mod root;
pub mod tabular;
