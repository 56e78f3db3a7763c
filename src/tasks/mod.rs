//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired cache entries at configured intervals

mod sweep;

pub use sweep::{spawn_sweep_task, Sweeper};
