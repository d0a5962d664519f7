//! Description resolution, plan assembly and rendering

pub mod description;
pub mod plan;
pub mod render;
pub mod setup;

pub use description::*;
pub use plan::*;
pub use render::*;
pub use setup::*;
