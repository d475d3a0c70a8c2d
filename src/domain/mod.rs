// Domain layer - Timeline, overlay and error types

pub mod errors;
pub mod model;
pub mod rules;
