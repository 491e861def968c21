// Domain layer: core models and ports (interfaces). No HTTP or runtime details here.

pub mod model;
pub mod ports;
