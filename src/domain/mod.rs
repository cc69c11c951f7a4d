// Domain layer: the normalized gradebook model and the ports the core talks to.

pub mod model;
pub mod ports;
