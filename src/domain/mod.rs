// Domain layer: directory rows and the ports the service depends on.

pub mod model;
pub mod ports;
