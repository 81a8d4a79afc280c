// Domain layer: core models, ports and the field derivation. Only std/serde here,
// plus the reader options handed through the config port.

pub mod derive;
pub mod model;
pub mod ports;
