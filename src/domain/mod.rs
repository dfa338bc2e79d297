// Domain layer: records, outcomes, GeoJSON types and the ports the core drives.

pub mod model;
pub mod ports;
