// Domain layer: flat configuration values and the typed connection settings derived from them.

pub mod model;
