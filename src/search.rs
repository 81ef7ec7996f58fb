pub mod fingerprint;
pub mod generator;
pub mod model;
pub mod precondition;
