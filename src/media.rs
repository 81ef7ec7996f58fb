pub mod extract;
pub mod merge;
pub mod naming;
pub mod probe;
