// Adapters layer: concrete implementations of the domain ports (filesystem, property portal).

pub mod oprs;
pub mod storage;
