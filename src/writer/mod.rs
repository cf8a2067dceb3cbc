//! Component 4 – everything that touches the output side.
pub mod go;
pub mod outline;
