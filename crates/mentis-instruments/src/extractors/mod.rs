pub mod asrs;
pub mod dsm;
pub mod npq;
pub mod sat;
