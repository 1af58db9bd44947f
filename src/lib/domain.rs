//! Domain types and capabilities

pub mod communication;
