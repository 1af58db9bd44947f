//! Concrete adapters for the domain capabilities

pub mod email;
