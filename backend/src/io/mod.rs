//! Interface layer exposing the domain to the outside world.

pub mod rest;

pub use rest::*;
