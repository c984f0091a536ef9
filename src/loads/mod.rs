//! Loads applied to a rotor stack

mod operating_point;

pub use operating_point::OperatingPoint;
