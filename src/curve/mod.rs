pub mod bootstrap;
pub mod interpolation;
pub mod projection;
