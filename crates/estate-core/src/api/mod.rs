//! Facade construction.

mod builder;

pub use builder::EstateApiBuilder;
