pub mod cache;
pub mod converter;
pub mod definition;
pub mod layers;
pub mod registry;
