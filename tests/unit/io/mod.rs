pub mod clips;
pub mod configuration;
pub mod image;
