pub mod color;
pub mod geometry;
pub mod layers;
pub mod params;
pub mod pipeline;
pub mod surface;
