pub mod classifier;
pub mod payload;

pub use classifier::LightClassifier;
pub use payload::extract_reading;
