pub mod sample;

pub use sample::{GazetteerSampleQuery, GazetteerSampleResponse};
