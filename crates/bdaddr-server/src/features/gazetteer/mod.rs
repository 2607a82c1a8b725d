pub mod queries;
pub mod routes;

pub use queries::{GazetteerSampleQuery, GazetteerSampleResponse};
pub use routes::gazetteer_routes;
