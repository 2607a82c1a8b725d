pub mod queries;
pub mod routes;

pub use queries::{SampleAddressesQuery, SampleAddressesResponse};
pub use routes::samples_routes;
