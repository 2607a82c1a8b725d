pub mod addresses;

pub use addresses::{SampleAddressesQuery, SampleAddressesResponse};
