pub mod client;
pub mod endpoints;

pub use client::{HttpRestClient, PageRequest, RestClient};
pub use endpoints::EndpointCandidate;
