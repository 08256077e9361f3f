///! N2YO satellite data provider
///!
///! One upstream HTTP API covers both operations the pipeline needs:
///! - `above`: satellites currently above the observer's horizon
///! - `positions`: live position samples for one NORAD ID
///!
///! Both surface the provider's remaining-quota header as a `QuotaSignal`.

// ============ Data Types ============
mod types;
pub use types::*;

// ============ API Client ============
mod client;
pub use client::{quota_from_headers, FetchError, N2yoClient, SatelliteProvider, QUOTA_HEADER};
