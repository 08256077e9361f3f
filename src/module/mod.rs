pub mod audit;
pub mod geocode;
pub mod n2yo;
pub mod notify;
pub mod pipeline;
pub mod reported;
pub mod scheduled;
