pub mod notify;
pub mod params;
