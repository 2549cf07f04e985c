//! GeoLocator の実装

pub mod maxmind;

pub use maxmind::MaxMindGeoLocator;
