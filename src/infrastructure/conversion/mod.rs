//! Conversion service adapters

mod http;

pub use http::HttpConversionService;
