//! Core rate-resolution engine and its supporting types

pub mod config;
pub mod conversion;
pub mod currency;
pub mod fallback;
pub mod log;
pub mod resolver;

// Re-export main types for cleaner imports
pub use conversion::{ConversionError, ConversionRequest, ConversionResult, Origin};
pub use currency::{CurrencyCode, LiveQuote, ProviderError, RateProvider};
pub use fallback::{FallbackTable, RateQuery};
pub use resolver::RateResolver;
