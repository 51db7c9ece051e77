pub mod legacy_consumer;
pub mod legacy_converter;

pub use legacy_consumer::LegacyConverterConsumer;
pub use legacy_converter::{ConversionReport, LegacyRepositoryConverter};
