pub mod config;
pub mod error;
pub mod localize;
pub mod params;
pub mod source;

pub use config::{CalendarConfig, SourceOverrides, SourceSettings};
pub use error::CalError;
pub use params::{EffectiveParams, RequestOverrides};
pub use source::CalendarSource;
