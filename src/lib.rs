mod aggregate;
mod chart;
pub mod config;
mod context;
mod delta;
mod error;
mod fetch;
mod join;
mod loaders;
pub mod logging;
pub mod pipeline;
mod progress;
mod regression;
mod report;
mod reshape;
mod vaccination;

pub use aggregate::*;
pub use chart::*;
pub use config::Config;
pub use context::*;
pub use delta::*;
pub use error::Error;
pub use fetch::*;
pub use join::*;
pub use loaders::*;
pub use progress::*;
pub use regression::*;
pub use report::*;
pub use reshape::*;
pub use vaccination::*;
