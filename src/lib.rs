pub mod core;
pub mod engine;
pub mod envconfig;
pub mod interop;
pub mod logging;

pub use crate::core::{DataType, Device, DlrError, NativeBuffer, Resource, Result, Shape};
pub use engine::{DlrArray, DlrEngine, DlrManager, ENGINE_NAME};
pub use envconfig::DlrConfig;
