pub mod buffer;
pub mod error;
pub mod resource;
pub mod tensor;

pub use buffer::NativeBuffer;
pub use error::DlrError;
pub use resource::Resource;
pub use tensor::{DataType, Device, Shape};

pub type Result<T> = std::result::Result<T, DlrError>;
