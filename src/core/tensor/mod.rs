use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element type of an array. DLR arrays only ever hold `Float32`; the other
/// variants exist so callers can ask for them and be told no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    Float64,
    Float16,
    Uint8,
    Int8,
    Int32,
    Int64,
    Boolean,
    Unknown,
}

impl DataType {
    pub fn num_of_bytes(&self) -> usize {
        match self {
            DataType::Float64 | DataType::Int64 => 8,
            DataType::Float32 | DataType::Int32 => 4,
            DataType::Float16 => 2,
            DataType::Uint8 | DataType::Int8 | DataType::Boolean => 1,
            DataType::Unknown => 0,
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64 | DataType::Float16)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Uint8 | DataType::Int8 | DataType::Int32 | DataType::Int64
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Float16 => "float16",
            DataType::Uint8 => "uint8",
            DataType::Int8 => "int8",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Boolean => "boolean",
            DataType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(DataType::Float32),
            "float64" | "f64" => Ok(DataType::Float64),
            "float16" | "f16" => Ok(DataType::Float16),
            "uint8" | "u8" => Ok(DataType::Uint8),
            "int8" | "i8" => Ok(DataType::Int8),
            "int32" | "i32" => Ok(DataType::Int32),
            "int64" | "i64" => Ok(DataType::Int64),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "unknown" => Ok(DataType::Unknown),
            other => Err(format!("unknown data type: {}", other)),
        }
    }
}

/// Target device of a manager. Opaque to the manager itself: it is recorded
/// and handed down to arrays, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    #[default]
    Cpu,
    Gpu(usize),
}

impl Device {
    pub fn cpu() -> Self {
        Device::Cpu
    }

    pub fn gpu(id: usize) -> Self {
        Device::Gpu(id)
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Gpu(_))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu()"),
            Device::Gpu(id) => write!(f, "gpu({})", id),
        }
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "cpu" || s == "cpu()" {
            return Ok(Device::Cpu);
        }
        if s == "gpu" || s == "cuda" {
            return Ok(Device::Gpu(0));
        }

        let id = s
            .strip_prefix("gpu(")
            .and_then(|rest| rest.strip_suffix(')'))
            .or_else(|| s.strip_prefix("cuda:"))
            .or_else(|| s.strip_prefix("gpu:"))
            .ok_or_else(|| format!("invalid device: {}", s))?;

        id.parse()
            .map(Device::Gpu)
            .map_err(|_| format!("invalid device id: {}", id))
    }
}

impl TryFrom<String> for Device {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Self { dims: dims.to_vec() }
    }

    /// The shape of a single value.
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Total element count. A scalar shape holds one element.
    /// Saturates at `usize::MAX` when the count does not fit.
    pub fn size(&self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    /// Total element count, or `None` if it overflows `usize`.
    pub fn checked_size(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    pub fn dim(&self, idx: usize) -> Option<usize> {
        self.dims.get(idx).copied()
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::from_slice(&dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ")")
    }
}
