use super::tensor::DataType;

/// Caller-supplied array data, tagged by the kind of storage backing it.
///
/// Only `Float` counts as a float-backed buffer: a manager will wrap it no
/// matter which element type the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeBuffer {
    Float(Vec<f32>),
    Double(Vec<f64>),
    Byte(Vec<u8>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

impl NativeBuffer {
    pub fn is_float(&self) -> bool {
        matches!(self, NativeBuffer::Float(_))
    }

    /// Element type naturally stored by this kind of buffer.
    pub fn data_type(&self) -> DataType {
        match self {
            NativeBuffer::Float(_) => DataType::Float32,
            NativeBuffer::Double(_) => DataType::Float64,
            NativeBuffer::Byte(_) => DataType::Uint8,
            NativeBuffer::Int(_) => DataType::Int32,
            NativeBuffer::Long(_) => DataType::Int64,
        }
    }

    /// Number of stored values (bytes for `Byte`).
    pub fn len(&self) -> usize {
        match self {
            NativeBuffer::Float(v) => v.len(),
            NativeBuffer::Double(v) => v.len(),
            NativeBuffer::Byte(v) => v.len(),
            NativeBuffer::Int(v) => v.len(),
            NativeBuffer::Long(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f32>> for NativeBuffer {
    fn from(data: Vec<f32>) -> Self {
        NativeBuffer::Float(data)
    }
}

impl From<Vec<f64>> for NativeBuffer {
    fn from(data: Vec<f64>) -> Self {
        NativeBuffer::Double(data)
    }
}

impl From<Vec<u8>> for NativeBuffer {
    fn from(data: Vec<u8>) -> Self {
        NativeBuffer::Byte(data)
    }
}

impl From<Vec<i32>> for NativeBuffer {
    fn from(data: Vec<i32>) -> Self {
        NativeBuffer::Int(data)
    }
}

impl From<Vec<i64>> for NativeBuffer {
    fn from(data: Vec<i64>) -> Self {
        NativeBuffer::Long(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_float_kind_is_float() {
        assert!(NativeBuffer::from(vec![1.0f32]).is_float());
        assert!(!NativeBuffer::from(vec![1.0f64]).is_float());
        assert!(!NativeBuffer::from(vec![1u8]).is_float());
        assert!(!NativeBuffer::from(vec![1i32]).is_float());
    }

    #[test]
    fn test_buffer_data_type() {
        assert_eq!(NativeBuffer::Byte(vec![0; 8]).data_type(), DataType::Uint8);
        assert_eq!(NativeBuffer::Long(vec![]).data_type(), DataType::Int64);
        assert_eq!(NativeBuffer::Byte(vec![0; 8]).len(), 8);
        assert!(NativeBuffer::Int(vec![]).is_empty());
    }
}
