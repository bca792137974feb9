//! Conversions between DLR arrays and `candle_core` tensors.

use crate::core::{DataType, DlrError, NativeBuffer, Result, Shape};
use crate::engine::{DlrArray, DlrManager};
use candle_core::{DType, Tensor};

pub fn data_type_of(dtype: DType) -> DataType {
    match dtype {
        DType::F32 => DataType::Float32,
        DType::F64 => DataType::Float64,
        DType::F16 => DataType::Float16,
        DType::U8 => DataType::Uint8,
        DType::I64 => DataType::Int64,
        _ => DataType::Unknown,
    }
}

impl DlrArray {
    /// Copies the array into a CPU candle tensor of the same dims.
    pub fn to_candle(&self) -> Result<Tensor> {
        let data = self.to_float_vec()?;
        let tensor = Tensor::from_vec(data, self.shape().dims().to_vec(), &candle_core::Device::Cpu)?;
        Ok(tensor)
    }
}

impl DlrManager {
    /// Copies an F32 candle tensor into a new array owned by this manager.
    pub fn from_candle(&self, tensor: &Tensor) -> Result<DlrArray> {
        let data_type = data_type_of(tensor.dtype());
        if data_type != DataType::Float32 {
            return Err(DlrError::UnsupportedElementType(data_type));
        }
        let shape = Shape::from_slice(tensor.dims());
        let data = tensor.flatten_all()?.to_vec1::<f32>()?;
        self.create(NativeBuffer::Float(data), shape, DataType::Float32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DlrConfig, DlrEngine};

    #[test]
    fn test_to_candle() {
        let engine = DlrEngine::new(DlrConfig::new());
        let manager = engine.new_base_manager().unwrap();
        let array = manager
            .create_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(vec![2, 3]))
            .unwrap();
        let tensor = array.to_candle().unwrap();
        assert_eq!(tensor.dims(), &[2, 3]);
        assert_eq!(tensor.dtype(), DType::F32);
        assert_eq!(
            tensor.flatten_all().unwrap().to_vec1::<f32>().unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_from_candle() {
        let engine = DlrEngine::new(DlrConfig::new());
        let manager = engine.new_base_manager().unwrap();
        let tensor = Tensor::ones((3, 2), DType::F32, &candle_core::Device::Cpu).unwrap();
        let array = manager.from_candle(&tensor).unwrap();
        assert_eq!(array.shape().dims(), &[3, 2]);
        assert_eq!(array.to_float_vec().unwrap(), vec![1.0; 6]);
        assert!(manager.contains(array.uid()));
    }

    #[test]
    fn test_from_candle_rejects_other_types() {
        let engine = DlrEngine::new(DlrConfig::new());
        let manager = engine.new_base_manager().unwrap();
        let tensor = Tensor::zeros(4, DType::U8, &candle_core::Device::Cpu).unwrap();
        let err = manager.from_candle(&tensor).unwrap_err();
        assert!(matches!(err, DlrError::UnsupportedElementType(DataType::Uint8)));
    }

    #[test]
    fn test_released_array_to_candle_fails() {
        let engine = DlrEngine::new(DlrConfig::new());
        let manager = engine.new_base_manager().unwrap();
        let array = manager.scalar(1.0).unwrap();
        array.close();
        assert!(matches!(array.to_candle(), Err(DlrError::ResourceClosed(_))));
    }
}
