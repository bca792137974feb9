use super::manager::DlrManager;
use crate::core::{DataType, Device, DlrError, Resource, Result, Shape};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A fixed-shape float32 buffer owned by a [`DlrManager`].
///
/// The buffer lives until the array is closed, or until its owning manager
/// is closed, whichever comes first. After that every read fails with
/// [`DlrError::ResourceClosed`].
pub struct DlrArray {
    state: Arc<ArrayState>,
}

struct ArrayState {
    uid: String,
    shape: Shape,
    device: Device,
    data: Mutex<Option<Vec<f32>>>,
    manager: Mutex<DlrManager>,
}

impl DlrArray {
    /// Callers guarantee `data.len() == shape.size()`.
    pub(crate) fn new(manager: &DlrManager, data: Vec<f32>, shape: Shape) -> Self {
        debug_assert_eq!(data.len(), shape.size());
        Self {
            state: Arc::new(ArrayState {
                uid: Uuid::new_v4().to_string(),
                shape,
                device: manager.device(),
                data: Mutex::new(Some(data)),
                manager: Mutex::new(manager.clone()),
            }),
        }
    }

    pub(crate) fn resource(&self) -> Arc<dyn Resource> {
        self.state.clone()
    }

    pub fn uid(&self) -> &str {
        &self.state.uid
    }

    pub fn shape(&self) -> &Shape {
        &self.state.shape
    }

    pub fn size(&self) -> usize {
        self.state.shape.size()
    }

    pub fn data_type(&self) -> DataType {
        DataType::Float32
    }

    pub fn device(&self) -> Device {
        self.state.device
    }

    /// The manager that currently owns this array.
    pub fn manager(&self) -> DlrManager {
        self.state.manager.lock().clone()
    }

    pub fn is_released(&self) -> bool {
        self.state.data.lock().is_none()
    }

    pub fn to_float_vec(&self) -> Result<Vec<f32>> {
        self.state
            .data
            .lock()
            .as_ref()
            .cloned()
            .ok_or_else(|| DlrError::ResourceClosed(self.state.uid.clone()))
    }

    /// Native-endian bytes of the stored values.
    pub fn to_byte_vec(&self) -> Result<Vec<u8>> {
        let data = self.state.data.lock();
        let values = data
            .as_ref()
            .ok_or_else(|| DlrError::ResourceClosed(self.state.uid.clone()))?;
        Ok(bytemuck::cast_slice::<f32, u8>(values).to_vec())
    }

    /// Hands the array to `manager` and returns the manager that owned it
    /// before.
    pub fn attach(&self, manager: &DlrManager) -> Result<DlrManager> {
        let previous = self.manager();
        if previous == *manager {
            return Ok(previous);
        }
        manager.attach(self.uid().to_string(), self.resource())?;
        *self.state.manager.lock() = manager.clone();
        previous.detach(self.uid());
        Ok(previous)
    }

    /// Removes the array from its manager's care and returns that manager.
    /// The array moves to the root of the tree, which does not track it, so
    /// it lives as long as this handle.
    pub fn detach(&self) -> Result<DlrManager> {
        let root = self.manager().root();
        self.attach(&root)
    }

    /// Releases the buffer and stops the owner from tracking the array.
    pub fn close(&self) {
        self.state.release();
        self.manager().detach(self.uid());
    }
}

impl ArrayState {
    fn release(&self) {
        if self.data.lock().take().is_some() {
            tracing::trace!("Released array {} {}", self.uid, self.shape);
        }
    }
}

impl Resource for ArrayState {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn close(&self) {
        self.release();
    }
}

impl fmt::Debug for DlrArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DlrArray")
            .field("uid", &self.state.uid)
            .field("shape", &self.state.shape)
            .field("device", &self.state.device)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DlrManager, DlrManager) {
        let root = DlrManager::new_root(Device::Cpu);
        let manager = root.new_sub_manager().unwrap();
        (root, manager)
    }

    #[test]
    fn test_array_metadata() {
        let (_root, manager) = tree();
        let array = manager.zeros(Shape::new(vec![2, 3]), DataType::Float32).unwrap();
        assert_eq!(array.size(), 6);
        assert_eq!(array.data_type(), DataType::Float32);
        assert_eq!(array.device(), Device::Cpu);
        assert_eq!(array.manager(), manager);
        assert!(manager.contains(array.uid()));
    }

    #[test]
    fn test_to_byte_vec() {
        let (_root, manager) = tree();
        let array = manager.create_from_slice(&[1.0, 2.0], Shape::new(vec![2])).unwrap();
        let bytes = array.to_byte_vec().unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytemuck::pod_collect_to_vec::<u8, f32>(&bytes), vec![1.0, 2.0]);
    }

    #[test]
    fn test_close_releases_and_detaches() {
        let (_root, manager) = tree();
        let array = manager.ones(Shape::new(vec![4]), DataType::Float32).unwrap();
        array.close();
        assert!(array.is_released());
        assert!(!manager.contains(array.uid()));
        assert!(matches!(array.to_float_vec(), Err(DlrError::ResourceClosed(_))));
        assert!(array.to_byte_vec().is_err());
        array.close();
    }

    #[test]
    fn test_released_with_manager() {
        let (_root, manager) = tree();
        let array = manager.ones(Shape::new(vec![4]), DataType::Float32).unwrap();
        manager.close();
        assert!(array.is_released());
    }

    #[test]
    fn test_attach_moves_ownership() {
        let (root, first) = tree();
        let second = root.new_sub_manager().unwrap();
        let array = first.zeros(Shape::new(vec![2]), DataType::Float32).unwrap();

        let previous = array.attach(&second).unwrap();
        assert_eq!(previous, first);
        assert_eq!(array.manager(), second);
        assert!(!first.contains(array.uid()));
        assert!(second.contains(array.uid()));

        first.close();
        assert!(!array.is_released());
        second.close();
        assert!(array.is_released());
    }

    #[test]
    fn test_attach_to_same_manager() {
        let (_root, manager) = tree();
        let array = manager.zeros(Shape::new(vec![2]), DataType::Float32).unwrap();
        assert_eq!(array.attach(&manager).unwrap(), manager);
        assert!(manager.contains(array.uid()));
    }

    #[test]
    fn test_attach_to_closed_manager_fails() {
        let (root, manager) = tree();
        let closed = root.new_sub_manager().unwrap();
        closed.close();
        let array = manager.zeros(Shape::new(vec![2]), DataType::Float32).unwrap();
        assert!(matches!(array.attach(&closed), Err(DlrError::ManagerClosed(_))));
        assert_eq!(array.manager(), manager);
        assert!(manager.contains(array.uid()));
    }

    #[test]
    fn test_detach_survives_manager_close() {
        let (root, manager) = tree();
        let array = manager.create_from_slice(&[3.0], Shape::new(vec![1])).unwrap();
        assert_eq!(array.detach().unwrap(), manager);
        assert_eq!(array.manager(), root);
        assert!(!manager.contains(array.uid()));
        manager.close();
        assert_eq!(array.to_float_vec().unwrap(), vec![3.0]);
    }
}
