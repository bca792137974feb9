use super::array::DlrArray;
use crate::core::{DataType, Device, DlrError, NativeBuffer, Resource, Result, Shape};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A node in the DLR ownership tree.
///
/// Every array is created by, and owned by, exactly one manager. Closing a
/// regular manager releases the arrays and sub-managers it owns and removes
/// it from its parent. The root manager (built by [`crate::DlrEngine`]) owns
/// nothing: its `attach`, `detach` and `close` do nothing, so arrays created
/// on it live until their handle is dropped.
///
/// `DlrManager` is a cheap handle; clones refer to the same node.
#[derive(Clone)]
pub struct DlrManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    uid: String,
    parent: Option<DlrManager>,
    device: Device,
    is_root: bool,
    closed: AtomicBool,
    resources: Mutex<IndexMap<String, Arc<dyn Resource>>>,
}

impl DlrManager {
    pub(crate) fn new_root(device: Device) -> Self {
        let manager = Self::build(None, device, true);
        tracing::debug!("Created root manager {} on {}", manager.uid(), device);
        manager
    }

    fn build(parent: Option<DlrManager>, device: Device, is_root: bool) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                uid: Uuid::new_v4().to_string(),
                parent,
                device,
                is_root,
                closed: AtomicBool::new(false),
                resources: Mutex::new(IndexMap::new()),
            }),
        }
    }

    pub fn uid(&self) -> &str {
        &self.inner.uid
    }

    pub fn device(&self) -> Device {
        self.inner.device
    }

    pub fn parent(&self) -> Option<&DlrManager> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_root
    }

    /// The root is open for as long as it exists.
    pub fn is_open(&self) -> bool {
        self.inner.is_root || !self.inner.closed.load(Ordering::Acquire)
    }

    /// Top of the tree this manager belongs to.
    pub fn root(&self) -> DlrManager {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current.clone()
    }

    /// Number of resources currently tracked. Always zero for the root.
    pub fn resource_count(&self) -> usize {
        self.inner.resources.lock().len()
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.inner.resources.lock().contains_key(resource_id)
    }

    pub fn new_sub_manager(&self) -> Result<DlrManager> {
        self.new_sub_manager_on(self.device())
    }

    pub fn new_sub_manager_on(&self, device: Device) -> Result<DlrManager> {
        self.ensure_open()?;
        let child = Self::build(Some(self.clone()), device, false);
        self.attach(child.uid().to_string(), child.inner.clone())?;
        tracing::debug!(
            "Created manager {} on {} under {}",
            child.uid(),
            device,
            self.uid()
        );
        Ok(child)
    }

    /// Runs `f` with a fresh sub-manager and closes it afterwards, whether or
    /// not `f` succeeded. Arrays `f` wants to keep must be attached elsewhere
    /// before it returns.
    pub fn with_sub_manager<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DlrManager) -> Result<T>,
    {
        let scope = self.new_sub_manager()?;
        let result = f(&scope);
        scope.close();
        result
    }

    /// Wraps `data` as an array of `shape`.
    ///
    /// `data_type` must be float32 unless `data` is already a float buffer,
    /// in which case the buffer is used as is regardless of `data_type`.
    pub fn create(&self, data: NativeBuffer, shape: Shape, data_type: DataType) -> Result<DlrArray> {
        if data_type != DataType::Float32 && !data.is_float() {
            return Err(DlrError::UnsupportedElementType(data_type));
        }
        self.ensure_open()?;
        let size = checked_size(&shape)?;
        let values = match data {
            NativeBuffer::Float(values) => values,
            NativeBuffer::Byte(bytes) => {
                if bytes.len() % std::mem::size_of::<f32>() != 0 {
                    return Err(DlrError::InvalidBufferLength { len: bytes.len() });
                }
                bytemuck::pod_collect_to_vec::<u8, f32>(&bytes)
            }
            other => return Err(DlrError::UnsupportedElementType(other.data_type())),
        };
        if values.len() != size {
            return Err(DlrError::ShapeMismatch {
                expected: shape,
                actual: values.len(),
            });
        }
        self.register(DlrArray::new(self, values, shape))
    }

    pub fn create_from_slice(&self, data: &[f32], shape: Shape) -> Result<DlrArray> {
        self.create(NativeBuffer::Float(data.to_vec()), shape, DataType::Float32)
    }

    pub fn scalar(&self, value: f32) -> Result<DlrArray> {
        self.full(Shape::scalar(), value, DataType::Float32)
    }

    pub fn zeros(&self, shape: Shape, data_type: DataType) -> Result<DlrArray> {
        self.full(shape, 0.0, data_type)
    }

    pub fn ones(&self, shape: Shape, data_type: DataType) -> Result<DlrArray> {
        self.full(shape, 1.0, data_type)
    }

    pub fn full(&self, shape: Shape, value: f32, data_type: DataType) -> Result<DlrArray> {
        if data_type != DataType::Float32 {
            return Err(DlrError::UnsupportedElementType(data_type));
        }
        self.ensure_open()?;
        let values = vec![value; checked_size(&shape)?];
        self.register(DlrArray::new(self, values, shape))
    }

    /// Starts tracking `resource` so it is closed with this manager.
    /// The root ignores this.
    pub fn attach(&self, resource_id: String, resource: Arc<dyn Resource>) -> Result<()> {
        if self.inner.is_root {
            return Ok(());
        }
        self.ensure_open()?;
        self.inner.resources.lock().insert(resource_id, resource);
        Ok(())
    }

    /// Stops tracking a resource without closing it. The root ignores this.
    pub fn detach(&self, resource_id: &str) {
        if self.inner.is_root {
            return;
        }
        self.inner.resources.lock().shift_remove(resource_id);
    }

    /// Closes every owned resource in attach order, then detaches from the
    /// parent. Calling it again does nothing; on the root it does nothing.
    pub fn close(&self) {
        self.inner.shutdown();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DlrError::ManagerClosed(self.uid().to_string()))
        }
    }

    fn register(&self, array: DlrArray) -> Result<DlrArray> {
        self.attach(array.uid().to_string(), array.resource())?;
        Ok(array)
    }
}

fn checked_size(shape: &Shape) -> Result<usize> {
    shape
        .checked_size()
        .ok_or_else(|| DlrError::ShapeTooLarge(shape.clone()))
}

impl ManagerInner {
    fn shutdown(&self) {
        if self.is_root || self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Drain first: children detach from us while closing.
        let resources: Vec<_> = self.resources.lock().drain(..).map(|(_, r)| r).collect();
        let released = resources.len();
        for resource in resources {
            resource.close();
        }

        if let Some(parent) = &self.parent {
            parent.detach(&self.uid);
        }
        tracing::debug!("Closed manager {} ({} resources released)", self.uid, released);
    }
}

impl Resource for ManagerInner {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn close(&self) {
        self.shutdown();
    }
}

impl PartialEq for DlrManager {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DlrManager {}

impl fmt::Debug for DlrManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DlrManager")
            .field("uid", &self.inner.uid)
            .field("device", &self.inner.device)
            .field("is_root", &self.inner.is_root)
            .field("open", &self.is_open())
            .field("resources", &self.resource_count())
            .finish()
    }
}
