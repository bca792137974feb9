mod array;
mod manager;

pub use array::DlrArray;
pub use manager::DlrManager;

use crate::core::{Device, Result};
use crate::envconfig::DlrConfig;

pub const ENGINE_NAME: &str = "DLR";

/// Process-wide DLR state. Build one at startup and hand it (or its root
/// manager) to whoever needs to create arrays.
pub struct DlrEngine {
    config: DlrConfig,
    root: DlrManager,
}

impl DlrEngine {
    pub fn new(config: DlrConfig) -> Self {
        let root = DlrManager::new_root(config.default_device);
        tracing::info!("{} engine initialized on {}", ENGINE_NAME, config.default_device);
        Self { config, root }
    }

    pub fn from_env() -> Self {
        Self::new(DlrConfig::from_env())
    }

    pub fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    pub fn config(&self) -> &DlrConfig {
        &self.config
    }

    pub fn default_device(&self) -> Device {
        self.config.default_device
    }

    /// The parentless manager at the top of the tree. It never tracks or
    /// releases anything.
    pub fn root_manager(&self) -> &DlrManager {
        &self.root
    }

    pub fn new_base_manager(&self) -> Result<DlrManager> {
        self.root.new_sub_manager()
    }

    pub fn new_base_manager_on(&self, device: Device) -> Result<DlrManager> {
        self.root.new_sub_manager_on(device)
    }
}

impl Default for DlrEngine {
    fn default() -> Self {
        Self::new(DlrConfig::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Shape};

    #[test]
    fn test_engine_root() {
        let engine = DlrEngine::new(DlrConfig::new().with_default_device(Device::Gpu(0)));
        let root = engine.root_manager();
        assert!(root.is_root());
        assert!(root.parent().is_none());
        assert_eq!(root.device(), Device::Gpu(0));
        assert_eq!(engine.name(), "DLR");
    }

    #[test]
    fn test_base_managers() {
        let engine = DlrEngine::default();
        let base = engine.new_base_manager().unwrap();
        assert_eq!(base.parent(), Some(engine.root_manager()));
        assert_eq!(base.device(), engine.default_device());

        let gpu = engine.new_base_manager_on(Device::Gpu(2)).unwrap();
        assert_eq!(gpu.device(), Device::Gpu(2));
        let array = gpu.zeros(Shape::new(vec![1]), DataType::Float32).unwrap();
        assert_eq!(array.device(), Device::Gpu(2));
    }
}
