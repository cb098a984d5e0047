//! Descriptor registry: the name-keyed map of everything the container can build.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::ComponentDescriptor;
use crate::error::{CoreError, CoreResult};

/// One-to-one map from component name to descriptor.
///
/// Registration order is preserved for enumeration and eager initialization.
/// Registering a second descriptor under an existing name fails; the first
/// registration stays intact.
#[derive(Default)]
pub struct DescriptorRegistry {
    by_name: HashMap<String, Arc<ComponentDescriptor>>,
    order: Vec<String>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its declared name.
    ///
    /// Fails with [`CoreError::InvalidRegistration`] on an empty name or a
    /// duplicate definition.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> CoreResult<()> {
        let name = descriptor.name().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidRegistration(
                "component name must not be empty".to_string(),
            ));
        }
        if self.by_name.contains_key(&name) {
            return Err(CoreError::InvalidRegistration(format!(
                "duplicate definition for component '{}'",
                name
            )));
        }
        self.order.push(name.clone());
        self.by_name.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        self.by_name.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Total number of registered descriptors.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All descriptors whose stored type identity matches `type_id`, in
    /// registration order. The caller decides how to treat zero or many.
    pub fn candidates_for(&self, type_id: TypeId) -> Vec<Arc<ComponentDescriptor>> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .filter(|d| d.type_id() == type_id)
            .cloned()
            .collect()
    }
}
