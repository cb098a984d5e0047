//! The container: descriptor registry, resolution engine, and lifecycle.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::aspect::AspectRegistry;
use crate::cache::InstanceCache;
use crate::descriptor::{ComponentDescriptor, DependencyRef, Instance};
use crate::error::{CoreError, CoreResult};
use crate::hooks::{HookChain, LifecycleHook};
use crate::internal::ChainGuard;
use crate::proxy::ProxyWeaverHook;
use crate::registry::DescriptorRegistry;

/// Object-lifecycle container.
///
/// Owns the descriptor registry, the shared-instance cache, the extension
/// hook chain, and the aspect registry as plain fields, with no global state,
/// so multiple independent containers can coexist in one process and every
/// test can build a fresh one.
///
/// # Thread safety
///
/// `refresh`/`close` are serialized by a coarse lifecycle lock and must not
/// race each other. After initialization, `get_component` is safe under
/// concurrent callers: the first creator of a shared component to reach the
/// cache wins, and a concurrent racer's redundant instance is discarded in
/// its favor (benign duplicate work, never a second live instance).
///
/// # Examples
///
/// ```rust
/// use corewire::{ComponentDescriptor, Container, DependencyRef};
/// use std::sync::Arc;
///
/// struct Settings { url: String }
/// struct Repository { settings: Arc<Settings> }
///
/// let container = Container::new();
/// container.register(
///     ComponentDescriptor::shared::<Settings>("settings")
///         .construct_with(|| Settings { url: "postgres://localhost".to_string() })
///         .build()
///         .unwrap(),
/// ).unwrap();
/// container.register(
///     ComponentDescriptor::shared::<Repository>("repository")
///         .constructor(vec![DependencyRef::by_name("settings")], |args| {
///             Ok(Repository { settings: args.get::<Settings>(0)? })
///         })
///         .build()
///         .unwrap(),
/// ).unwrap();
/// container.refresh().unwrap();
///
/// let repository = container.get_component_as::<Repository>("repository").unwrap();
/// assert_eq!(repository.settings.url, "postgres://localhost");
/// ```
pub struct Container {
    registry: RwLock<DescriptorRegistry>,
    instances: InstanceCache,
    registered_hooks: RwLock<Vec<Arc<dyn LifecycleHook>>>,
    chain: RwLock<Arc<HookChain>>,
    aspects: AspectRegistry,
    lifecycle: Mutex<()>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(DescriptorRegistry::new()),
            instances: InstanceCache::new(),
            registered_hooks: RwLock::new(Vec::new()),
            chain: RwLock::new(Arc::new(HookChain::new(vec![Arc::new(ProxyWeaverHook)]))),
            aspects: AspectRegistry::new(),
            lifecycle: Mutex::new(()),
        }
    }

    // ----- Registration surface -----

    /// Registers a descriptor under its declared name.
    ///
    /// Fails with [`CoreError::InvalidRegistration`] for a duplicate or
    /// malformed registration; the first registration stays intact.
    pub fn register(&self, descriptor: ComponentDescriptor) -> CoreResult<()> {
        self.registry.write().register(descriptor)
    }

    /// Registers an extension hook. Takes effect when the chain is rebuilt at
    /// the next [`refresh`](Container::refresh).
    pub fn add_hook(&self, hook: Arc<dyn LifecycleHook>) {
        self.registered_hooks.write().push(hook);
    }

    // ----- Lifecycle -----

    /// Initializes the container: rebuilds the hook chain, rebuilds the
    /// aspect registry, and eagerly creates every non-lazy shared component
    /// in registration order.
    ///
    /// Not safe to call concurrently with itself or [`close`](Container::close).
    pub fn refresh(&self) -> CoreResult<()> {
        let _lifecycle = self.lifecycle.lock();
        tracing::debug!("container refresh started");

        self.instances.clear();

        {
            let mut hooks = self.registered_hooks.read().clone();
            hooks.push(Arc::new(ProxyWeaverHook) as Arc<dyn LifecycleHook>);
            *self.chain.write() = Arc::new(HookChain::new(hooks));
        }

        self.aspects.build(self)?;

        for name in self.all_names() {
            let Some(descriptor) = self.descriptor_of(&name) else { continue };
            if descriptor.is_shared() && !descriptor.is_lazy() {
                self.resolve(&name)?;
            }
        }

        tracing::debug!(components = self.descriptor_count(), "container refresh finished");
        Ok(())
    }

    /// Tears the container down: drops all cached instances and aspect state.
    /// Descriptors stay registered; a later `refresh` starts clean.
    pub fn close(&self) {
        let _lifecycle = self.lifecycle.lock();
        self.instances.clear();
        self.aspects.clear();
        tracing::debug!("container closed");
    }

    // ----- Resolution surface -----

    /// Resolves a component by name.
    pub fn get_component(&self, name: &str) -> CoreResult<Instance> {
        self.resolve(name)
    }

    /// Resolves a component by name and downcasts it to the expected type.
    ///
    /// Fails with [`CoreError::TypeMismatch`] when the live instance is not
    /// of type `T`. Components sealed behind a trait surface are requested as
    /// `Arc<dyn Trait + Send + Sync>`.
    pub fn get_component_as<T: Send + Sync + 'static>(&self, name: &str) -> CoreResult<Arc<T>> {
        let instance = self.resolve(name)?;
        instance.downcast::<T>().map_err(|_| CoreError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Resolves the unique component whose stored type is `T`.
    ///
    /// Zero matches fail with [`CoreError::NotFoundByType`]; more than one
    /// fails with [`CoreError::Ambiguous`] carrying the candidate names.
    pub fn get_component_by_type<T: Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let name = self.unique_name_of_type(TypeId::of::<T>(), std::any::type_name::<T>())?;
        self.get_component_as::<T>(&name)
    }

    /// Builds a component from an ad hoc descriptor, bypassing the registry.
    ///
    /// The full pipeline runs (constructor plan, injection, hooks, proxy
    /// weaving), but the result is never cached regardless of its policy.
    pub fn create_component(&self, descriptor: &ComponentDescriptor) -> CoreResult<Instance> {
        let _guard = ChainGuard::enter(descriptor.name())?;
        self.create_from(descriptor)
    }

    // ----- Introspection surface -----

    pub fn has_component(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// Whether the named component uses the shared policy.
    pub fn is_shared(&self, name: &str) -> CoreResult<bool> {
        self.descriptor_of(name)
            .map(|d| d.is_shared())
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    /// Whether the named component uses the per-request policy.
    pub fn is_per_request(&self, name: &str) -> CoreResult<bool> {
        self.descriptor_of(name)
            .map(|d| d.is_per_request())
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    /// The stored type identity of the named component, if registered.
    pub fn type_of(&self, name: &str) -> Option<TypeId> {
        self.descriptor_of(name).map(|d| d.type_id())
    }

    /// The stored type name of the named component, if registered.
    pub fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.descriptor_of(name).map(|d| d.type_name())
    }

    pub fn descriptor_of(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        self.registry.read().get(name)
    }

    /// All registered names, in registration order.
    pub fn all_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn descriptor_count(&self) -> usize {
        self.registry.read().len()
    }

    pub(crate) fn aspects(&self) -> &AspectRegistry {
        &self.aspects
    }

    // ----- Resolution engine -----

    fn resolve(&self, name: &str) -> CoreResult<Instance> {
        // Fast path: fully-initialized shared instance.
        if let Some(existing) = self.instances.get(name) {
            return Ok(existing);
        }

        let descriptor = self
            .descriptor_of(name)
            .ok_or_else(|| CoreError::NotFound(name.to_string()))?;

        let created = {
            // Re-entry check happens here, before any recursive call.
            let _guard = ChainGuard::enter(name)?;
            self.create_from(&descriptor)?
            // Guard drops: the tracker frame never leaks, also on failure.
        };

        if descriptor.is_shared() {
            // First write wins; a concurrent creator's duplicate is discarded.
            Ok(self.instances.store(name, created))
        } else {
            Ok(created)
        }
    }

    /// Runs the creation pipeline, wrapping failures as a creation error.
    ///
    /// Circular and depth failures pass through unwrapped so the top-level
    /// caller receives the full chain rather than a nested wrapper per level.
    fn create_from(&self, descriptor: &ComponentDescriptor) -> CoreResult<Instance> {
        self.try_create(descriptor).map_err(|cause| match cause {
            CoreError::Circular(_) | CoreError::DepthExceeded(_) => cause,
            other => CoreError::CreationFailed {
                name: descriptor.name().to_string(),
                source: Box::new(other),
            },
        })
    }

    fn try_create(&self, descriptor: &ComponentDescriptor) -> CoreResult<Instance> {
        tracing::trace!(component = descriptor.name(), "creating component");

        let mut args = Vec::with_capacity(descriptor.constructor_plan().len());
        for dependency in descriptor.constructor_plan() {
            args.push(self.resolve_dependency(dependency)?);
        }
        let mut partial = (descriptor.ctor())(args)?;

        for target in descriptor.injection_targets() {
            match self.resolve_dependency(target.dependency()) {
                Ok(dependency) => (target.setter())(partial.as_mut(), dependency)?,
                Err(cause) if target.required() => return Err(cause),
                // Optional and unresolved: member stays unset.
                Err(_) => {}
            }
        }

        let instance = (descriptor.seal())(partial);

        let chain = self.chain.read().clone();
        let instance = chain.run_before(instance, descriptor, self);
        let instance = chain.run_after(instance, descriptor, self);
        Ok(instance)
    }

    fn resolve_dependency(&self, dependency: &DependencyRef) -> CoreResult<Instance> {
        match dependency {
            DependencyRef::ByName(name) => self.resolve(name),
            DependencyRef::ByType(type_id, type_name) => {
                let name = self.unique_name_of_type(*type_id, type_name)?;
                self.resolve(&name)
            }
        }
    }

    fn unique_name_of_type(&self, type_id: TypeId, type_name: &'static str) -> CoreResult<String> {
        let candidates = self.registry.read().candidates_for(type_id);
        match candidates.len() {
            0 => Err(CoreError::NotFoundByType(type_name)),
            1 => Ok(candidates[0].name().to_string()),
            count => Err(CoreError::Ambiguous {
                type_name,
                count,
                candidates: candidates.iter().map(|d| d.name().to_string()).collect(),
            }),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
