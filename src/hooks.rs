//! Extension hook chain: ordered callbacks around a component's
//! injection-completion point.
//!
//! Hooks may observe or replace the instance right after construction and
//! injection. The proxy weaver is itself a hook (see [`crate::proxy`]), which
//! is how interception proxies enter the resolution pipeline.

use std::sync::Arc;

use crate::container::Container;
use crate::descriptor::{ComponentDescriptor, Instance};

/// A callback invoked around a component's injection-completion point.
///
/// Both phases receive the current instance and may return a replacement.
/// Returning `None` is an explicit stop signal: the remainder of the chain is
/// skipped for that phase and the current instance stands. It is not an
/// error, and a hook can never abort a resolution.
///
/// # Examples
///
/// ```rust
/// use corewire::{Container, ComponentDescriptor, Instance, LifecycleHook};
/// use std::sync::Arc;
///
/// struct Audit;
///
/// impl LifecycleHook for Audit {
///     fn after_completion(
///         &self,
///         instance: &Instance,
///         descriptor: &ComponentDescriptor,
///         _container: &Container,
///     ) -> Option<Instance> {
///         println!("built {}", descriptor.name());
///         Some(instance.clone())
///     }
/// }
///
/// let container = Container::new();
/// container.add_hook(Arc::new(Audit));
/// ```
pub trait LifecycleHook: Send + Sync {
    /// Runs before the post-completion phase, immediately after injection.
    fn before_completion(
        &self,
        instance: &Instance,
        descriptor: &ComponentDescriptor,
        container: &Container,
    ) -> Option<Instance> {
        let _ = (descriptor, container);
        Some(instance.clone())
    }

    /// Runs after the pre-completion phase; the last hook's return value
    /// supersedes the original instance.
    fn after_completion(
        &self,
        instance: &Instance,
        descriptor: &ComponentDescriptor,
        container: &Container,
    ) -> Option<Instance> {
        let _ = (descriptor, container);
        Some(instance.clone())
    }
}

/// The active, ordered hook chain. Rebuilt fresh on every container refresh.
pub(crate) struct HookChain {
    hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl HookChain {
    pub(crate) fn new(hooks: Vec<Arc<dyn LifecycleHook>>) -> Self {
        Self { hooks }
    }

    pub(crate) fn run_before(
        &self,
        instance: Instance,
        descriptor: &ComponentDescriptor,
        container: &Container,
    ) -> Instance {
        Self::run(&self.hooks, instance, |hook, current| {
            hook.before_completion(current, descriptor, container)
        })
    }

    pub(crate) fn run_after(
        &self,
        instance: Instance,
        descriptor: &ComponentDescriptor,
        container: &Container,
    ) -> Instance {
        Self::run(&self.hooks, instance, |hook, current| {
            hook.after_completion(current, descriptor, container)
        })
    }

    fn run(
        hooks: &[Arc<dyn LifecycleHook>],
        mut instance: Instance,
        phase: impl Fn(&dyn LifecycleHook, &Instance) -> Option<Instance>,
    ) -> Instance {
        for hook in hooks {
            match phase(hook.as_ref(), &instance) {
                Some(next) => instance = next,
                None => break,
            }
        }
        instance
    }
}
