//! Proxy engine: interface-based interception wrappers.
//!
//! Rust has no runtime proxy generation, so wrapping is a capability a
//! component opts into: its descriptor seals the instance behind a trait
//! surface and supplies a proxy factory that re-implements that surface
//! around an [`AdviceChain`]. The [`ProxyWeaverHook`] decides per component
//! whether to invoke the factory; when wrapping is not possible the original
//! instance is returned untouched, so interception is additive, never
//! load-bearing.

use std::any::Any;
use std::sync::Arc;

use crate::aspect::{AdviceFn, AdviceKind};
use crate::container::Container;
use crate::descriptor::{ComponentDescriptor, Instance};
use crate::hooks::LifecycleHook;

/// One intercepted call, as seen by an advice body.
pub struct Invocation<'a> {
    method: &'a str,
    returned: Option<&'a (dyn Any + 'static)>,
}

impl<'a> Invocation<'a> {
    /// The intercepted method's name.
    pub fn method(&self) -> &'a str {
        self.method
    }

    /// The raw returned value, present only for after-returning advice with a
    /// declared binding.
    pub fn returned(&self) -> Option<&'a (dyn Any + 'static)> {
        self.returned
    }

    /// The returned value downcast to its concrete type.
    pub fn returned_as<R: 'static>(&self) -> Option<&'a R> {
        self.returned.and_then(|value| value.downcast_ref::<R>())
    }
}

/// One advice bound to a target: the owning aspect instance plus the body.
pub(crate) struct BoundAdvice {
    pub(crate) owner: Instance,
    pub(crate) kind: AdviceKind,
    pub(crate) returning: Option<&'static str>,
    pub(crate) body: AdviceFn,
}

/// The ordered advice applying to one proxied component.
///
/// Proxy implementations route every intercepted method through
/// [`AdviceChain::invoke`], which runs BEFORE advice, the real call,
/// AFTER_RETURNING advice with the returned value, then AFTER advice.
pub struct AdviceChain {
    entries: Vec<BoundAdvice>,
}

impl AdviceChain {
    pub(crate) fn new(entries: Vec<BoundAdvice>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Runs `call` with the full advice pipeline around it.
    ///
    /// Every return is a normal return in Rust's value model, so
    /// AFTER_RETURNING sees whatever `call` produced (including an `Err` or
    /// `None` value), and AFTER always runs last.
    pub fn invoke<R, F>(&self, method: &str, call: F) -> R
    where
        R: 'static,
        F: FnOnce() -> R,
    {
        for entry in self.of_kind(AdviceKind::Before) {
            let invocation = Invocation { method, returned: None };
            (entry.body)(entry.owner.as_ref(), &invocation);
        }

        let result = call();

        for entry in self.of_kind(AdviceKind::AfterReturning) {
            let returned: Option<&dyn Any> =
                entry.returning.map(|_| &result as &dyn Any);
            let invocation = Invocation { method, returned };
            (entry.body)(entry.owner.as_ref(), &invocation);
        }

        for entry in self.of_kind(AdviceKind::After) {
            let invocation = Invocation { method, returned: None };
            (entry.body)(entry.owner.as_ref(), &invocation);
        }

        result
    }

    fn of_kind(&self, kind: AdviceKind) -> impl Iterator<Item = &BoundAdvice> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

/// Builds an interception wrapper for a matched component, or declines.
///
/// Receives the sealed instance and the bound advice; returns `None` when
/// the instance does not expose the expected surface.
pub type ProxyFactory =
    Arc<dyn Fn(&Instance, Arc<AdviceChain>) -> Option<Instance> + Send + Sync>;

/// Adapts a trait-surfaced component into a [`ProxyFactory`].
///
/// `wrap` receives the target's `Arc<dyn Trait>` surface and the advice
/// chain and returns the proxy as the same surface, so the stored type
/// identity is unchanged and dependents keep downcasting to `Arc<S>`.
///
/// # Examples
///
/// ```rust
/// use corewire::{surface_proxy, AdviceChain};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct GreeterProxy {
///     target: Arc<dyn Greeter>,
///     chain: Arc<AdviceChain>,
/// }
///
/// impl Greeter for GreeterProxy {
///     fn greet(&self) -> String {
///         self.chain.invoke("greet", || self.target.greet())
///     }
/// }
///
/// let factory = surface_proxy::<dyn Greeter, _>(|target, chain| {
///     Arc::new(GreeterProxy { target, chain })
/// });
/// # let _ = factory;
/// ```
pub fn surface_proxy<S, F>(wrap: F) -> ProxyFactory
where
    S: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<S>, Arc<AdviceChain>) -> Arc<S> + Send + Sync + 'static,
{
    Arc::new(move |instance: &Instance, chain: Arc<AdviceChain>| {
        let surface = instance.downcast_ref::<Arc<S>>()?;
        Some(Arc::new(wrap(surface.clone(), chain)) as Instance)
    })
}

/// The extension hook that weaves interception proxies after injection.
///
/// Appended to the hook chain as its final entry on every refresh, so a
/// proxy wraps whatever instance the user hooks settled on.
pub struct ProxyWeaverHook;

impl LifecycleHook for ProxyWeaverHook {
    fn after_completion(
        &self,
        instance: &Instance,
        descriptor: &ComponentDescriptor,
        container: &Container,
    ) -> Option<Instance> {
        Some(wrap(container, descriptor, instance))
    }
}

/// Decides whether a freshly built component gets wrapped. Aspects are never
/// advised, an unmatched target passes through, and a target without a
/// workable proxy factory falls back to the original instance.
pub(crate) fn wrap(
    container: &Container,
    descriptor: &ComponentDescriptor,
    instance: &Instance,
) -> Instance {
    let aspects = container.aspects();

    if descriptor.is_aspect() || aspects.is_aspect_type(descriptor.type_name()) {
        return instance.clone();
    }
    if !aspects.matches(descriptor.type_name()) {
        return instance.clone();
    }

    let chain = aspects.chain_for(descriptor.type_name());
    if chain.is_empty() {
        return instance.clone();
    }

    let Some(factory) = descriptor.proxy_factory() else {
        return instance.clone();
    };
    match factory(instance, Arc::new(chain)) {
        Some(proxied) => {
            tracing::debug!(component = descriptor.name(), "wove interception proxy");
            proxied
        }
        None => instance.clone(),
    }
}
