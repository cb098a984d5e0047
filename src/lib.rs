//! # corewire
//!
//! A name-keyed component lifecycle container with dependency injection and
//! aspect weaving.
//!
//! Components are described ahead of time by [`ComponentDescriptor`]s: the
//! declared name, the stored type, the sharing policy, an ordered constructor
//! plan, and the members to populate after construction. The [`Container`]
//! resolves descriptors into live instances, caches shared ones, detects
//! circular dependencies with the full chain in the error, and runs an
//! extension hook pipeline that can replace instances on their way out. When
//! aspects are registered, matched components sealed behind a trait surface
//! get wrapped in interception proxies.
//!
//! ## Quick start
//!
//! ```rust
//! use corewire::{ComponentDescriptor, Container, DependencyRef};
//! use std::sync::Arc;
//!
//! struct Settings {
//!     greeting: String,
//! }
//!
//! struct Greeter {
//!     settings: Arc<Settings>,
//! }
//!
//! impl Greeter {
//!     fn greet(&self, who: &str) -> String {
//!         format!("{}, {}!", self.settings.greeting, who)
//!     }
//! }
//!
//! fn main() -> Result<(), corewire::CoreError> {
//!     let container = Container::new();
//!
//!     container.register(
//!         ComponentDescriptor::shared::<Settings>("settings")
//!             .construct_with(|| Settings { greeting: "Hello".to_string() })
//!             .build()?,
//!     )?;
//!     container.register(
//!         ComponentDescriptor::shared::<Greeter>("greeter")
//!             .constructor(vec![DependencyRef::by_name("settings")], |args| {
//!                 Ok(Greeter { settings: args.get::<Settings>(0)? })
//!             })
//!             .build()?,
//!     )?;
//!
//!     container.refresh()?;
//!
//!     let greeter = container.get_component_as::<Greeter>("greeter")?;
//!     assert_eq!(greeter.greet("world"), "Hello, world!");
//!     Ok(())
//! }
//! ```
//!
//! ## Sharing policies
//!
//! [`SharingPolicy::Shared`] components are created once and cached for the
//! container's lifetime; every resolution returns the same `Arc`. Non-lazy
//! shared components are created eagerly during [`Container::refresh`].
//! [`SharingPolicy::PerRequest`] components are built fresh on every
//! resolution and never cached.
//!
//! ## Hooks and aspects
//!
//! A [`LifecycleHook`] observes or replaces instances around the
//! injection-completion point. The proxy weaver is the chain's permanent
//! final hook: when an aspect's [`Pointcut`] matches a component's type name
//! and the component declares a proxy factory (see [`surface_proxy`]), the
//! served instance is an interception proxy routing calls through an
//! [`AdviceChain`].

pub mod aspect;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod proxy;
pub mod registry;
pub mod sharing;

mod cache;
mod internal;

pub use aspect::{
    advice_body, AdviceFn, AdviceKind, AdviceSpec, AspectDeclaration, AspectRegistry, Pointcut,
};
pub use container::Container;
pub use descriptor::{
    AnyBox, ComponentDescriptor, DependencyRef, DescriptorBuilder, InjectionTarget, Instance,
    ResolvedArgs,
};
pub use error::{CoreError, CoreResult};
pub use hooks::LifecycleHook;
pub use proxy::{surface_proxy, AdviceChain, Invocation, ProxyFactory, ProxyWeaverHook};
pub use registry::DescriptorRegistry;
pub use sharing::SharingPolicy;
