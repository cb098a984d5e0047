//! Component descriptors: the static metadata the resolution engine consumes.
//!
//! A [`ComponentDescriptor`] is plain data produced ahead of time by whatever
//! discovery layer feeds the container: the type identity, the declared name,
//! the sharing policy, an ordered constructor plan, and the set of members to
//! populate after construction. Because Rust has no runtime reflection, the
//! descriptor also carries the type-erased closures a code generator (or, as
//! in the tests, a hand-written registration) would emit: the constructor,
//! the member setters, an optional seal step that coerces the built value to
//! its stored surface, and an optional proxy factory.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::aspect::AdviceSpec;
use crate::error::{CoreError, CoreResult};
use crate::proxy::ProxyFactory;
use crate::sharing::SharingPolicy;

/// A fully-initialized component instance as stored and served by the container.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A component instance mid-construction, still mutable for member injection.
pub type AnyBox = Box<dyn Any + Send + Sync>;

pub(crate) type ConstructorFn =
    Arc<dyn Fn(Vec<Instance>) -> CoreResult<AnyBox> + Send + Sync>;
pub(crate) type SetterFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Instance) -> CoreResult<()> + Send + Sync>;
pub(crate) type SealFn = Arc<dyn Fn(AnyBox) -> Instance + Send + Sync>;

/// A dependency reference inside a constructor plan or injection target.
#[derive(Debug, Clone)]
pub enum DependencyRef {
    /// Resolve the dependency through the registry by component name.
    ByName(String),
    /// Resolve the dependency by scanning descriptors for a unique type match.
    ByType(TypeId, &'static str),
}

impl DependencyRef {
    /// Reference a dependency by its registered component name.
    pub fn by_name(name: impl Into<String>) -> Self {
        DependencyRef::ByName(name.into())
    }

    /// Reference a dependency by its stored type identity.
    ///
    /// Resolution fails if zero or more than one descriptor matches.
    pub fn by_type<T: Send + Sync + 'static>() -> Self {
        DependencyRef::ByType(TypeId::of::<T>(), std::any::type_name::<T>())
    }
}

/// One member to populate after construction.
pub struct InjectionTarget {
    member: &'static str,
    dependency: DependencyRef,
    required: bool,
    setter: SetterFn,
}

impl InjectionTarget {
    /// The member name, for diagnostics.
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// The dependency to resolve into this member.
    pub fn dependency(&self) -> &DependencyRef {
        &self.dependency
    }

    /// Whether an unresolved dependency fails the creation.
    ///
    /// Optional targets are skipped silently, leaving the member unset.
    pub fn required(&self) -> bool {
        self.required
    }

    pub(crate) fn setter(&self) -> &SetterFn {
        &self.setter
    }
}

/// Typed view over the resolved constructor arguments, in plan order.
pub struct ResolvedArgs<'a> {
    args: &'a [Instance],
}

impl<'a> ResolvedArgs<'a> {
    pub(crate) fn new(args: &'a [Instance]) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Downcasts the argument at `index` to its declared type.
    pub fn get<U: Send + Sync + 'static>(&self, index: usize) -> CoreResult<Arc<U>> {
        let instance = self.args.get(index).ok_or_else(|| {
            CoreError::InvalidRegistration(format!(
                "constructor argument {} out of range ({} resolved)",
                index,
                self.args.len()
            ))
        })?;
        instance.clone().downcast::<U>().map_err(|_| CoreError::TypeMismatch {
            name: format!("constructor argument {}", index),
            expected: std::any::type_name::<U>(),
        })
    }
}

/// Static metadata about one creatable component type.
///
/// Descriptors are immutable after [`DescriptorBuilder::build`]; the name is
/// never reassigned and the registry enforces its uniqueness.
///
/// # Examples
///
/// ```rust
/// use corewire::{ComponentDescriptor, DependencyRef};
/// use std::sync::Arc;
///
/// struct Settings { url: String }
/// struct Repository { settings: Arc<Settings> }
///
/// let descriptor = ComponentDescriptor::shared::<Repository>("repository")
///     .constructor(vec![DependencyRef::by_name("settings")], |args| {
///         Ok(Repository { settings: args.get::<Settings>(0)? })
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.name(), "repository");
/// assert!(descriptor.is_shared());
/// ```
pub struct ComponentDescriptor {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    policy: SharingPolicy,
    lazy: bool,
    plan: Vec<DependencyRef>,
    ctor: ConstructorFn,
    targets: Vec<InjectionTarget>,
    seal: SealFn,
    proxy_factory: Option<ProxyFactory>,
    advice: Vec<AdviceSpec>,
}

impl ComponentDescriptor {
    /// Starts a descriptor for a shared (container-lifetime) component.
    pub fn shared<T: Send + Sync + 'static>(name: impl Into<String>) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name.into(), SharingPolicy::Shared)
    }

    /// Starts a descriptor for a per-request (fresh on every resolution) component.
    pub fn per_request<T: Send + Sync + 'static>(name: impl Into<String>) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name.into(), SharingPolicy::PerRequest)
    }

    /// The unique component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored type identity.
    ///
    /// For components sealed behind a trait surface this is the surface type
    /// (`Arc<dyn Trait + Send + Sync>`), which is also what typed accessors
    /// and by-type lookups match against.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable name of the stored type, used by the pointcut matcher.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The declared sharing policy.
    pub fn sharing_policy(&self) -> SharingPolicy {
        self.policy
    }

    /// Derived from the policy; always agrees with it.
    pub fn is_shared(&self) -> bool {
        self.policy.is_shared()
    }

    pub fn is_per_request(&self) -> bool {
        self.policy.is_per_request()
    }

    /// Lazy shared components are skipped by eager initialization.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// A component carrying advice entries is an aspect; aspects are never
    /// themselves wrapped in interception proxies.
    pub fn is_aspect(&self) -> bool {
        !self.advice.is_empty()
    }

    /// The ordered dependency references needed to run the constructor.
    pub fn constructor_plan(&self) -> &[DependencyRef] {
        &self.plan
    }

    /// Members to populate after construction.
    pub fn injection_targets(&self) -> &[InjectionTarget] {
        &self.targets
    }

    /// Declared advice entries, in declaration order.
    pub fn advice(&self) -> &[AdviceSpec] {
        &self.advice
    }

    pub(crate) fn ctor(&self) -> &ConstructorFn {
        &self.ctor
    }

    pub(crate) fn seal(&self) -> &SealFn {
        &self.seal
    }

    pub(crate) fn proxy_factory(&self) -> Option<&ProxyFactory> {
        self.proxy_factory.as_ref()
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("policy", &self.policy)
            .field("lazy", &self.lazy)
            .field("plan", &self.plan.len())
            .field("targets", &self.targets.len())
            .field("advice", &self.advice.len())
            .finish()
    }
}

/// Builder assembling a [`ComponentDescriptor`] for a concrete type `T`.
pub struct DescriptorBuilder<T> {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    policy: SharingPolicy,
    lazy: bool,
    plan: Vec<DependencyRef>,
    ctor: Option<ConstructorFn>,
    targets: Vec<InjectionTarget>,
    seal: Option<SealFn>,
    proxy_factory: Option<ProxyFactory>,
    advice: Vec<AdviceSpec>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    fn new(name: String, policy: SharingPolicy) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            policy,
            lazy: false,
            plan: Vec::new(),
            ctor: None,
            targets: Vec::new(),
            seal: None,
            proxy_factory: None,
            advice: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Marks a shared component as excluded from eager initialization.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Declares the constructor plan and the constructor itself.
    ///
    /// The engine resolves each [`DependencyRef`] in order and hands the
    /// results to `build` as [`ResolvedArgs`].
    pub fn constructor<F>(mut self, plan: Vec<DependencyRef>, build: F) -> Self
    where
        F: Fn(ResolvedArgs<'_>) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.plan = plan;
        self.ctor = Some(Arc::new(move |args: Vec<Instance>| {
            let value = build(ResolvedArgs::new(&args))?;
            Ok(Box::new(value) as AnyBox)
        }));
        self
    }

    /// Shorthand for a dependency-free constructor.
    pub fn construct_with<F>(self, build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor(Vec::new(), move |_| Ok(build()))
    }

    /// Declares a required injection target: resolution of `dependency`
    /// failing fails the whole creation.
    pub fn inject<U, F>(self, member: &'static str, dependency: DependencyRef, apply: F) -> Self
    where
        U: Send + Sync + 'static,
        F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
    {
        self.push_target(member, dependency, true, apply)
    }

    /// Declares an optional injection target: if the dependency cannot be
    /// resolved the member is left in its default state.
    pub fn inject_optional<U, F>(
        self,
        member: &'static str,
        dependency: DependencyRef,
        apply: F,
    ) -> Self
    where
        U: Send + Sync + 'static,
        F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
    {
        self.push_target(member, dependency, false, apply)
    }

    fn push_target<U, F>(
        mut self,
        member: &'static str,
        dependency: DependencyRef,
        required: bool,
        apply: F,
    ) -> Self
    where
        U: Send + Sync + 'static,
        F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
    {
        let setter: SetterFn = Arc::new(move |partial, dep| {
            let target = partial.downcast_mut::<T>().ok_or_else(|| CoreError::TypeMismatch {
                name: member.to_string(),
                expected: std::any::type_name::<T>(),
            })?;
            let dep = dep.downcast::<U>().map_err(|_| CoreError::TypeMismatch {
                name: member.to_string(),
                expected: std::any::type_name::<U>(),
            })?;
            apply(target, dep);
            Ok(())
        });
        self.targets.push(InjectionTarget { member, dependency, required, setter });
        self
    }

    /// Seals the component behind a trait surface.
    ///
    /// The stored type identity becomes `Arc<S>`, so dependents and typed
    /// accessors request `Arc<dyn Trait + Send + Sync>` instead of `T`. This
    /// is also the capability surface an interception proxy can implement.
    pub fn surface<S, F>(mut self, coerce: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(T) -> Arc<S> + Send + Sync + 'static,
    {
        self.type_id = TypeId::of::<Arc<S>>();
        self.type_name = std::any::type_name::<Arc<S>>();
        self.seal = Some(Arc::new(move |boxed: AnyBox| match boxed.downcast::<T>() {
            Ok(value) => Arc::new(coerce(*value)) as Instance,
            // A foreign payload cannot be coerced; store it as-is.
            Err(other) => Arc::from(other),
        }));
        self
    }

    /// Attaches the factory the proxy engine uses to wrap this component.
    ///
    /// Components without one fall back to the unwrapped instance even when
    /// an aspect matches.
    pub fn proxied_by(mut self, factory: ProxyFactory) -> Self {
        self.proxy_factory = Some(factory);
        self
    }

    /// Declares an advice entry, marking this component as an aspect.
    pub fn advice(mut self, spec: AdviceSpec) -> Self {
        self.advice.push(spec);
        self
    }

    /// Finalizes the descriptor.
    pub fn build(self) -> CoreResult<ComponentDescriptor> {
        let ctor = self.ctor.ok_or_else(|| {
            CoreError::InvalidRegistration(format!(
                "no constructor declared for component '{}'",
                self.name
            ))
        })?;
        let seal = self
            .seal
            .unwrap_or_else(|| Arc::new(|boxed: AnyBox| Arc::from(boxed) as Instance));
        Ok(ComponentDescriptor {
            name: self.name,
            type_id: self.type_id,
            type_name: self.type_name,
            policy: self.policy,
            lazy: self.lazy,
            plan: self.plan,
            ctor,
            targets: self.targets,
            seal,
            proxy_factory: self.proxy_factory,
            advice: self.advice,
        })
    }
}
