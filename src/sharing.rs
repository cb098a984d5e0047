//! Instance-sharing policy definitions.

/// Instance-sharing policies controlling how resolved components are cached
///
/// Every descriptor declares exactly one policy. The derived `is_shared`
/// predicate is computed from the policy and never stored separately, so the
/// two can never disagree.
///
/// # Examples
///
/// ```rust
/// use corewire::{ComponentDescriptor, Container};
///
/// struct Clock;
///
/// let container = Container::new();
/// container.register(
///     ComponentDescriptor::shared::<Clock>("clock")
///         .construct_with(|| Clock)
///         .build()
///         .unwrap(),
/// ).unwrap();
///
/// assert!(container.is_shared("clock").unwrap());
/// assert!(!container.is_per_request("clock").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingPolicy {
    /// One instance for the container lifetime, cached on first resolution
    ///
    /// Shared components are created once (eagerly during `refresh` unless
    /// marked lazy) and served from the instance cache afterwards. The same
    /// instance is handed to every caller and every dependent component.
    Shared,
    /// New instance on every resolution, never cached
    ///
    /// Per-request components are rebuilt on each `get_component` call and on
    /// each injection into a dependent, including injections into shared
    /// components (which then hold their own private copy).
    PerRequest,
}

impl SharingPolicy {
    /// Whether instances of this policy live in the container-wide cache.
    pub fn is_shared(self) -> bool {
        matches!(self, SharingPolicy::Shared)
    }

    /// Whether every resolution produces a fresh instance.
    pub fn is_per_request(self) -> bool {
        matches!(self, SharingPolicy::PerRequest)
    }
}
