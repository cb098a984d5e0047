//! Aspect registry and pointcut matcher.
//!
//! Aspects are ordinary components whose descriptors carry advice entries.
//! On every container refresh the registry resolves each aspect instance,
//! records its advice in declaration order, and serves match queries for the
//! proxy weaver. Match results are memoized per target type name until the
//! next rebuild.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::container::Container;
use crate::descriptor::Instance;
use crate::error::CoreResult;
use crate::proxy::Invocation;

/// When an advice runs relative to the intercepted method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceKind {
    /// Before the real method; return value ignored.
    Before,
    /// After the real method, regardless of what it returned.
    After,
    /// After a normal return, with the returned value bound when named.
    AfterReturning,
}

/// An advice body: receives the owning aspect instance and the invocation.
///
/// The owner arrives type-erased; [`advice_body`] builds the downcasting
/// wrapper for a concrete aspect type.
pub type AdviceFn = Arc<dyn Fn(&(dyn Any + Send + Sync), &Invocation<'_>) + Send + Sync>;

/// Wraps a typed advice method into an [`AdviceFn`].
///
/// If the owner is not of type `A` the advice silently does nothing; advice
/// is additive, never load-bearing.
pub fn advice_body<A, F>(body: F) -> AdviceFn
where
    A: Send + Sync + 'static,
    F: Fn(&A, &Invocation<'_>) + Send + Sync + 'static,
{
    Arc::new(move |owner, invocation| {
        if let Some(owner) = owner.downcast_ref::<A>() {
            body(owner, invocation);
        }
    })
}

/// A simple fully- or partially-qualified name pattern.
///
/// A single `*` wildcard expands to "any run of characters" in a whole-string
/// match; a pattern without a wildcard matches by substring containment. A
/// pattern matches a type if it matches either its qualified or its simple
/// name.
///
/// The pattern language has exactly one wildcard: only the first `*` splits
/// the pattern, and everything after it, further stars included, is matched
/// as a literal suffix.
#[derive(Debug, Clone)]
pub struct Pointcut {
    pattern: String,
}

impl Pointcut {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into() }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches_name(&self, name: &str) -> bool {
        match self.pattern.split_once('*') {
            Some((prefix, suffix)) => {
                name.len() >= prefix.len() + suffix.len()
                    && name.starts_with(prefix)
                    && name.ends_with(suffix)
            }
            None => name.contains(self.pattern.as_str()),
        }
    }

    /// Matches against the qualified name or its trailing simple segment.
    pub fn matches_type(&self, qualified: &str) -> bool {
        self.matches_name(qualified) || self.matches_name(simple_name(qualified))
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// One advice entry as declared on an aspect component.
#[derive(Clone)]
pub struct AdviceSpec {
    pointcut: Pointcut,
    kind: AdviceKind,
    returning: Option<&'static str>,
    body: AdviceFn,
}

impl AdviceSpec {
    pub fn before(pointcut: impl Into<String>, body: AdviceFn) -> Self {
        Self { pointcut: Pointcut::new(pointcut), kind: AdviceKind::Before, returning: None, body }
    }

    pub fn after(pointcut: impl Into<String>, body: AdviceFn) -> Self {
        Self { pointcut: Pointcut::new(pointcut), kind: AdviceKind::After, returning: None, body }
    }

    /// After-returning advice binding the returned value to `returning`.
    pub fn after_returning(
        pointcut: impl Into<String>,
        returning: &'static str,
        body: AdviceFn,
    ) -> Self {
        Self {
            pointcut: Pointcut::new(pointcut),
            kind: AdviceKind::AfterReturning,
            returning: Some(returning),
            body,
        }
    }

    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    /// The declared binding name for the return value, if any.
    pub fn returning(&self) -> Option<&'static str> {
        self.returning
    }

    pub(crate) fn body(&self) -> &AdviceFn {
        &self.body
    }
}

impl std::fmt::Debug for AdviceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdviceSpec")
            .field("pointcut", &self.pointcut.pattern)
            .field("kind", &self.kind)
            .field("returning", &self.returning)
            .finish()
    }
}

/// One resolved aspect: the owning instance plus its advice entries.
pub struct AspectDeclaration {
    pub(crate) owner: Instance,
    pub(crate) type_name: &'static str,
    pub(crate) advice: Vec<AdviceSpec>,
}

/// Collects aspect declarations and answers pointcut match queries.
///
/// Built once per container refresh; discarded and rebuilt on the next.
#[derive(Default)]
pub struct AspectRegistry {
    declarations: RwLock<Vec<AspectDeclaration>>,
    match_cache: Mutex<HashMap<String, bool>>,
}

impl AspectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears previous state and re-collects every registered aspect,
    /// resolving owner instances through the container.
    pub(crate) fn build(&self, container: &Container) -> CoreResult<()> {
        self.clear();

        let mut declarations = Vec::new();
        for name in container.all_names() {
            let Some(descriptor) = container.descriptor_of(&name) else { continue };
            if !descriptor.is_aspect() {
                continue;
            }
            let owner = container.get_component(&name)?;
            tracing::debug!(aspect = %name, entries = descriptor.advice().len(), "registered aspect");
            declarations.push(AspectDeclaration {
                owner,
                type_name: descriptor.type_name(),
                advice: descriptor.advice().to_vec(),
            });
        }

        *self.declarations.write() = declarations;
        // Resolving owners above can trigger match queries against the
        // still-empty declaration list; those verdicts are stale now.
        self.match_cache.lock().clear();
        Ok(())
    }

    pub(crate) fn clear(&self) {
        self.declarations.write().clear();
        self.match_cache.lock().clear();
    }

    /// Number of registered aspect declarations.
    pub fn aspect_count(&self) -> usize {
        self.declarations.read().len()
    }

    /// Whether any advice entry's pointcut matches the target type.
    ///
    /// First match wins; the verdict is memoized per type name until the next
    /// rebuild.
    pub fn matches(&self, type_name: &str) -> bool {
        if let Some(&hit) = self.match_cache.lock().get(type_name) {
            return hit;
        }
        let hit = self
            .declarations
            .read()
            .iter()
            .flat_map(|decl| decl.advice.iter())
            .any(|spec| spec.pointcut().matches_type(type_name));
        self.match_cache.lock().insert(type_name.to_string(), hit);
        hit
    }

    /// Collects the advice applying to a target type, in aspect-registration
    /// order and, within an aspect, declaration order.
    pub(crate) fn chain_for(&self, type_name: &str) -> crate::proxy::AdviceChain {
        let declarations = self.declarations.read();
        let mut bound = Vec::new();
        for declaration in declarations.iter() {
            for spec in &declaration.advice {
                if spec.pointcut().matches_type(type_name) {
                    bound.push(crate::proxy::BoundAdvice {
                        owner: declaration.owner.clone(),
                        kind: spec.kind(),
                        returning: spec.returning(),
                        body: spec.body().clone(),
                    });
                }
            }
        }
        crate::proxy::AdviceChain::new(bound)
    }

    /// Whether `type_name` is one of the registered aspects' own types.
    pub(crate) fn is_aspect_type(&self, type_name: &str) -> bool {
        self.declarations.read().iter().any(|d| d.type_name == type_name)
    }
}
