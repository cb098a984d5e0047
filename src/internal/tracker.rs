//! Creation tracker: per-resolution-chain circular dependency detection.

use std::cell::RefCell;

use crate::error::{CoreError, CoreResult};

const MAX_DEPTH: usize = 1024;

// Thread-local construction stack. A top-level resolve and all of its
// recursive descendants run on one thread, so the stack is exactly the
// active resolution chain; unrelated concurrent resolutions never see it.
thread_local! {
    static CHAIN: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// Guard for one frame of the thread-local construction stack.
///
/// `enter` detects re-entry BEFORE pushing the new name, so a cycle is
/// reported ahead of any recursive call. Dropping the guard pops the frame,
/// which keeps the stack balanced on every error path.
pub(crate) struct ChainGuard {
    name: String,
}

impl ChainGuard {
    pub(crate) fn enter(name: &str) -> CoreResult<Self> {
        CHAIN.with(|chain| {
            let mut stack = chain.borrow_mut();

            if let Some(first) = stack.iter().position(|n| n == name) {
                // Payload is the chain from the first occurrence through the
                // point of re-entry, e.g. ["a", "b", "a"].
                let mut path: Vec<String> = stack[first..].to_vec();
                path.push(name.to_string());
                return Err(CoreError::Circular(path));
            }

            if stack.len() >= MAX_DEPTH {
                return Err(CoreError::DepthExceeded(stack.len()));
            }

            stack.push(name.to_string());
            Ok(ChainGuard { name: name.to_string() })
        })
    }
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        CHAIN.with(|chain| {
            let popped = chain.borrow_mut().pop();
            debug_assert_eq!(popped.as_deref(), Some(self.name.as_str()));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentry_reports_chain_from_first_occurrence() {
        let _a = ChainGuard::enter("a").unwrap();
        let _b = ChainGuard::enter("b").unwrap();
        match ChainGuard::enter("a") {
            Err(CoreError::Circular(path)) => {
                assert_eq!(path, vec!["a".to_string(), "b".to_string(), "a".to_string()]);
            }
            Err(other) => panic!("expected circular error, got {:?}", other),
            Ok(_) => panic!("expected circular error, got a guard"),
        }
    }

    #[test]
    fn guard_drop_pops_the_frame() {
        {
            let _g = ChainGuard::enter("x").unwrap();
        }
        // Frame gone: re-entering the same name succeeds.
        let _g = ChainGuard::enter("x").unwrap();
    }

    #[test]
    fn failed_entry_leaves_stack_balanced() {
        let _a = ChainGuard::enter("a").unwrap();
        assert!(ChainGuard::enter("a").is_err());
        drop(_a);
        let _a = ChainGuard::enter("a").unwrap();
    }
}
