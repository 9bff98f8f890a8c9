//! Generic LIFO of saved state entries for push/pop scopes
//!
//! Each cache component keeps its own stack, so pushes and pops of
//! different state kinds never interleave through one stack. Nesting must
//! be balanced: popping past the last push is reported as a fatal contract
//! violation, never swallowed, because a silently ignored pop would corrupt
//! the caller's assumed nesting depth for everything that follows.

use crate::error::Result;
use crate::state_bail;

/// LIFO of saved entries for one cache kind
pub struct ScopeStack<T> {
    entries: Vec<T>,
    label: &'static str,
}

impl<T> ScopeStack<T> {
    /// Create an empty stack; `label` names the owning cache in diagnostics
    pub fn new(label: &'static str) -> Self {
        Self {
            entries: Vec::new(),
            label,
        }
    }

    /// Save an entry. Never fails.
    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Take back the most recently pushed entry
    ///
    /// # Errors
    ///
    /// `ContractViolation` when the stack is empty.
    pub fn pop(&mut self) -> Result<T> {
        match self.entries.pop() {
            Some(entry) => Ok(entry),
            None => state_bail!("nebulagl::ScopeStack",
                "pop on empty {} scope stack", self.label),
        }
    }

    /// Take back the `count` most recently pushed entries, most recent first
    ///
    /// Depth is validated before anything is popped; a bad count leaves the
    /// stack untouched.
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<T>> {
        if count > self.entries.len() {
            state_bail!("nebulagl::ScopeStack",
                "pop of {} entries on {} scope stack holding {}",
                count, self.label, self.entries.len());
        }
        let mut tail = self.entries.split_off(self.entries.len() - count);
        tail.reverse();
        Ok(tail)
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Whether no scope is open
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
