//! Lexical scopes mapping names to type ids.

use crate::store::TypeId;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

pub type Scope = FxHashMap<SmolStr, TypeId>;

/// Stack of scopes. The outermost (global) scope is always present.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
        trace!(depth = self.scopes.len(), "push scope");
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() == 1 {
            return None;
        }
        trace!(depth = self.scopes.len(), "pop scope");
        self.scopes.pop()
    }

    /// Bind `name` in the innermost scope, shadowing outer bindings.
    pub fn define(&mut self, name: impl Into<SmolStr>, ty: TypeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), ty);
        }
    }

    /// Nearest binding of `name`, searching innermost first.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Back to a single empty global scope
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::default());
    }
}
