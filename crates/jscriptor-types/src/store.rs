//! The type store: an append-only table of type cells with union-find
//! resolution.
//!
//! Every type the checker talks about is a [`TypeId`] into this table. A cell
//! is either still [`TypeCell::Unbound`], a [`TypeCell::Symlink`] to another
//! cell, or bound to a concrete name or an object shape. Unification only ever
//! links an unbound or structural cell toward another representative, so
//! symlink chains never form cycles.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Index of a cell in the [`TypeStore`]. Ids start at 0 for every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'t{}", self.0)
    }
}

/// Object field map, in declaration order
pub type FieldMap = IndexMap<SmolStr, TypeId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCell {
    /// A type variable with no constraints yet
    Unbound,
    /// Resolved to another cell
    Symlink(TypeId),
    /// A nominal type such as `Number` or a user annotation name
    Concrete(SmolStr),
    /// A minimal structural record
    Object(FieldMap),
}

/// Unification failure. Cells are left untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot unify {left} with {right}")]
pub struct UnifyError {
    pub left: SmolStr,
    pub right: SmolStr,
}

#[derive(Debug, Clone, Default)]
pub struct TypeStore {
    cells: Vec<TypeCell>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, cell: TypeCell) -> TypeId {
        let id = TypeId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    /// Allocate a fresh unbound type variable
    pub fn fresh(&mut self) -> TypeId {
        self.push(TypeCell::Unbound)
    }

    pub fn concrete(&mut self, name: impl Into<SmolStr>) -> TypeId {
        self.push(TypeCell::Concrete(name.into()))
    }

    pub fn object(&mut self, fields: FieldMap) -> TypeId {
        self.push(TypeCell::Object(fields))
    }

    pub fn cell(&self, id: TypeId) -> &TypeCell {
        &self.cells[id.index()]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop every cell; the next allocated id is 0 again.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Follow symlinks to the representative without rewriting anything.
    pub fn find(&self, id: TypeId) -> TypeId {
        let mut current = id;
        while let TypeCell::Symlink(next) = &self.cells[current.index()] {
            current = *next;
        }
        current
    }

    /// Follow symlinks to the representative, pointing every cell on the way
    /// directly at it.
    pub fn resolve(&mut self, id: TypeId) -> TypeId {
        let root = self.find(id);
        let mut current = id;
        while current != root {
            let next = match &self.cells[current.index()] {
                TypeCell::Symlink(next) => *next,
                _ => break,
            };
            if next != root {
                self.cells[current.index()] = TypeCell::Symlink(root);
            }
            current = next;
        }
        root
    }

    /// The concrete name `id` resolves to, if it resolves to a concrete cell.
    pub fn concrete_name(&mut self, id: TypeId) -> Option<SmolStr> {
        let root = self.resolve(id);
        match &self.cells[root.index()] {
            TypeCell::Concrete(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Assert that `a` and `b` denote the same type.
    ///
    /// Two distinct concrete names fail. Otherwise an unbound side is linked
    /// to the other representative, a concrete side wins over a structural
    /// one, and two structural cells are linked `a -> b`.
    pub fn unify(&mut self, a: TypeId, b: TypeId) -> Result<(), UnifyError> {
        let ra = self.resolve(a);
        let rb = self.resolve(b);
        if ra == rb {
            return Ok(());
        }

        match (&self.cells[ra.index()], &self.cells[rb.index()]) {
            (TypeCell::Concrete(left), TypeCell::Concrete(right)) if left != right => {
                trace!(%left, %right, "unify failed");
                Err(UnifyError {
                    left: left.clone(),
                    right: right.clone(),
                })
            }
            (TypeCell::Unbound, _) => {
                self.cells[ra.index()] = TypeCell::Symlink(rb);
                Ok(())
            }
            (_, TypeCell::Unbound) => self.unify(b, a),
            (TypeCell::Concrete(_), _) => {
                self.cells[rb.index()] = TypeCell::Symlink(ra);
                Ok(())
            }
            _ => {
                self.cells[ra.index()] = TypeCell::Symlink(rb);
                Ok(())
            }
        }
    }

    /// Render a type for humans: `Number`, `{a: Number}`, `'t3`.
    pub fn display(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id, 0);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId, depth: usize) {
        let root = self.find(id);
        match &self.cells[root.index()] {
            TypeCell::Concrete(name) => out.push_str(name),
            TypeCell::Object(_) if depth > 8 => out.push_str("{...}"),
            TypeCell::Object(fields) if fields.is_empty() => out.push_str("{}"),
            TypeCell::Object(fields) => {
                out.push('{');
                for (i, (name, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(": ");
                    self.write_type(out, *field, depth + 1);
                }
                out.push('}');
            }
            TypeCell::Unbound | TypeCell::Symlink(_) => out.push_str(&root.to_string()),
        }
    }
}
