//! Variable entities.
//!
//! Every variable reference in the AST resolves to an [`EntityId`] handed out
//! by the semantic analyzer.  Lowering adds to the same table when it mints
//! temporaries.

use crate::ident::Ident;
use crate::types::TypeId;

newtype_id! {
    #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EntityId(pub u32);
}

newtype_id! {
    /// A lexical scope.  Temporaries record the scope they were minted in.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ScopeId(pub u32);
}

/// Storage class of an entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Statically allocated: module-scope variables and `static` locals.
    Static,
    /// Stack-allocated local (including compiler temporaries).
    Local,
    /// Function parameter.
    Param,
}

/// A named variable, parameter, function, or compiler temporary.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: Ident,
    pub ty: TypeId,
    pub storage: Storage,
    /// Addressable but not readable by a single load: array-, struct-, or
    /// function-typed entities.  These are only ever referenced by address.
    pub cannot_load: bool,
    pub scope: ScopeId,
}

impl Entity {
    pub fn is_static(&self) -> bool {
        self.storage == Storage::Static
    }
}

/// All entities of one program.
#[derive(Debug, Default)]
pub struct EntityTable {
    entities: Vec<Entity>,
    scopes: u32,
    temporaries: u32,
}

impl EntityTable {
    pub fn new() -> Self {
        EntityTable::default()
    }

    pub fn define(&mut self, entity: Entity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() as u32 - 1)
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    pub fn new_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes);
        self.scopes += 1;
        id
    }

    /// Mint a fresh temporary in `scope`.  Its name (`@tmp#N`) can never
    /// collide with a user variable.
    pub fn declare_temporary(&mut self, scope: ScopeId, ty: TypeId) -> EntityId {
        let n = self.temporaries;
        self.temporaries += 1;
        self.define(Entity {
            name: Ident::new_system(format!("@tmp#{}", n)),
            ty,
            storage: Storage::Local,
            cannot_load: false,
            scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTable;

    #[test]
    fn temporaries_get_unique_names() {
        let types = TypeTable::new();
        let mut entities = EntityTable::new();
        let scope = entities.new_scope();

        let a = entities.declare_temporary(scope, types.signed_int());
        let b = entities.declare_temporary(scope, types.signed_int());
        assert_ne!(a, b);
        assert_eq!(entities.get(a).name.to_string(), "@tmp#0");
        assert_eq!(entities.get(b).name.to_string(), "@tmp#1");
        assert_eq!(entities.get(b).storage, Storage::Local);
    }
}
