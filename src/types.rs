//! Semantic types, as resolved by the semantic analyzer.
//!
//! Lowering never infers types; it only reads what the analyzer already
//! attached to the AST and combines existing types with [`TypeTable::pointer_to`].

use crate::ident::Ident;

newtype_id! {
    /// Index of an interned type in a [`TypeTable`].
    #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct TypeId(pub u32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Integer {
        size: u32,
        signed: bool,
    },
    Pointer {
        base: TypeId,
    },
    Array {
        base: TypeId,
        length: u64,
    },
    Struct {
        name: Ident,
        size: u64,
        members: Vec<Member>,
    },
    Function {
        return_type: TypeId,
        params: Vec<TypeId>,
        variadic: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: Ident,
    pub ty: TypeId,
    pub offset: u64,
}

/// Interning table for [`Type`]s, plus the target's machine parameters.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Vec<Type>,
    pointer_size: u32,
    signed_int: TypeId,
    ptr_diff: TypeId,
}

impl TypeTable {
    /// A table for the default target: 32-bit `int`, 64-bit pointers.
    pub fn new() -> TypeTable {
        TypeTable::with_target(4, 8)
    }

    pub fn with_target(int_size: u32, pointer_size: u32) -> TypeTable {
        let mut table = TypeTable {
            types: vec![],
            pointer_size,
            signed_int: TypeId(0),
            ptr_diff: TypeId(0),
        };
        table.signed_int = table.intern(Type::Integer { size: int_size, signed: true });
        table.ptr_diff = table.intern(Type::Integer { size: pointer_size, signed: true });
        table
    }

    /// Intern a type, returning the id of an existing structurally-equal one
    /// if present.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        match self.types.iter().position(|existing| *existing == ty) {
            Some(index) => TypeId(index as u32),
            None => {
                self.types.push(ty);
                TypeId(self.types.len() as u32 - 1)
            }
        }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    /// The native `int` type.
    pub fn signed_int(&self) -> TypeId {
        self.signed_int
    }

    /// The signed integer type matching pointer width.
    pub fn ptr_diff_type(&self) -> TypeId {
        self.ptr_diff
    }

    pub fn pointer_to(&mut self, base: TypeId) -> TypeId {
        self.intern(Type::Pointer { base })
    }

    /// Allocation size in bytes.
    pub fn size_of(&self, id: TypeId) -> u64 {
        match self.get(id) {
            Type::Integer { size, .. } => u64::from(*size),
            Type::Pointer { .. } => u64::from(self.pointer_size),
            Type::Array { base, length } => self.size_of(*base) * length,
            Type::Struct { size, .. } => *size,
            ty @ (Type::Void | Type::Function { .. }) => {
                panic!("(bug!) size of unsized type {:?}", ty)
            }
        }
    }

    pub fn is_signed(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Integer { signed: true, .. })
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Pointer { .. })
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Array { .. })
    }

    /// Can the type appear on the left of pointer arithmetic and under `*`?
    pub fn is_dereferable(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Pointer { .. } | Type::Array { .. })
    }

    /// Pointee of a pointer, or element of an array.
    pub fn base_type(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Type::Pointer { base } | Type::Array { base, .. } => *base,
            ty => panic!("(bug!) base type of non-dereferable {:?}", ty),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups() {
        let mut table = TypeTable::new();
        let int = table.signed_int();
        let p1 = table.pointer_to(int);
        let p2 = table.pointer_to(int);
        assert_eq!(p1, p2);

        let pp = table.pointer_to(p1);
        assert_ne!(p1, pp);
    }

    #[test]
    fn sizes() {
        let mut table = TypeTable::new();
        let int = table.signed_int();
        assert_eq!(table.size_of(int), 4);

        let ptr = table.pointer_to(int);
        assert_eq!(table.size_of(ptr), 8);

        let arr = table.intern(Type::Array { base: int, length: 10 });
        assert_eq!(table.size_of(arr), 40);
        assert_eq!(table.base_type(arr), int);
        assert!(table.is_dereferable(arr));
        assert!(!table.is_signed(arr));
    }

    #[test]
    fn ptr_diff_is_pointer_sized_and_signed() {
        let table = TypeTable::with_target(4, 4);
        let diff = table.ptr_diff_type();
        assert_eq!(table.size_of(diff), 4);
        assert!(table.is_signed(diff));
    }
}
