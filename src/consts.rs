//! The string-literal constant pool.
//!
//! String literals are interned by the semantic analyzer; the IR refers to
//! pool entries by [`ConstId`] and the code generator later emits the pool
//! into the data section.

use indexmap::IndexSet;

newtype_id! {
    #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ConstId(pub u32);
}

#[derive(Debug, Default)]
pub struct ConstTable {
    entries: IndexSet<String>,
}

impl ConstTable {
    pub fn new() -> Self {
        ConstTable::default()
    }

    pub fn intern(&mut self, text: &str) -> ConstId {
        let (index, _) = self.entries.insert_full(text.to_owned());
        ConstId(index as u32)
    }

    pub fn get(&self, id: ConstId) -> &str {
        &self.entries[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConstId, &str)> {
        self.entries.iter().enumerate()
            .map(|(index, text)| (ConstId(index as u32), text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups() {
        let mut consts = ConstTable::new();
        let hello = consts.intern("hello");
        let world = consts.intern("world");
        assert_eq!(consts.intern("hello"), hello);
        assert_ne!(hello, world);
        assert_eq!(consts.get(world), "world");
        assert_eq!(consts.iter().count(), 2);
    }
}
