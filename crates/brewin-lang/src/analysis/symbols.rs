use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::syntax::ast::FuncDef;

// ─── FunctionTable ────────────────────────────────────────────────────────────

/// Named functions keyed by name, then by arity. Overloads of one name
/// coexist as long as their arities differ.
#[derive(Debug, Default, Clone)]
pub struct FunctionTable {
    functions: HashMap<String, BTreeMap<usize, Rc<FuncDef>>>,
}

impl FunctionTable {
    pub fn new() -> Self { Self::default() }

    /// Returns the existing definition if `(name, arity)` is already taken.
    pub fn insert(&mut self, def: Rc<FuncDef>) -> Result<(), Rc<FuncDef>> {
        let by_arity = self.functions.entry(def.name.clone()).or_default();
        match by_arity.get(&def.arity()) {
            Some(existing) => Err(existing.clone()),
            None => {
                by_arity.insert(def.arity(), def);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str, arity: usize) -> Option<&Rc<FuncDef>> {
        self.functions.get(name)?.get(&arity)
    }

    /// All definitions of `name`, ordered by arity.
    pub fn overloads(&self, name: &str) -> Vec<&Rc<FuncDef>> {
        self.functions.get(name).map(|m| m.values().collect()).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool { self.functions.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::{Param, Span};

    fn def(name: &str, arity: usize) -> Rc<FuncDef> {
        let params = (0..arity)
            .map(|i| Param { name: format!("p{i}"), by_ref: false, span: Span::new(1, 1) })
            .collect();
        Rc::new(FuncDef { name: name.into(), params, body: vec![], span: Span::new(1, 1) })
    }

    #[test]
    fn overloads_by_arity() {
        let mut t = FunctionTable::new();
        t.insert(def("f", 0)).unwrap();
        t.insert(def("f", 2)).unwrap();
        assert_eq!(t.get("f", 0).map(|d| d.arity()), Some(0));
        assert_eq!(t.get("f", 2).map(|d| d.arity()), Some(2));
        assert!(t.get("f", 1).is_none());
        assert_eq!(t.overloads("f").len(), 2);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn duplicate_arity_is_rejected() {
        let mut t = FunctionTable::new();
        let first = def("g", 1);
        t.insert(first.clone()).unwrap();
        let existing = t.insert(def("g", 1)).unwrap_err();
        assert!(Rc::ptr_eq(&existing, &first));
    }

    #[test]
    fn unknown_name() {
        let t = FunctionTable::new();
        assert!(!t.contains("nope"));
        assert!(t.overloads("nope").is_empty());
    }
}
