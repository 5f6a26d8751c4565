//! Prototype objects. Lookup walks the `proto` chain iteratively and stops on
//! the first revisited link, so cyclic chains terminate.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::runtime::value::Value;

pub type ObjectRef = Rc<RefCell<Object>>;

/// Field name that addresses the prototype slot rather than an own field.
pub const PROTO: &str = "proto";

#[derive(Debug, Default)]
pub struct Object {
    pub fields: HashMap<String, Value>,
    pub proto: Option<ObjectRef>,
}

impl Object {
    pub fn new_ref() -> ObjectRef {
        Rc::new(RefCell::new(Object::default()))
    }
}

/// Resolve `name` on `obj`: own fields first, then each prototype in turn.
pub fn get_member(obj: &ObjectRef, name: &str) -> Option<Value> {
    if name == PROTO {
        return Some(match &obj.borrow().proto {
            Some(p) => Value::Object(p.clone()),
            None    => Value::Nil,
        });
    }

    let mut visited: HashSet<*const RefCell<Object>> = HashSet::new();
    let mut current = obj.clone();
    loop {
        if !visited.insert(Rc::as_ptr(&current)) {
            return None;
        }
        let next = {
            let o = current.borrow();
            if let Some(v) = o.fields.get(name) {
                return Some(v.clone());
            }
            o.proto.clone()
        };
        current = next?;
    }
}

/// Error raised when a non-object is stored in the `proto` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProto(pub &'static str);

/// Write `name` on the receiver itself. Prototypes are never modified.
pub fn set_member(obj: &ObjectRef, name: &str, val: Value) -> Result<(), InvalidProto> {
    if name == PROTO {
        let proto = match val {
            Value::Object(p) => Some(p),
            Value::Nil       => None,
            other            => return Err(InvalidProto(other.type_name())),
        };
        obj.borrow_mut().proto = proto;
        return Ok(());
    }
    obj.borrow_mut().fields.insert(name.to_string(), val);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: Option<Value>) -> Option<i64> {
        match v {
            Some(Value::Int(n)) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn own_field_lookup() {
        let o = Object::new_ref();
        set_member(&o, "x", Value::Int(1)).unwrap();
        assert_eq!(int(get_member(&o, "x")), Some(1));
        assert!(get_member(&o, "y").is_none());
    }

    #[test]
    fn two_level_chain() {
        let base = Object::new_ref();
        let mid = Object::new_ref();
        let leaf = Object::new_ref();
        set_member(&base, "k", Value::Int(7)).unwrap();
        set_member(&mid, PROTO, Value::Object(base)).unwrap();
        set_member(&leaf, PROTO, Value::Object(mid)).unwrap();
        assert_eq!(int(get_member(&leaf, "k")), Some(7));
    }

    #[test]
    fn own_field_shadows_proto() {
        let p = Object::new_ref();
        let o = Object::new_ref();
        set_member(&p, "x", Value::Int(1)).unwrap();
        set_member(&o, PROTO, Value::Object(p.clone())).unwrap();
        set_member(&o, "x", Value::Int(2)).unwrap();
        assert_eq!(int(get_member(&o, "x")), Some(2));
        assert_eq!(int(get_member(&p, "x")), Some(1));
    }

    #[test]
    fn cyclic_chain_terminates() {
        let a = Object::new_ref();
        let b = Object::new_ref();
        set_member(&a, PROTO, Value::Object(b.clone())).unwrap();
        set_member(&b, PROTO, Value::Object(a.clone())).unwrap();
        assert!(get_member(&a, "missing").is_none());

        // break the cycle so the Rc pair is freed
        set_member(&a, PROTO, Value::Nil).unwrap();
    }

    #[test]
    fn proto_slot_read_and_validation() {
        let o = Object::new_ref();
        assert!(matches!(get_member(&o, PROTO), Some(Value::Nil)));
        assert_eq!(set_member(&o, PROTO, Value::Int(3)), Err(InvalidProto("int")));
    }
}
