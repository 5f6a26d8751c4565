//! Scope chain. Frames are shared handles so a closure can keep its captured
//! frame alive and mutate it across invocations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

// ─── Frame ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Frame(Rc<RefCell<HashMap<String, Value>>>);

impl Frame {
    pub fn new() -> Self { Self::default() }

    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    pub fn insert(&self, name: &str, val: Value) {
        self.0.borrow_mut().insert(name.to_string(), val);
    }
}

// ─── Environment ──────────────────────────────────────────────────────────────

/// Ordered frames, innermost last. Never empty.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self { frames: vec![Frame::new()] }
    }

    /// A fresh stack whose only frame is `frame`, used to run closure bodies
    /// in isolation from the caller.
    pub fn from_frame(frame: Frame) -> Self {
        Self { frames: vec![frame] }
    }

    pub fn push(&mut self) { self.frames.push(Frame::new()); }

    pub fn pop(&mut self) { if self.frames.len() > 1 { self.frames.pop(); } }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|f| f.get(name))
    }

    /// Overwrite the nearest binding of `name`, or create it in the innermost
    /// frame if no frame has it.
    pub fn set(&mut self, name: &str, val: Value) {
        let frame = self.frames.iter().rev()
            .find(|f| f.contains(name))
            .or(self.frames.last());
        if let Some(frame) = frame {
            frame.insert(name, val);
        }
    }

    pub fn create(&mut self, name: &str, val: Value) {
        if let Some(frame) = self.frames.last() {
            frame.insert(name, val);
        }
    }

    /// Merge every frame into one map, innermost binding wins.
    pub fn flatten(&self) -> HashMap<String, Value> {
        let mut out = HashMap::new();
        for frame in &self.frames {
            for (k, v) in frame.0.borrow().iter() {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new() }
}
