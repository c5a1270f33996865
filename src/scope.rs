//! Scope chain and activation frames (spec.md §3): the program scope plus
//! a stack of per-call activation frames, each seeing globals and its own
//! parameters/locals but never a caller's locals. Blocks (`If`/`While`/
//! `ForEach` bodies) share their enclosing frame's scope — there is no
//! separate per-block binding table, per the spec §9 open question on loop
//! variable lifetime.

use std::collections::HashMap;

use crate::graph::NodeId;
use crate::intern::Symbol;
use crate::value::Value;

/// One function-call activation record (spec.md §3 "Activation frame").
pub struct Frame {
    pub locals: HashMap<Symbol, Value>,
    pub return_target: NodeId,
    pub result_target: Option<Symbol>,
}

impl Frame {
    pub fn new(return_target: NodeId, result_target: Option<Symbol>) -> Self {
        Frame { locals: HashMap::new(), return_target, result_target }
    }
}

/// The interpreter's scope stack: one global map plus zero or more
/// activation frames. Only the top frame is ever visible — there is no
/// access to an enclosing *caller's* locals, matching the "functions see
/// globals + own parameters + own locals" rule in spec.md §3.
#[derive(Default)]
pub struct Scopes {
    pub globals: HashMap<Symbol, Value>,
    pub frames: Vec<Frame>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes::default()
    }

    /// Looks up `name`, preferring the innermost active frame.
    pub fn get(&self, name: Symbol) -> Option<&Value> {
        if let Some(frame) = self.frames.last() {
            if let Some(v) = frame.locals.get(&name) {
                return Some(v);
            }
        }
        self.globals.get(&name)
    }

    /// Implements the ASSIGN rule of spec.md §4.5: bind in the nearest
    /// existing scope that already defines `target`, otherwise the current
    /// frame's local scope (or the program scope if there is no frame).
    pub fn assign(&mut self, target: Symbol, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.locals.contains_key(&target) {
                frame.locals.insert(target, value);
                return;
            }
            if self.globals.contains_key(&target) {
                self.globals.insert(target, value);
                return;
            }
            frame.locals.insert(target, value);
        } else {
            self.globals.insert(target, value);
        }
    }

    /// Binds `target` in the scope active one level "up" from the frame
    /// that is about to be popped — used by `RETURN` to store its result in
    /// the *caller's* scope. Must be called before `frames.pop()`.
    pub fn assign_in_caller(&mut self, target: Symbol, value: Value) {
        if self.frames.len() >= 2 {
            let caller_idx = self.frames.len() - 2;
            let frame = &mut self.frames[caller_idx];
            if frame.locals.contains_key(&target) {
                frame.locals.insert(target, value);
                return;
            }
            if self.globals.contains_key(&target) {
                self.globals.insert(target, value);
                return;
            }
            frame.locals.insert(target, value);
        } else {
            self.globals.insert(target, value);
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_with_no_frame_binds_globally() {
        let mut scopes = Scopes::new();
        scopes.assign(Symbol::EMPTY, Value::Int(1));
        assert!(scopes.globals.contains_key(&Symbol::EMPTY));
    }

    #[test]
    fn assign_in_frame_prefers_existing_local_over_global() {
        let mut scopes = Scopes::new();
        scopes.globals.insert(Symbol::EMPTY, Value::Int(0));
        scopes.push_frame(Frame::new(0, None));
        scopes.frames.last_mut().unwrap().locals.insert(Symbol::EMPTY, Value::Int(1));
        scopes.assign(Symbol::EMPTY, Value::Int(2));
        assert_eq!(scopes.frames.last().unwrap().locals.get(&Symbol::EMPTY), Some(&Value::Int(2)));
        assert_eq!(scopes.globals.get(&Symbol::EMPTY), Some(&Value::Int(0)));
    }

    #[test]
    fn assign_falls_back_to_existing_global_when_not_a_local() {
        let mut scopes = Scopes::new();
        scopes.globals.insert(Symbol::EMPTY, Value::Int(0));
        scopes.push_frame(Frame::new(0, None));
        scopes.assign(Symbol::EMPTY, Value::Int(5));
        assert_eq!(scopes.globals.get(&Symbol::EMPTY), Some(&Value::Int(5)));
        assert!(!scopes.frames.last().unwrap().locals.contains_key(&Symbol::EMPTY));
    }

    #[test]
    fn unset_name_in_a_frame_binds_locally_not_globally() {
        let mut scopes = Scopes::new();
        scopes.push_frame(Frame::new(0, None));
        scopes.assign(Symbol::EMPTY, Value::Int(9));
        assert!(scopes.frames.last().unwrap().locals.contains_key(&Symbol::EMPTY));
        assert!(!scopes.globals.contains_key(&Symbol::EMPTY));
    }

    #[test]
    fn frame_does_not_see_a_caller_frames_locals() {
        let mut scopes = Scopes::new();
        scopes.push_frame(Frame::new(0, None));
        scopes.frames[0].locals.insert(Symbol::EMPTY, Value::Int(7));
        scopes.push_frame(Frame::new(0, None));
        assert!(scopes.get(Symbol::EMPTY).is_none());
    }
}
