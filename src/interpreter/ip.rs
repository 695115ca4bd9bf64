/*
mesofunge – a Funge-98/109 interpreter
Copyright © 2021 Thomas Jollans
Copyright © 2026 Mira Solheim

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as
published by the Free Software Foundation, either version 3 of the
License, or (at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use hashbrown::HashMap;
use std::any::Any;
use std::rc::Rc;

use super::instruction_set::{FingerprintOverlay, InstructionMode};
use crate::fungespace::{vector, FungeValue, Vector};

/// State of one instruction pointer: its position, direction, storage
/// offset, stack of stacks, loaded fingerprint overlay, and any
/// fingerprint-private scratch data it carries.
#[derive(Debug)]
pub struct InstructionPointer<T: FungeValue> {
    /// Identifier of this IP, unique for the lifetime of the program.
    pub id: i32,
    pub location: Vector<T>,
    pub delta: Vector<T>,
    pub storage_offset: Vector<T>,
    /// Stack of stacks; the top of stack is `stack_stack[0]`.
    pub stack_stack: Vec<Vec<T>>,
    pub mode: InstructionMode,
    pub fingerprints: FingerprintOverlay<T>,
    /// Scratch storage for fingerprints and instructions that need to
    /// remember something between ticks (HRTI's mark, REFC's table, ...).
    pub private_data: HashMap<String, Rc<dyn Any>>,
}

impl<T: FungeValue> Clone for InstructionPointer<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            location: self.location,
            delta: self.delta,
            storage_offset: self.storage_offset,
            stack_stack: self.stack_stack.clone(),
            mode: self.mode,
            fingerprints: self.fingerprints.clone(),
            private_data: self.private_data.clone(),
        }
    }
}

impl<T: FungeValue> InstructionPointer<T> {
    /// A fresh IP at the origin, moving east, with a single empty stack.
    ///
    /// `location` starts one step behind the origin so that the
    /// interpreter's first fetch (which always advances before reading)
    /// lands exactly on `(0, 0)`.
    pub fn new(id: i32) -> Self {
        InstructionPointer {
            id,
            location: vector(T::from(-1), T::from(0)),
            delta: vector(T::from(1), T::from(0)),
            storage_offset: vector(T::from(0), T::from(0)),
            stack_stack: vec![Vec::new()],
            mode: InstructionMode::Normal,
            fingerprints: FingerprintOverlay::new(),
            private_data: HashMap::new(),
        }
    }

    /// A duplicate of this IP for `t`: independent stacks and overlay
    /// state, reversed delta, same position (the caller is responsible for
    /// giving it a fresh `id`).
    pub fn forked(&self, new_id: i32) -> Self {
        let mut ip = self.clone();
        ip.id = new_id;
        ip.delta = ip.delta.reversed();
        ip
    }

    #[inline]
    pub fn stack(&self) -> &Vec<T> {
        &self.stack_stack[0]
    }

    #[inline]
    pub fn stack_mut(&mut self) -> &mut Vec<T> {
        &mut self.stack_stack[0]
    }

    /// Pop one value; an empty stack reads as 0.
    #[inline]
    pub fn pop(&mut self) -> T {
        self.stack_mut().pop().unwrap_or_else(|| T::from(0))
    }

    #[inline]
    pub fn push(&mut self, v: T) {
        self.stack_mut().push(v)
    }

    /// Pop a 0gnirts (a 0-terminated string, in Funge community parlance)
    /// off the stack.
    pub fn pop_0gnirts(&mut self) -> String {
        let mut s = String::new();
        loop {
            let c = self.pop();
            if c == T::from(0) {
                break;
            }
            s.push(c.to_char());
        }
        s
    }

    /// Push a string as a 0gnirts.
    pub fn push_0gnirts(&mut self, s: &str) {
        self.push(T::from(0));
        for c in s.chars().rev() {
            self.push((c as i32).into());
        }
    }

    /// Reverse the IP's direction.
    #[inline]
    pub fn reflect(&mut self) {
        self.delta = self.delta.reversed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_underflow_reads_zero() {
        let mut ip = InstructionPointer::<i32>::new(0);
        assert_eq!(ip.pop(), 0);
        ip.push(1);
        ip.push(2);
        assert_eq!(ip.pop(), 2);
        assert_eq!(ip.pop(), 1);
        assert_eq!(ip.pop(), 0);
    }

    #[test]
    fn stack_of_stacks_new_top_is_independent() {
        let mut ip = InstructionPointer::<i32>::new(0);
        ip.push(4);
        ip.push(5);
        ip.stack_stack.insert(0, Vec::new());
        assert_eq!(ip.pop(), 0);
        ip.stack_stack.remove(0);
        assert_eq!(ip.pop(), 5);
        assert_eq!(ip.stack().len(), 1);
    }

    #[test]
    fn gnirts_roundtrip() {
        let mut ip = InstructionPointer::<i32>::new(0);
        ip.push_0gnirts("hi");
        assert_eq!(ip.pop_0gnirts(), "hi");
    }
}
