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

use std::cmp::Ordering;

use rand::Rng;

use super::ip::InstructionPointer;
use crate::fungespace::{vector, FungeValue, Vector};

/// Direction-setting instructions and the vector push/pop convention
/// (`y`-then-`x` order, matching how `p`/`g` expect their coordinates).
pub trait MotionCmds<T: FungeValue> {
    fn apply_delta(instruction: char, ip: &mut InstructionPointer<T>) -> bool;
    fn pop_vector_from(stack: &mut Vec<T>) -> Vector<T>;
    fn push_vector_onto(stack: &mut Vec<T>, v: Vector<T>);
    fn pop_vector(ip: &mut InstructionPointer<T>) -> Vector<T> {
        Self::pop_vector_from(ip.stack_mut())
    }
    fn push_vector(ip: &mut InstructionPointer<T>, v: Vector<T>) {
        Self::push_vector_onto(ip.stack_mut(), v)
    }
}

impl<T: FungeValue> MotionCmds<T> for Vector<T> {
    fn apply_delta(instruction: char, ip: &mut InstructionPointer<T>) -> bool {
        match instruction {
            '>' => {
                ip.delta = vector(T::from(1), T::from(0));
                true
            }
            '<' => {
                ip.delta = vector(T::from(-1), T::from(0));
                true
            }
            '^' => {
                ip.delta = vector(T::from(0), T::from(-1));
                true
            }
            'v' => {
                ip.delta = vector(T::from(0), T::from(1));
                true
            }
            ']' => {
                ip.delta = ip.delta.turn_right();
                true
            }
            '[' => {
                ip.delta = ip.delta.turn_left();
                true
            }
            '_' => {
                let p = ip.pop();
                ip.delta = if p == T::from(0) {
                    vector(T::from(1), T::from(0))
                } else {
                    vector(T::from(-1), T::from(0))
                };
                true
            }
            '|' => {
                let p = ip.pop();
                ip.delta = if p == T::from(0) {
                    vector(T::from(0), T::from(1))
                } else {
                    vector(T::from(0), T::from(-1))
                };
                true
            }
            'w' => {
                let b = ip.pop();
                let a = ip.pop();
                match a.cmp(&b) {
                    Ordering::Greater => ip.delta = ip.delta.turn_right(),
                    Ordering::Less => ip.delta = ip.delta.turn_left(),
                    Ordering::Equal => {}
                }
                true
            }
            '?' => {
                ip.delta = match rand::thread_rng().gen_range(0..4) {
                    0 => vector(T::from(1), T::from(0)),
                    1 => vector(T::from(0), T::from(1)),
                    2 => vector(T::from(-1), T::from(0)),
                    _ => vector(T::from(0), T::from(-1)),
                };
                true
            }
            _ => false,
        }
    }

    fn pop_vector_from(stack: &mut Vec<T>) -> Vector<T> {
        let y = stack.pop().unwrap_or_else(|| T::from(0));
        let x = stack.pop().unwrap_or_else(|| T::from(0));
        vector(x, y)
    }

    fn push_vector_onto(stack: &mut Vec<T>, v: Vector<T>) {
        stack.push(v.x);
        stack.push(v.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_right_rotates_east_to_south() {
        let mut ip = InstructionPointer::<i32>::new(0);
        ip.delta = vector(1, 0);
        Vector::apply_delta(']', &mut ip);
        assert_eq!(ip.delta, vector(0, 1));
    }

    #[test]
    fn vector_push_pop_is_x_then_y() {
        let mut ip = InstructionPointer::<i32>::new(0);
        Vector::push_vector(&mut ip, vector(3, 4));
        assert_eq!(ip.stack(), &vec![3, 4]);
        assert_eq!(Vector::pop_vector(&mut ip), vector(3, 4));
    }
}
