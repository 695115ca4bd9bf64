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

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use num::{FromPrimitive, ToPrimitive};

use crate::fungespace::{vector, FungeValue};
use crate::interpreter::instruction_set::{InstructionContext, InstructionResult};
use crate::interpreter::ip::InstructionPointer;
use crate::interpreter::motion::MotionCmds;

/// From the catseye library
///
/// Fingerprint 0x52454643 ('REFC')
///
/// The REFC fingerprint allows vectors to be encoded into and decoded from
/// single scalar cell values.
///
/// After successfully loading REFC, the instructions `D` and `R` take on
/// new semantics.
///
/// `R` 'Reference' pops a vector off the stack, and pushes a scalar value
/// back onto the stack, unique within an internal list of references, which
/// refers to that vector.
///
/// `D` 'Dereference' pops a scalar value off the stack, and pushes the
/// vector back onto the stack which corresponds to that unique reference
/// value.
///
/// The reference list lives in the IP's `private_data` as a concrete
/// `(i64, i64)` table rather than `Vector<T>` directly, since `Any` requires
/// a `'static` payload and the cell type `T` carries no such bound; two IPs
/// that load REFC independently get separate lists, but an IP forked off
/// after loading shares the list it inherited (the table is deep-copied
/// along with the rest of `private_data` on `t`).
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.add_layer(&[('R', reference), ('D', dereference)]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.pop_layer(&['R', 'D'])
}

fn get_reflist<T: FungeValue>(ip: &mut InstructionPointer<T>) -> RefMut<Vec<(i64, i64)>> {
    if !ip.private_data.contains_key("REFC.reflist") {
        ip.private_data.insert(
            "REFC.reflist".to_owned(),
            Rc::new(RefCell::new(Vec::<(i64, i64)>::new())),
        );
    }
    ip.private_data
        .get("REFC.reflist")
        .and_then(|any_ref| any_ref.downcast_ref::<RefCell<Vec<(i64, i64)>>>())
        .map(|refcell| refcell.borrow_mut())
        .unwrap()
}

/// `R` pushes a stable reference id for a popped vector.
fn reference<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let v = MotionCmds::pop_vector(ctx.ip);
    let key = (
        v.x.to_i64().unwrap_or(0),
        v.y.to_i64().unwrap_or(0),
    );
    let ref_idx = {
        let mut rl = get_reflist(ctx.ip);
        match rl.iter().position(|k| *k == key) {
            Some(idx) => idx as i32,
            None => {
                rl.push(key);
                rl.len() as i32 - 1
            }
        }
    };
    ctx.ip.push(T::from(ref_idx));
    InstructionResult::Continue
}

/// `D` pushes back the vector a reference id stands for.
fn dereference<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    if let Some((x, y)) = ctx
        .ip
        .pop()
        .to_usize()
        .and_then(|idx| get_reflist(ctx.ip).get(idx).copied())
    {
        let v = vector(
            T::from_i64(x).unwrap_or_else(|| T::from(0)),
            T::from_i64(y).unwrap_or_else(|| T::from(0)),
        );
        MotionCmds::push_vector(ctx.ip, v);
    } else {
        ctx.ip.reflect();
    }
    InstructionResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fungespace::{vector, FungeSpace};
    use crate::interpreter::{IOMode, InterpreterEnv, LanguageStandard};

    struct NoEnv;
    impl InterpreterEnv for NoEnv {
        fn get_iomode(&self) -> IOMode {
            IOMode::Text
        }
        fn is_io_buffered(&self) -> bool {
            true
        }
        fn output_writer(&mut self) -> &mut dyn std::io::Write {
            unreachable!()
        }
        fn input_reader(&mut self) -> &mut dyn std::io::Read {
            unreachable!()
        }
        fn warn(&mut self, _msg: &str) {}
    }

    #[test]
    fn round_trips_through_reference_table() {
        let mut ip = InstructionPointer::<i32>::new(0);
        let mut space = FungeSpace::<i32>::new();
        let mut env = NoEnv;
        let mut ctx = InstructionContext {
            ip: &mut ip,
            space: &mut space,
            env: &mut env,
            standard: LanguageStandard::Funge98,
        };

        MotionCmds::push_vector(ctx.ip, vector(3, 4));
        reference(&mut ctx);
        let id = ctx.ip.pop();
        assert_eq!(id, 0);

        ctx.ip.push(id);
        dereference(&mut ctx);
        assert_eq!(MotionCmds::pop_vector(ctx.ip), vector(3, 4));
    }

    #[test]
    fn repeated_reference_reuses_the_same_id() {
        let mut ip = InstructionPointer::<i32>::new(0);
        let mut space = FungeSpace::<i32>::new();
        let mut env = NoEnv;
        let mut ctx = InstructionContext {
            ip: &mut ip,
            space: &mut space,
            env: &mut env,
            standard: LanguageStandard::Funge98,
        };

        MotionCmds::push_vector(ctx.ip, vector(1, 1));
        reference(&mut ctx);
        let a = ctx.ip.pop();

        MotionCmds::push_vector(ctx.ip, vector(1, 1));
        reference(&mut ctx);
        let b = ctx.ip.pop();

        assert_eq!(a, b);
    }
}
