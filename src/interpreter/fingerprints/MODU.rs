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

use divrem::DivRem;

use crate::fungespace::FungeValue;
use crate::interpreter::instruction_set::{InstructionContext, InstructionResult};

/// From the catseye library
///
/// Fingerprint 0x4d4f4455 ('MODU')
///
/// The MODU fingerprint implements some of the finer, less-well-agreed-upon
/// points of modulo arithmetic. With positive arguments, these instructions
/// work exactly the same as `%` does. However, when negative values are
/// involved, they all work differently:
///
/// `M`: signed-result modulo (floor division remainder).
/// `U`: Sam Holden's unsigned-result modulo (Euclidean remainder).
/// `R`: C-language integer remainder (truncating division).
///
/// For all definitions, given `n / d = q rem r`, `q * d + r = n` must hold.
/// `R` is the truncating remainder Rust's own `%` already gives. `M` rounds
/// *q* toward -∞ (matching CCBI, cfunge, and pyfunge's default). `U` rounds
/// *q* such that *r* is always non-negative.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip
        .fingerprints
        .add_layer(&[('M', signed_rem), ('U', unsigned_rem), ('R', c_rem)]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.pop_layer(&['M', 'U', 'R'])
}

/// `M` floored-division remainder.
fn signed_rem<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    if b == T::from(0) {
        ctx.ip.push(T::from(0));
    } else {
        let (q, r) = a.div_rem(b);
        ctx.ip.push(if q < T::from(0) { r + b } else { r });
    }
    InstructionResult::Continue
}

/// `U` Euclidean remainder: always non-negative.
fn unsigned_rem<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    if b == T::from(0) {
        ctx.ip.push(T::from(0));
    } else {
        let r = a % b;
        ctx.ip.push(if r < T::from(0) {
            if b > T::from(0) {
                r + b
            } else {
                r - b
            }
        } else {
            r
        });
    }
    InstructionResult::Continue
}

/// `R` C-language truncating remainder.
fn c_rem<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    ctx.ip.push(if b != T::from(0) { a % b } else { T::from(0) });
    InstructionResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fungespace::FungeSpace;
    use crate::interpreter::{IOMode, InstructionPointer, InterpreterEnv, LanguageStandard};

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

    fn ctx_on<'a>(
        ip: &'a mut InstructionPointer<i32>,
        space: &'a mut FungeSpace<i32>,
        env: &'a mut NoEnv,
    ) -> InstructionContext<'a, i32> {
        InstructionContext {
            ip,
            space,
            env,
            standard: LanguageStandard::Funge98,
        }
    }

    #[test]
    fn negative_moduli_differ_by_definition() {
        let mut ip = InstructionPointer::<i32>::new(0);
        let mut space = FungeSpace::<i32>::new();
        let mut env = NoEnv;

        ip.push(-7);
        ip.push(3);
        let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
        signed_rem(&mut ctx);
        assert_eq!(ctx.ip.pop(), 2); // floor(-7/3) = -3, -3*3 + 2 = -7

        ip.push(-7);
        ip.push(3);
        let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
        unsigned_rem(&mut ctx);
        assert_eq!(ctx.ip.pop(), 2);

        ip.push(-7);
        ip.push(3);
        let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
        c_rem(&mut ctx);
        assert_eq!(ctx.ip.pop(), -1); // truncating: -7 % 3 == -1
    }
}
