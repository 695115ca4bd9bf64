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

use crate::fungespace::FungeValue;
use crate::interpreter::instruction_set::{InstructionContext, InstructionResult};

/// From the catseye library
///
/// Fingerprint 0x424f4f4c ('BOOL')
///
/// After successfully loading BOOL, the instructions `A`, `O`, `N`, and `X`
/// take on bitwise semantics beyond plain Funge-98's arithmetic-only set.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip
        .fingerprints
        .add_layer(&[('A', and), ('O', or), ('N', not), ('X', xor)]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.pop_layer(&['A', 'O', 'N', 'X'])
}

/// `A` bitwise and.
fn and<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    ctx.ip.push(a & b);
    InstructionResult::Continue
}

/// `O` bitwise or.
fn or<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    ctx.ip.push(a | b);
    InstructionResult::Continue
}

/// `N` bitwise not.
fn not<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let n = ctx.ip.pop();
    ctx.ip.push(!n);
    InstructionResult::Continue
}

/// `X` bitwise xor.
fn xor<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let b = ctx.ip.pop();
    let a = ctx.ip.pop();
    ctx.ip.push(a ^ b);
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

    #[test]
    fn and_or_xor_not() {
        let mut ip = InstructionPointer::<i32>::new(0);
        let mut space = FungeSpace::<i32>::new();
        let mut env = NoEnv;
        let mut ctx = InstructionContext {
            ip: &mut ip,
            space: &mut space,
            env: &mut env,
            standard: LanguageStandard::Funge98,
        };

        ctx.ip.push(0b1100);
        ctx.ip.push(0b1010);
        and(&mut ctx);
        assert_eq!(ctx.ip.pop(), 0b1000);

        ctx.ip.push(0b1100);
        ctx.ip.push(0b1010);
        or(&mut ctx);
        assert_eq!(ctx.ip.pop(), 0b1110);

        ctx.ip.push(0b1100);
        ctx.ip.push(0b1010);
        xor(&mut ctx);
        assert_eq!(ctx.ip.pop(), 0b0110);

        ctx.ip.push(0);
        not(&mut ctx);
        assert_eq!(ctx.ip.pop(), -1);
    }
}
