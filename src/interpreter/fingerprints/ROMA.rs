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
/// Fingerprint 0x524f4d41 ('ROMA')
///
/// After successfully loading ROMA, the instructions `C`, `D`, `I`, `L`,
/// `M`, `V`, and `X` take on new semantics.
///
/// -   `C` pushes 100 onto the stack.
/// -   `D` pushes 500 onto the stack.
/// -   `I` pushes 1 onto the stack.
/// -   `L` pushes 50 onto the stack.
/// -   `M` pushes 1000 onto the stack.
/// -   `V` pushes 5 onto the stack.
/// -   `X` pushes 10 onto the stack.
///
/// Note that these are just digits, you still have to do the arithmetic
/// yourself. Executing `MCMLXXXIV` will not leave 1984 on the stack. But
/// executing `MCM\-+LXXX+++IV\-++` should.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.add_layer(&[
        ('I', unum),
        ('V', quinque),
        ('X', decem),
        ('L', quinquaginta),
        ('C', centum),
        ('D', quingenti),
        ('M', mille),
    ]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip
        .fingerprints
        .pop_layer(&['I', 'V', 'X', 'L', 'C', 'D', 'M'])
}

fn unum<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(1));
    InstructionResult::Continue
}

fn quinque<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(5));
    InstructionResult::Continue
}

fn decem<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(10));
    InstructionResult::Continue
}

fn quinquaginta<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(50));
    InstructionResult::Continue
}

fn centum<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(100));
    InstructionResult::Continue
}

fn quingenti<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(500));
    InstructionResult::Continue
}

fn mille<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(1000));
    InstructionResult::Continue
}
