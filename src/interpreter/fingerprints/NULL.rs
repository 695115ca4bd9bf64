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
use crate::interpreter::instruction_set::{Handler, InstructionContext, InstructionResult};

const LETTERS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// After successfully loading fingerprint 0x4e554c4c, all 26 instructions
/// `A` to `Z` take on the semantics of `r`.
///
/// This can be loaded before loading a regular transparent fingerprint to
/// make it act opaquely.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    let layer: Vec<(char, Handler<T>)> = LETTERS.iter().map(|&c| (c, reflect as Handler<T>)).collect();
    ctx.ip.fingerprints.add_layer(&layer);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.pop_layer(LETTERS)
}

fn reflect<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.reflect();
    InstructionResult::Continue
}
