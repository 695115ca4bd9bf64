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

pub mod app;
pub mod fungespace;
pub mod interpreter;

pub use crate::fungespace::{FungeSpace, FungeValue, Rect, Vector};
pub use crate::interpreter::{
    origin, string_to_fingerprint, ExecMode, IOMode, InstructionPointer, InstructionResult,
    Interpreter, InterpreterEnv, LanguageStandard, ProgramResult,
};
pub use crate::interpreter::fingerprints::{all_fingerprints, safe_fingerprints};

/// Create a new interpreter over a fresh, empty Funge-space.
///
/// `T` is the cell type (normally `i32` or `i64`). The returned interpreter
/// has no instruction pointers yet; load a program into its `space` with
/// [FungeSpace::load] and push a starting IP with
/// [Interpreter::spawn_initial_ip] before calling [Interpreter::run].
pub fn new_interpreter<T>(standard: LanguageStandard) -> Interpreter<T>
where
    T: FungeValue,
{
    Interpreter::new(standard)
}
