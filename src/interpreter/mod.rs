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

pub mod fingerprints;
pub mod instruction_set;
mod instructions;
pub mod ip;
pub mod motion;

use std::io::{Read, Write};

use self::instruction_set::{exec_instruction, InstructionContext};
use crate::fungespace::{vector, FungeSpace, FungeValue, Vector};

pub use self::instruction_set::{FingerprintOverlay, Handler, InstructionResult};
pub use self::ip::InstructionPointer;
pub use self::motion::MotionCmds;
pub use fingerprints::string_to_fingerprint;

/// Possible results of calling [Interpreter::run].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramResult {
    /// Program finished with the indicated exit code.
    Done(i32),
    /// Catastrophic failure (e.g. a wrap loop that never re-entered the
    /// bounding rectangle).
    Panic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOMode {
    Text,
    Binary,
}

/// Which dialect of the language to run as. `q`/`r` and `k`'s "move past"
/// rule differ between Funge-98 and the (loosely specified) Funge-109
/// successor; Befunge-93 is treated as a restricted Funge-98.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStandard {
    Befunge93,
    Funge98,
    Funge109,
}

/// Execution mode as reported by the sysinfo (`y`) instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Disabled,
    System,
    SpecificShell,
    SameShell,
}

/// An interpreter environment provides the things that live outside
/// Funge-space proper: IO streams, the file system, the environment block,
/// and the policy knobs (sandboxing, fingerprint allow-list, warnings) that
/// a command-line, embedded, or test-harness caller configures differently.
/// It is consumed as `&mut dyn InterpreterEnv`, threaded explicitly through
/// every instruction, never as global state.
pub trait InterpreterEnv {
    fn get_iomode(&self) -> IOMode;
    /// Should sysinfo (`y`) report IO as buffered?
    fn is_io_buffered(&self) -> bool;
    fn output_writer(&mut self) -> &mut dyn Write;
    fn input_reader(&mut self) -> &mut dyn Read;
    /// Called on warnings (unknown instruction, nested `k`, ...). Expected
    /// to check its own `-w` flag before printing anything.
    fn warn(&mut self, msg: &str);
    /// What handprint should sysinfo (`y`) report? Default: 0x4d455346 ("MESF").
    fn handprint(&self) -> i32 {
        0x4d455346
    }
    fn have_file_input(&self) -> bool {
        false
    }
    fn have_file_output(&self) -> bool {
        false
    }
    fn have_execute(&self) -> ExecMode {
        ExecMode::Disabled
    }
    fn read_file(&mut self, _filename: &str) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
    }
    fn write_file(&mut self, _filename: &str, _content: &[u8]) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
    }
    fn execute_command(&mut self, _command: &str) -> i32 {
        -1
    }
    fn env_vars(&mut self) -> Vec<(String, String)> {
        Vec::new()
    }
    fn argv(&mut self) -> Vec<String> {
        Vec::new()
    }
    /// Is the named fingerprint (packed letters) available in this
    /// environment? See also [fingerprints::safe_fingerprints].
    fn is_fingerprint_enabled(&self, _fpr: i32) -> bool {
        false
    }
    /// Called once before each instruction executes, given the IP's id and
    /// a human-readable `<location> <instruction>` description. Discarded by
    /// default; a `-t`-honouring caller overrides it to print when the
    /// configured trace level is high enough.
    fn trace(&mut self, _ip_id: i32, _description: &str) {}
}

/// One running program: its Funge-space and the live instruction pointers
/// traversing it.
pub struct Interpreter<T: FungeValue> {
    pub space: FungeSpace<T>,
    pub ips: Vec<InstructionPointer<T>>,
    pub standard: LanguageStandard,
    next_id: i32,
}

impl<T: FungeValue> Interpreter<T> {
    pub fn new(standard: LanguageStandard) -> Self {
        Interpreter {
            space: FungeSpace::new(),
            ips: Vec::new(),
            standard,
            next_id: 0,
        }
    }

    /// Spawn the program's initial IP at the origin, moving east, and
    /// return its id. Call once after loading a program into `self.space`.
    pub fn spawn_initial_ip(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        self.ips.push(InstructionPointer::new(id));
        id
    }

    fn fresh_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run the loaded program to completion (or until it panics).
    pub fn run(&mut self, env: &mut dyn InterpreterEnv) -> ProgramResult {
        if self.ips.is_empty() {
            self.spawn_initial_ip();
        }

        loop {
            // Snapshotting the tick length means IPs spawned mid-tick (by
            // `t`, or by `k` repeating `t`) run starting next tick, per
            // spec.md §5's ordering guarantee.
            let tick_len = self.ips.len();
            let mut ip_idx = 0;
            let mut visited = 0;
            while visited < tick_len && ip_idx < self.ips.len() {
                visited += 1;
                match self.step_one(ip_idx, env) {
                    StepOutcome::Advance(shift) => ip_idx += 1 + shift,
                    StepOutcome::Stopped => {
                        self.ips.remove(ip_idx);
                        // The IP that was at ip_idx+1 is now at ip_idx; don't
                        // advance the cursor so it gets its turn this tick.
                    }
                    StepOutcome::Exit(code) => return ProgramResult::Done(code),
                    StepOutcome::Panic => return ProgramResult::Panic,
                }
            }

            if self.ips.is_empty() {
                return ProgramResult::Done(0);
            }
        }
    }

    /// Execute exactly one instruction (plus any internal `Skip` loop, e.g.
    /// `;...;` comment-skipping) for the IP at `ip_idx`, then advance it.
    /// Returns how many new IPs were inserted *before* `ip_idx` (from
    /// forking), so the caller can keep its scan index correct.
    fn step_one(&mut self, ip_idx: usize, env: &mut dyn InterpreterEnv) -> StepOutcome {
        let mut mode = self.ips[ip_idx].mode;
        let mut skip_guard = 0usize;
        loop {
            let raw = self.space.get(self.ips[ip_idx].location);
            env.trace(
                self.ips[ip_idx].id,
                &format!("{} {}", self.ips[ip_idx].location, raw),
            );
            let (result, new_mode) = {
                let ip = &mut self.ips[ip_idx];
                let mut ctx = InstructionContext {
                    ip,
                    space: &mut self.space,
                    env,
                    standard: self.standard,
                };
                exec_instruction(raw, mode, &mut ctx)
            };
            mode = new_mode;
            self.ips[ip_idx].mode = mode;

            match result {
                InstructionResult::Continue => {
                    self.advance(ip_idx);
                    return StepOutcome::Advance(0);
                }
                InstructionResult::Skip => {
                    self.advance(ip_idx);
                    skip_guard += 1;
                    if skip_guard > 1_000_000 {
                        return StepOutcome::Panic;
                    }
                    continue;
                }
                InstructionResult::StayPut => {
                    return StepOutcome::Advance(0);
                }
                InstructionResult::Fork(n) => {
                    let n = n.max(0) as usize;
                    for _ in 0..n {
                        let new_id = self.fresh_id();
                        let mut dup = self.ips[ip_idx].forked(new_id);
                        dup.location = self.space.fetch_next(dup.location, dup.delta);
                        self.ips.insert(ip_idx, dup);
                    }
                    self.advance(ip_idx + n);
                    return StepOutcome::Advance(n);
                }
                InstructionResult::Stop => {
                    return StepOutcome::Stopped;
                }
                InstructionResult::Exit(code) => {
                    return StepOutcome::Exit(code);
                }
                InstructionResult::Panic => {
                    return StepOutcome::Panic;
                }
            }
        }
    }

    /// Move `self.ips[ip_idx]` one step along its delta, applying wrap and
    /// the `;`-comment / space skip (spec.md §4.D's "fetch-next-executable").
    fn advance(&mut self, ip_idx: usize) {
        let ip = &mut self.ips[ip_idx];
        ip.location = self.space.fetch_next(ip.location, ip.delta);
    }
}

enum StepOutcome {
    Advance(usize),
    Stopped,
    Exit(i32),
    Panic,
}

/// Vector helper re-exported for callers that need to build a starting
/// position without depending on `fungespace` directly.
pub fn origin<T: FungeValue>() -> Vector<T> {
    vector(T::from(0), T::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct NoEnv {
        output: Vec<u8>,
        input: io::Empty,
        warnings: Vec<String>,
    }

    impl InterpreterEnv for NoEnv {
        fn get_iomode(&self) -> IOMode {
            IOMode::Text
        }
        fn is_io_buffered(&self) -> bool {
            true
        }
        fn output_writer(&mut self) -> &mut dyn Write {
            &mut self.output
        }
        fn input_reader(&mut self) -> &mut dyn Read {
            &mut self.input
        }
        fn warn(&mut self, msg: &str) {
            self.warnings.push(msg.to_owned());
        }
    }

    fn run_program(src: &[u8]) -> (ProgramResult, String) {
        let mut interp = Interpreter::<i64>::new(LanguageStandard::Funge98);
        interp.space.load(origin(), src, true);
        interp.spawn_initial_ip();
        let mut env = NoEnv {
            output: Vec::new(),
            input: io::empty(),
            warnings: Vec::new(),
        };
        let result = interp.run(&mut env);
        (result, String::from_utf8_lossy(&env.output).into_owned())
    }

    #[test]
    fn hello_world() {
        let (result, out) = run_program(b"\"!dlroW ,olleH\">:#,_@");
        assert_eq!(result, ProgramResult::Done(0));
        assert_eq!(out, "Hello, World!");
    }

    #[test]
    fn trampoline_skips_one_cell() {
        let (result, out) = run_program(b"#v|@\n  >1.@");
        assert_eq!(result, ProgramResult::Done(0));
        assert_eq!(out, "1 ");
    }

    #[test]
    fn fork_prints_from_duplicate() {
        let (result, out) = run_program(b"1t2.@");
        assert_eq!(result, ProgramResult::Done(0));
        assert_eq!(out, "2 ");
    }
}
