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

use std::io::{Read, Write};
use std::str;

use num::ToPrimitive;

use super::fingerprints;
use super::instructions;
use super::ip::InstructionPointer;
use super::motion::MotionCmds;
use super::{IOMode, InterpreterEnv, LanguageStandard};
use crate::fungespace::{vector, FungeSpace, FungeValue};

/// Result of executing a single instruction. Most instructions return
/// [InstructionResult::Continue].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionResult {
    /// Continue processing.
    Continue,
    /// Continue processing within the same tick without a fetch/advance
    /// cycle (used by `;`, and internally by `k`'s fetch-next step).
    Skip,
    /// Stay where execution left the IP; don't apply the normal
    /// tick-advance (used by Funge-98's `k`).
    StayPut,
    /// Spawn `n` additional duplicates of this IP (used by `t`).
    Fork(i32),
    /// Stop this IP (used by `@`).
    Stop,
    /// End the whole program with the given exit code (used by `q`).
    Exit(i32),
    /// Abort the program abnormally. Avoid if at all possible.
    Panic,
}

/// Borrowed interpreter state handed to an instruction while it runs.
pub struct InstructionContext<'a, T: FungeValue> {
    pub ip: &'a mut InstructionPointer<T>,
    pub space: &'a mut FungeSpace<T>,
    pub env: &'a mut dyn InterpreterEnv,
    pub standard: LanguageStandard,
}

/// A fingerprint-provided instruction handler.
pub type Handler<T> = fn(&mut InstructionContext<T>) -> InstructionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionMode {
    Normal,
    String,
}

/// The overlay of fingerprint-loaded handlers for the 26 letters A-Z.
///
/// Each letter has its own stack of layers; `(` pushes a layer, `)` pops
/// one, and only the topmost layer for a letter is active.
#[derive(Debug, Clone, Default)]
pub struct FingerprintOverlay<T: FungeValue> {
    layers: [Vec<Handler<T>>; 26],
}

impl<T: FungeValue> FingerprintOverlay<T> {
    pub fn new() -> Self {
        Self {
            layers: Default::default(),
        }
    }

    fn slot(c: char) -> Option<usize> {
        if c.is_ascii_uppercase() {
            Some((c as u8 - b'A') as usize)
        } else {
            None
        }
    }

    pub fn get(&self, c: char) -> Option<Handler<T>> {
        Self::slot(c).and_then(|i| self.layers[i].last().copied())
    }

    /// Push a new layer. `handlers` pairs each letter this fingerprint
    /// defines with its handler.
    pub fn add_layer(&mut self, handlers: &[(char, Handler<T>)]) {
        for &(c, f) in handlers {
            if let Some(i) = Self::slot(c) {
                self.layers[i].push(f);
            }
        }
    }

    /// Pop the top layer for each of `letters`, regardless of which
    /// fingerprint pushed it (matching every Funge-98 implementation's
    /// documented `)` behaviour: unloading is unconditional, not
    /// balance-checked).
    pub fn pop_layer(&mut self, letters: &[char]) -> bool {
        let mut any = false;
        for &c in letters {
            if let Some(i) = Self::slot(c) {
                if self.layers[i].pop().is_some() {
                    any = true;
                }
            }
        }
        any
    }
}

#[inline]
pub(super) fn exec_instruction<T: FungeValue>(
    raw: T,
    mode: InstructionMode,
    ctx: &mut InstructionContext<T>,
) -> (InstructionResult, InstructionMode) {
    match mode {
        InstructionMode::Normal => exec_normal_instruction(raw, ctx),
        InstructionMode::String => exec_string_instruction(raw, ctx),
    }
}

#[inline]
fn exec_normal_instruction<T: FungeValue>(
    raw: T,
    ctx: &mut InstructionContext<T>,
) -> (InstructionResult, InstructionMode) {
    let mut mode = InstructionMode::Normal;
    let result = match raw.try_to_char() {
        Some(' ') => InstructionResult::Skip,
        Some('@') => InstructionResult::Stop,
        Some('t') => InstructionResult::Fork(1),
        Some('q') => InstructionResult::Exit(ctx.ip.pop().to_i32().unwrap_or(-1)),
        Some('#') => {
            ctx.ip.location = ctx.ip.location + ctx.ip.delta;
            InstructionResult::Continue
        }
        Some(';') => {
            loop {
                ctx.ip.location = ctx.space.move_by(ctx.ip.location, ctx.ip.delta);
                if ctx.space.get(ctx.ip.location).to_char() == ';' {
                    break;
                }
            }
            InstructionResult::Skip
        }
        Some('$') => {
            ctx.ip.pop();
            InstructionResult::Continue
        }
        Some('n') => {
            ctx.ip.stack_mut().clear();
            InstructionResult::Continue
        }
        Some('\\') => {
            let a = ctx.ip.pop();
            let b = ctx.ip.pop();
            ctx.ip.push(a);
            ctx.ip.push(b);
            InstructionResult::Continue
        }
        Some(':') => {
            let n = ctx.ip.pop();
            ctx.ip.push(n);
            ctx.ip.push(n);
            InstructionResult::Continue
        }
        Some(d) if ('0'..='9').contains(&d) => {
            ctx.ip.push(((d as i32) - ('0' as i32)).into());
            InstructionResult::Continue
        }
        Some(d) if ('a'..='f').contains(&d) => {
            ctx.ip.push((0xa + (d as i32) - ('a' as i32)).into());
            InstructionResult::Continue
        }
        Some('"') => {
            mode = InstructionMode::String;
            InstructionResult::Continue
        }
        Some('\'') => {
            let loc = ctx.ip.location + ctx.ip.delta;
            ctx.ip.push(ctx.space.get(loc));
            ctx.ip.location = loc;
            InstructionResult::Continue
        }
        Some('s') => {
            let loc = ctx.ip.location + ctx.ip.delta;
            let v = ctx.ip.pop();
            ctx.space.set(loc, v);
            ctx.ip.location = loc;
            InstructionResult::Continue
        }
        Some('.') => {
            let s = format!("{} ", ctx.ip.pop());
            if ctx.env.output_writer().write_all(s.as_bytes()).is_err() {
                ctx.env.warn("IO error writing integer");
            }
            InstructionResult::Continue
        }
        Some(',') => {
            let c = ctx.ip.pop();
            let buf = match ctx.env.get_iomode() {
                IOMode::Text => c.to_char().to_string().into_bytes(),
                IOMode::Binary => vec![(c & T::from(0xff)).to_u8().unwrap_or(0)],
            };
            if ctx.env.output_writer().write_all(&buf).is_err() {
                ctx.env.warn("IO error writing character");
            }
            InstructionResult::Continue
        }
        Some('~') => {
            match ctx.env.get_iomode() {
                IOMode::Binary => {
                    let mut buf = [0_u8; 1];
                    match ctx.env.input_reader().read(&mut buf) {
                        Ok(1) => ctx.ip.push((buf[0] as i32).into()),
                        _ => ctx.ip.reflect(),
                    }
                }
                IOMode::Text => {
                    let mut buf = Vec::new();
                    loop {
                        let idx = buf.len();
                        buf.push(0_u8);
                        match ctx.env.input_reader().read(&mut buf[idx..]) {
                            Ok(1) => match str::from_utf8(&buf) {
                                Ok(s) => {
                                    if let Some(c) = s.chars().next() {
                                        ctx.ip.push((c as i32).into());
                                    } else {
                                        ctx.ip.reflect();
                                    }
                                    break;
                                }
                                Err(e) if e.error_len().is_some() => {
                                    ctx.ip.reflect();
                                    break;
                                }
                                Err(_) => {}
                            },
                            _ => {
                                ctx.ip.reflect();
                                break;
                            }
                        }
                    }
                }
            }
            InstructionResult::Continue
        }
        Some('&') => {
            let mut buf = Vec::new();
            let mut maybe_line = None;
            loop {
                let mut byte = [0_u8; 1];
                match ctx.env.input_reader().read(&mut byte) {
                    Ok(1) => {
                        if byte[0] == b'\n' {
                            maybe_line = str::from_utf8(&buf).ok().map(str::to_owned);
                            break;
                        }
                        buf.push(byte[0]);
                    }
                    _ => break,
                }
            }
            match maybe_line.and_then(|l| l.trim().parse::<i64>().ok()) {
                Some(n) => ctx.ip.push(T::from_i64(n).unwrap_or_else(|| T::from(0))),
                None => ctx.ip.reflect(),
            }
            InstructionResult::Continue
        }
        Some('+') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(a + b);
            InstructionResult::Continue
        }
        Some('-') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(a - b);
            InstructionResult::Continue
        }
        Some('*') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(a * b);
            InstructionResult::Continue
        }
        Some('/') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(if b != T::from(0) { a / b } else { T::from(0) });
            InstructionResult::Continue
        }
        Some('%') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(if b != T::from(0) { a % b } else { T::from(0) });
            InstructionResult::Continue
        }
        Some('`') => {
            let b = ctx.ip.pop();
            let a = ctx.ip.pop();
            ctx.ip.push(if a > b { T::from(1) } else { T::from(0) });
            InstructionResult::Continue
        }
        Some('!') => {
            let v = ctx.ip.pop();
            ctx.ip.push(if v == T::from(0) { T::from(1) } else { T::from(0) });
            InstructionResult::Continue
        }
        Some('j') => {
            let n = ctx.ip.pop();
            ctx.ip.location = ctx.ip.location + vector(ctx.ip.delta.x * n, ctx.ip.delta.y * n);
            InstructionResult::Continue
        }
        Some('x') => {
            ctx.ip.delta = MotionCmds::pop_vector(ctx.ip);
            InstructionResult::Continue
        }
        Some('p') => {
            let loc = MotionCmds::pop_vector(ctx.ip) + ctx.ip.storage_offset;
            let v = ctx.ip.pop();
            ctx.space.set(loc, v);
            InstructionResult::Continue
        }
        Some('g') => {
            let loc = MotionCmds::pop_vector(ctx.ip) + ctx.ip.storage_offset;
            let v = ctx.space.get(loc);
            ctx.ip.push(v);
            InstructionResult::Continue
        }
        Some('(') => {
            let count = ctx.ip.pop().to_usize().unwrap_or(0);
            let mut fpr = 0_i32;
            for _ in 0..count {
                fpr <<= 8;
                fpr += ctx.ip.pop().to_i32().unwrap_or(0);
            }
            if fpr != 0 && ctx.env.is_fingerprint_enabled(fpr) && fingerprints::load(ctx, fpr) {
                ctx.ip.push(fpr.into());
                ctx.ip.push(T::from(1));
            } else {
                ctx.ip.reflect();
            }
            InstructionResult::Continue
        }
        Some(')') => {
            let count = ctx.ip.pop().to_usize().unwrap_or(0);
            let mut fpr = 0_i32;
            for _ in 0..count {
                fpr <<= 8;
                fpr += ctx.ip.pop().to_i32().unwrap_or(0);
            }
            if fpr != 0 && fingerprints::unload(ctx, fpr) {
                ctx.ip.push(fpr.into());
                ctx.ip.push(T::from(1));
            } else {
                ctx.ip.reflect();
            }
            InstructionResult::Continue
        }
        Some('r') => {
            ctx.ip.reflect();
            InstructionResult::Continue
        }
        Some('z') => InstructionResult::Continue,
        Some('k') => instructions::iterate(ctx),
        Some('{') => instructions::begin_block(ctx),
        Some('}') => instructions::end_block(ctx),
        Some('u') => instructions::stack_under_stack(ctx),
        Some('i') => instructions::input_file(ctx),
        Some('o') => instructions::output_file(ctx),
        Some('=') => instructions::execute(ctx),
        Some('y') => instructions::sysinfo(ctx),
        Some(c) => {
            if MotionCmds::apply_delta(c, ctx.ip) {
                InstructionResult::Continue
            } else if let Some(handler) = ctx.ip.fingerprints.get(c) {
                handler(ctx)
            } else {
                ctx.ip.reflect();
                ctx.env.warn(&format!("Unknown instruction: '{}'", c));
                InstructionResult::Continue
            }
        }
        None => {
            ctx.ip.reflect();
            ctx.env.warn("Unknown non-Unicode instruction");
            InstructionResult::Continue
        }
    };
    (result, mode)
}

#[inline]
fn exec_string_instruction<T: FungeValue>(
    raw: T,
    ctx: &mut InstructionContext<T>,
) -> (InstructionResult, InstructionMode) {
    let prev_loc = ctx.ip.location - ctx.ip.delta;
    let prev_val = ctx.space.get(prev_loc);
    if prev_val == T::from(' ' as i32) {
        ctx.ip.push(prev_val);
    }
    let mode = if raw.to_char() == '"' {
        InstructionMode::Normal
    } else {
        ctx.ip.push(raw);
        InstructionMode::String
    };
    (InstructionResult::Continue, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nop<T: FungeValue>(_ctx: &mut InstructionContext<T>) -> InstructionResult {
        InstructionResult::Continue
    }

    #[test]
    fn overlay_layers() {
        let mut ov = FingerprintOverlay::<i32>::new();
        assert!(ov.get('A').is_none());
        ov.add_layer(&[('A', nop), ('B', nop)]);
        assert!(ov.get('A').is_some());
        assert!(ov.get('C').is_none());
        ov.pop_layer(&['A', 'B']);
        assert!(ov.get('A').is_none());
    }
}
