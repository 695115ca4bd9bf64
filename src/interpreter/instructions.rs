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

//! This module contains only the more complex instructions; the bulk of the
//! opcode table lives directly in `instruction_set::exec_normal_instruction`.

use std::cmp::Ordering;
use std::cmp::{max, min};
use std::mem::size_of;

use chrono::prelude::Utc;
use chrono::{Datelike, Timelike};
use pkg_version::{pkg_version_major, pkg_version_minor, pkg_version_patch};

use super::instruction_set::{exec_instruction, InstructionContext, InstructionMode, InstructionResult};
use super::motion::MotionCmds;
use super::{ExecMode, LanguageStandard};
use crate::fungespace::{vector, FungeValue};

/// `k`: fetch the next executable instruction (honoring space- and
/// `;`-comment-skipping) and run it `n` times.
///
/// Grounded on `examples/original_source/src/instructions/iterate.c`, the
/// only source in the corpus that documents the Funge-98 vs. Funge-109
/// "move past" divergence: in Funge-109, if the iterated instruction left
/// both the IP's position and delta unchanged, the IP jumps to the cell
/// after the one it just iterated; Funge-98 never does this, relying on
/// the ordinary post-instruction advance instead.
pub fn iterate<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let n = ctx.ip.pop();
    if n < T::from(0) {
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }

    let old_loc = ctx.ip.location;
    let old_delta = ctx.ip.delta;
    let target = ctx.space.fetch_next(old_loc, old_delta);
    let instr = ctx.space.get(target);

    if n == T::from(0) {
        // "surprising but defined" Funge-98 behaviour: `0k` swallows the
        // next instruction without ever executing it.
        ctx.ip.location = target;
        return InstructionResult::Continue;
    }

    if instr.to_char() == 'k' {
        ctx.env
            .warn("cannot execute k: nested iterate is undefined, reflecting");
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }

    let count = n.to_i64().unwrap_or(0).max(0);
    let mut loop_result = InstructionResult::Continue;
    let mut forks = 0_i32;
    for _ in 0..count {
        let (res, _) = exec_instruction(instr, InstructionMode::Normal, ctx);
        match res {
            InstructionResult::Continue => {}
            InstructionResult::Fork(k) => {
                forks += k;
                loop_result = InstructionResult::Fork(forks);
            }
            other => {
                // `@` executes once and stops the IP; any other
                // tick-ending result also stops the iteration early.
                loop_result = other;
                break;
            }
        }
    }

    if ctx.standard == LanguageStandard::Funge109
        && ctx.ip.location == old_loc
        && ctx.ip.delta == old_delta
    {
        ctx.ip.location = target;
    }

    loop_result
}

/// `{`: push a new stack, transferring `n` cells from the old top
/// (zero-padded if it holds fewer), and record the storage offset.
pub fn begin_block<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let ip = &mut *ctx.ip;
    if let Some(n) = ip.pop().to_isize() {
        let n_to_take = max(0, min(n, ip.stack().len() as isize));
        let zeros_for_toss = max(0, n - n_to_take);
        let zeros_for_soss = max(0, -n);

        let split_idx = ip.stack().len() - n_to_take as usize;
        let mut transfer_elems = ip.stack_mut().split_off(split_idx);

        for _ in 0..zeros_for_soss {
            ip.push(T::from(0));
        }

        let offset = ip.storage_offset;
        MotionCmds::push_vector(ip, offset);

        ip.stack_stack.insert(0, Vec::new());

        for _ in 0..zeros_for_toss {
            ip.push(T::from(0));
        }
        ip.stack_mut().append(&mut transfer_elems);

        ip.storage_offset = ip.location + ip.delta;
    } else {
        ip.reflect();
    }
    InstructionResult::Continue
}

/// `}`: pop the current stack back off, restoring the storage offset and
/// transferring `n` cells back (or popping `|n|` if negative). Reflects if
/// only one stack remains.
pub fn end_block<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let ip = &mut *ctx.ip;
    if ip.stack_stack.len() <= 1 {
        ip.reflect();
        return InstructionResult::Continue;
    }
    if let Some(n) = ip.pop().to_isize() {
        let mut toss = ip.stack_stack.remove(0);
        ip.storage_offset = MotionCmds::pop_vector(ip);

        if n < 0 {
            for _ in 0..(-n) {
                ip.pop();
            }
        } else {
            let n_to_take = max(0, min(n, toss.len() as isize));
            let zeros_for_soss = n - n_to_take;
            for _ in 0..zeros_for_soss {
                ip.push(T::from(0));
            }
            let split_idx = toss.len() - n_to_take as usize;
            ip.stack_mut().append(&mut toss.split_off(split_idx));
        }
    } else {
        ip.reflect();
    }
    InstructionResult::Continue
}

/// `u`: transfer cells between the top two stacks.
pub fn stack_under_stack<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let ip = &mut *ctx.ip;
    if ip.stack_stack.len() <= 1 {
        ip.reflect();
        return InstructionResult::Continue;
    }
    if let Some(n) = ip.pop().to_isize() {
        match n.cmp(&0) {
            Ordering::Greater => {
                for _ in 0..n {
                    let v = ip.stack_stack[1].pop().unwrap_or_else(|| T::from(0));
                    ip.push(v);
                }
            }
            Ordering::Less => {
                for _ in 0..(-n) {
                    let v = ip.pop();
                    ip.stack_stack[1].push(v);
                }
            }
            Ordering::Equal => {}
        }
    } else {
        ip.reflect();
    }
    InstructionResult::Continue
}

/// `i`: load a file into Funge-space at a popped destination vector.
/// Flag bit 0 selects linear (raw sequential-byte) loading over the usual
/// newline-delimited text layout.
pub fn input_file<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let filename = ctx.ip.pop_0gnirts();
    let flags = ctx.ip.pop();
    let dest = MotionCmds::pop_vector(ctx.ip);

    if !ctx.env.have_file_input() {
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    match ctx.env.read_file(&filename) {
        Ok(data) => {
            let linear = flags & T::from(1) != T::from(0);
            let rect = ctx.space.load(dest, &data, linear);
            let size = rect.size();
            MotionCmds::push_vector(ctx.ip, size);
            MotionCmds::push_vector(ctx.ip, dest);
        }
        Err(_) => ctx.ip.reflect(),
    }
    InstructionResult::Continue
}

/// `o`: save a rectangular region of Funge-space to a file. Flag bit 0
/// selects binary (dense byte dump) over text (trailing-space-trimmed,
/// newline-terminated rows).
pub fn output_file<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let filename = ctx.ip.pop_0gnirts();
    let flags = ctx.ip.pop();
    let start = MotionCmds::pop_vector(ctx.ip);
    let size = MotionCmds::pop_vector(ctx.ip);

    if !ctx.env.have_file_output() {
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    let binary = flags & T::from(1) != T::from(0);
    let data = ctx.space.save(start, size, !binary);
    if ctx.env.write_file(&filename, &data).is_err() {
        ctx.ip.reflect();
    }
    InstructionResult::Continue
}

/// `=`: hand a 0gnirts off to the environment's shell, per
/// [super::ExecMode].
pub fn execute<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    if ctx.env.have_execute() == ExecMode::Disabled {
        ctx.ip.reflect();
    } else {
        let cmd = ctx.ip.pop_0gnirts();
        let code = ctx.env.execute_command(&cmd);
        ctx.ip.push(T::from(code));
    }
    InstructionResult::Continue
}

/// `y`: push the sysinfo cell block (or, if `n` is nonzero, just the n-th
/// cell of it, Funge-98's "pick" convention).
pub fn sysinfo<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let mut cells = Vec::<T>::new();
    let n = ctx.ip.pop();
    let exec_flag = ctx.env.have_execute();

    let mut impl_flags = 0x1; // concurrent Funge-98
    if ctx.env.have_file_input() {
        impl_flags |= 0x2;
    }
    if ctx.env.have_file_output() {
        impl_flags |= 0x4;
    }
    if exec_flag != ExecMode::Disabled {
        impl_flags |= 0x8;
    }
    if !ctx.env.is_io_buffered() {
        impl_flags |= 0x10;
    }
    cells.push(T::from(impl_flags));
    cells.push(T::from(size_of::<T>() as i32));
    cells.push(T::from(ctx.env.handprint()));
    cells.push(T::from(
        (pkg_version_major!() as i32) * 1_000_000
            + (pkg_version_minor!() as i32) * 1_000
            + (pkg_version_patch!() as i32),
    ));
    cells.push(T::from(match exec_flag {
        ExecMode::Disabled => 0,
        ExecMode::System => 1,
        ExecMode::SpecificShell => 2,
        ExecMode::SameShell => 3,
    }));
    cells.push(T::from(std::path::MAIN_SEPARATOR as i32));
    cells.push(T::from(2)); // scalars per vector: this crate is 2-D only
    cells.push(T::from(ctx.ip.id));
    cells.push(T::from(0)); // team number: unused

    let mut tmp = Vec::new();
    MotionCmds::push_vector_onto(&mut tmp, ctx.ip.location);
    cells.extend(tmp.into_iter().rev());
    let mut tmp = Vec::new();
    MotionCmds::push_vector_onto(&mut tmp, ctx.ip.delta);
    cells.extend(tmp.into_iter().rev());
    let mut tmp = Vec::new();
    MotionCmds::push_vector_onto(&mut tmp, ctx.ip.storage_offset);
    cells.extend(tmp.into_iter().rev());

    let bounds = ctx.space.bounding_box();
    let least = bounds
        .map(|b| b.min)
        .unwrap_or_else(|| vector(T::from(0), T::from(0)));
    let greatest_span = bounds
        .map(|b| b.max - b.min)
        .unwrap_or_else(|| vector(T::from(0), T::from(0)));
    let mut tmp = Vec::new();
    MotionCmds::push_vector_onto(&mut tmp, least);
    cells.extend(tmp.into_iter().rev());
    let mut tmp = Vec::new();
    MotionCmds::push_vector_onto(&mut tmp, greatest_span);
    cells.extend(tmp.into_iter().rev());

    let datetime = Utc::now();
    cells.push(T::from(
        ((datetime.year() - 1900) * 256 * 256)
            + (datetime.month() as i32 * 256)
            + datetime.day() as i32,
    ));
    cells.push(T::from(
        (datetime.hour() as i32 * 256 * 256)
            + (datetime.minute() as i32 * 256)
            + datetime.second() as i32,
    ));

    cells.push(T::from(ctx.ip.stack_stack.len() as i32));
    for stack in ctx.ip.stack_stack.iter() {
        cells.push(T::from(stack.len() as i32));
    }

    for arg in ctx.env.argv() {
        for c in arg.chars() {
            cells.push(T::from(c as i32));
        }
        cells.push(T::from(0));
    }
    cells.push(T::from(0));

    for (key, value) in ctx.env.env_vars() {
        for c in format!("{}={}", key, value).chars() {
            cells.push(T::from(c as i32));
        }
        cells.push(T::from(0));
    }
    cells.push(T::from(0));

    let total = T::from(cells.len() as i32);
    if n > total {
        let pick_n = (n - total).to_isize().unwrap_or(1);
        let idx = ctx.ip.stack().len() as isize - pick_n;
        if idx >= 0 {
            ctx.ip.push(ctx.ip.stack()[idx as usize]);
        }
    } else if n > T::from(0) {
        if let Some(i) = n.to_usize() {
            if i >= 1 && i <= cells.len() {
                ctx.ip.push(cells[i - 1]);
            }
        }
    } else {
        for cell in cells.into_iter().rev() {
            ctx.ip.push(cell);
        }
    }

    InstructionResult::Continue
}
