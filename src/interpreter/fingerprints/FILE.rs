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

use std::sync::{Mutex, OnceLock};

use num::{FromPrimitive, ToPrimitive};

use crate::fungespace::{vector, FungeValue};
use crate::interpreter::instruction_set::{InstructionContext, InstructionResult};
use crate::interpreter::motion::MotionCmds;

/// Fingerprint 0x46494c45 ('FILE')
///
/// File input/output beyond the core `i`/`o` instructions: handles stay open
/// across multiple `R`/`W`/`G`/`L`/`S` calls instead of reading or writing
/// the whole file at once. Ported from cfunge's `FILE.c`, adapted to
/// [crate::interpreter::InterpreterEnv]'s whole-file `read_file`/`write_file`
/// interface: each handle buffers the file's full contents in memory and
/// flushes them back on `C` (close) if the handle was opened for writing and
/// has been modified.
///
/// The handle table is process-global (a real file descriptor would be too,
/// in the C original) rather than per-IP, so it lives behind a `Mutex`
/// instead of in `private_data`.
struct Handle {
    filename: String,
    buf: Vec<u8>,
    pos: usize,
    writable: bool,
    dirty: bool,
    /// Funge-space location `R`/`W` stream bytes to/from, set by `O`'s
    /// vector argument.
    space_buf: (i64, i64),
}

fn handles() -> &'static Mutex<Vec<Option<Handle>>> {
    static HANDLES: OnceLock<Mutex<Vec<Option<Handle>>>> = OnceLock::new();
    HANDLES.get_or_init(|| Mutex::new(Vec::new()))
}

fn allocate(h: Handle) -> i32 {
    let mut table = handles().lock().unwrap();
    if let Some(slot) = table.iter_mut().position(|s| s.is_none()) {
        table[slot] = Some(h);
        slot as i32
    } else {
        table.push(Some(h));
        table.len() as i32 - 1
    }
}

fn peek_handle_id<T: FungeValue>(ip: &mut crate::interpreter::ip::InstructionPointer<T>) -> Option<usize> {
    ip.stack().first().and_then(|v| v.to_usize())
}

pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.add_layer(&[
        ('C', close),
        ('D', delete),
        ('G', get_line),
        ('L', tell),
        ('O', open),
        ('P', put_string),
        ('R', read_bytes),
        ('S', seek),
        ('W', write_bytes),
    ]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip
        .fingerprints
        .pop_layer(&['C', 'D', 'G', 'L', 'O', 'P', 'R', 'S', 'W'])
}

/// `O` open a file: pops a Funge-space buffer vector, a numeric mode, then
/// the filename string; pushes the new handle.
fn open<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let buf_vec = MotionCmds::pop_vector(ctx.ip);
    let mode = ctx.ip.pop().to_i32().unwrap_or(-1);
    let filename = ctx.ip.pop_0gnirts();

    let (writable, append, truncate) = match mode {
        0 => (false, false, false), // rb
        1 => (true, false, true),   // wb
        2 => (true, true, false),   // ab
        3 => (true, false, false),  // r+b
        4 => (true, false, true),   // w+b
        5 => (true, true, false),   // a+b
        _ => {
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };

    if (writable && !ctx.env.have_file_output()) || (!writable && !ctx.env.have_file_input()) {
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }

    let existing = ctx.env.read_file(&filename).ok();
    let buf = if truncate {
        Vec::new()
    } else {
        existing.clone().unwrap_or_default()
    };
    if existing.is_none() && !writable {
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    let pos = if append { buf.len() } else { 0 };

    let handle_id = allocate(Handle {
        filename,
        buf,
        pos,
        writable,
        dirty: false,
        space_buf: (
            buf_vec.x.to_i64().unwrap_or(0),
            buf_vec.y.to_i64().unwrap_or(0),
        ),
    });
    ctx.ip.push(T::from(handle_id));
    InstructionResult::Continue
}

/// `C` close a handle, flushing it to disk if it was written to.
fn close<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let id = ctx.ip.pop().to_usize();
    let entry = id.and_then(|id| handles().lock().unwrap().get_mut(id).and_then(Option::take));
    match entry {
        Some(h) => {
            if h.writable && h.dirty && ctx.env.write_file(&h.filename, &h.buf).is_err() {
                ctx.ip.reflect();
            }
        }
        None => ctx.ip.reflect(),
    }
    InstructionResult::Continue
}

/// `D` delete a file named by a popped string.
fn delete<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let filename = ctx.ip.pop_0gnirts();
    if !ctx.env.have_file_output() || std::fs::remove_file(&filename).is_err() {
        ctx.ip.reflect();
    }
    InstructionResult::Continue
}

/// `G` read one line (CRLF- or LF-terminated) from a peeked handle, pushing
/// the string followed by its length.
fn get_line<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let id = peek_handle_id(ctx.ip);
    let mut table = handles().lock().unwrap();
    let h = match id.and_then(|id| table.get_mut(id).and_then(Option::as_mut)) {
        Some(h) => h,
        None => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };

    let start = h.pos;
    let mut end = start;
    while end < h.buf.len() && h.buf[end] != b'\n' {
        end += 1;
    }
    let mut line_end = end;
    if line_end > start && h.buf[line_end - 1] == b'\r' {
        line_end -= 1;
    }
    let line = String::from_utf8_lossy(&h.buf[start..line_end]).into_owned();
    h.pos = if end < h.buf.len() { end + 1 } else { end };
    let len = line.chars().count();
    drop(table);

    ctx.ip.push_0gnirts(&line);
    ctx.ip.push(T::from_i64(len as i64).unwrap_or_else(|| T::from(0)));
    InstructionResult::Continue
}

/// `L` push the peeked handle's current file position.
fn tell<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let id = peek_handle_id(ctx.ip);
    let pos = id.and_then(|id| handles().lock().unwrap().get(id).and_then(|s| s.as_ref()).map(|h| h.pos));
    match pos {
        Some(p) => ctx.ip.push(T::from_i64(p as i64).unwrap_or_else(|| T::from(0))),
        None => ctx.ip.reflect(),
    }
    InstructionResult::Continue
}

/// `S` seek: pops a whence (0 SET, 1 CUR, 2 END) then an offset, applies it
/// to the peeked handle.
fn seek<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let whence = ctx.ip.pop().to_i32().unwrap_or(-1);
    let offset = ctx.ip.pop().to_i64().unwrap_or(0);
    let id = peek_handle_id(ctx.ip);
    let mut table = handles().lock().unwrap();
    let h = match id.and_then(|id| table.get_mut(id).and_then(Option::as_mut)) {
        Some(h) => h,
        None => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };
    let base = match whence {
        0 => 0i64,
        1 => h.pos as i64,
        2 => h.buf.len() as i64,
        _ => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };
    let new_pos = base + offset;
    if new_pos < 0 {
        drop(table);
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    h.pos = (new_pos as usize).min(h.buf.len());
    InstructionResult::Continue
}

/// `P` append a popped string to the peeked handle's buffer.
fn put_string<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let s = ctx.ip.pop_0gnirts();
    let id = peek_handle_id(ctx.ip);
    let mut table = handles().lock().unwrap();
    let h = match id.and_then(|id| table.get_mut(id).and_then(Option::as_mut)) {
        Some(h) => h,
        None => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };
    if !h.writable {
        drop(table);
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    let bytes = s.as_bytes();
    let end = h.pos + bytes.len();
    if end > h.buf.len() {
        h.buf.resize(end, 0);
    }
    h.buf[h.pos..end].copy_from_slice(bytes);
    h.pos = end;
    h.dirty = true;
    InstructionResult::Continue
}

/// `R` pops a byte count, peeks the handle, and copies that many bytes from
/// the file into Funge-space starting at the handle's buffer vector,
/// advancing only in the x direction, one cell per byte.
fn read_bytes<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let n = ctx.ip.pop().to_usize().unwrap_or(0);
    let id = peek_handle_id(ctx.ip);
    let mut table = handles().lock().unwrap();
    let h = match id.and_then(|id| table.get_mut(id).and_then(Option::as_mut)) {
        Some(h) => h,
        None => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };
    let avail = h.buf.len().saturating_sub(h.pos);
    let n = n.min(avail);
    let bytes = h.buf[h.pos..h.pos + n].to_vec();
    let (bx, by) = h.space_buf;
    h.pos += n;
    drop(table);

    let origin = vector(
        T::from_i64(bx).unwrap_or_else(|| T::from(0)),
        T::from_i64(by).unwrap_or_else(|| T::from(0)),
    );
    for (i, byte) in bytes.iter().enumerate() {
        let cell = origin + vector(T::from_i64(i as i64).unwrap_or_else(|| T::from(0)), T::from(0));
        ctx.space.set(cell, T::from(*byte as i32));
    }
    InstructionResult::Continue
}

/// `W` pops a byte count, peeks the handle, and copies that many bytes from
/// Funge-space (starting at the handle's buffer vector) into the file,
/// advancing only in the x direction.
fn write_bytes<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let n = ctx.ip.pop().to_usize().unwrap_or(0);
    let id = peek_handle_id(ctx.ip);
    let mut table = handles().lock().unwrap();
    let h = match id.and_then(|id| table.get_mut(id).and_then(Option::as_mut)) {
        Some(h) => h,
        None => {
            drop(table);
            ctx.ip.reflect();
            return InstructionResult::Continue;
        }
    };
    if !h.writable {
        drop(table);
        ctx.ip.reflect();
        return InstructionResult::Continue;
    }
    let (bx, by) = h.space_buf;
    let origin = vector(
        T::from_i64(bx).unwrap_or_else(|| T::from(0)),
        T::from_i64(by).unwrap_or_else(|| T::from(0)),
    );
    let mut bytes = Vec::with_capacity(n);
    for i in 0..n {
        let cell = origin + vector(T::from_i64(i as i64).unwrap_or_else(|| T::from(0)), T::from(0));
        bytes.push(ctx.space.get(cell).to_i32().unwrap_or(0) as u8);
    }
    let end = h.pos + bytes.len();
    if end > h.buf.len() {
        h.buf.resize(end, 0);
    }
    h.buf[h.pos..end].copy_from_slice(&bytes);
    h.pos = end;
    h.dirty = true;
    InstructionResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fungespace::FungeSpace;
    use crate::interpreter::ip::InstructionPointer;
    use crate::interpreter::{IOMode, InterpreterEnv, LanguageStandard};
    use std::collections::HashMap;

    struct FakeFsEnv {
        files: HashMap<String, Vec<u8>>,
    }
    impl InterpreterEnv for FakeFsEnv {
        fn get_iomode(&self) -> IOMode {
            IOMode::Binary
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
        fn have_file_input(&self) -> bool {
            true
        }
        fn have_file_output(&self) -> bool {
            true
        }
        fn read_file(&mut self, filename: &str) -> std::io::Result<Vec<u8>> {
            self.files
                .get(filename)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }
        fn write_file(&mut self, filename: &str, content: &[u8]) -> std::io::Result<()> {
            self.files.insert(filename.to_owned(), content.to_vec());
            Ok(())
        }
    }

    fn ctx_on<'a>(
        ip: &'a mut InstructionPointer<i32>,
        space: &'a mut FungeSpace<i32>,
        env: &'a mut FakeFsEnv,
    ) -> InstructionContext<'a, i32> {
        InstructionContext {
            ip,
            space,
            env,
            standard: LanguageStandard::Funge98,
        }
    }

    #[test]
    fn write_then_read_back_via_open_put_close_and_reopen() {
        let mut ip = InstructionPointer::<i32>::new(0);
        let mut space = FungeSpace::<i32>::new();
        let mut env = FakeFsEnv {
            files: HashMap::from([("greeting.txt".to_owned(), b"".to_vec())]),
        };

        ip.push_0gnirts("greeting.txt");
        ip.push(1); // wb
        MotionCmds::push_vector(&mut ip, vector(0, 0));
        {
            let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
            open(&mut ctx);
        }
        let handle = ip.stack()[0];

        ip.push(handle);
        ip.push_0gnirts("hi");
        {
            let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
            put_string(&mut ctx);
        }
        // put_string leaves the handle on the stack (only peeked)
        assert_eq!(ip.pop(), handle);

        ip.push(handle);
        {
            let mut ctx = ctx_on(&mut ip, &mut space, &mut env);
            close(&mut ctx);
        }

        assert_eq!(env.files.get("greeting.txt").map(|v| v.as_slice()), Some(&b"hi"[..]));
    }
}
