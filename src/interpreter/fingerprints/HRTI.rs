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

use std::rc::Rc;

use chrono::prelude::Utc;

use crate::fungespace::FungeValue;
use crate::interpreter::instruction_set::{InstructionContext, InstructionResult};

/// The HRTI fingerprint allows a Funge program to measure elapsed time much
/// more finely than the clock values returned by `y`.
///
/// After successfully loading HRTI, the instructions `E`, `G`, `M`, `S`,
/// and `T` take on new semantics.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.add_layer(&[
        ('G', granularity),
        ('M', mark),
        ('T', timer),
        ('E', erase),
        ('S', second),
    ]);
    true
}

pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>) -> bool {
    ctx.ip.fingerprints.pop_layer(&['G', 'M', 'T', 'E', 'S'])
}

/// `G` 'Granularity' pushes the smallest clock tick the underlying system
/// can reliably handle, measured in microseconds.
fn granularity<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(1));
    InstructionResult::Continue
}

/// `M` 'Mark' designates the timer as having been read by the IP with this
/// ID at this instance in time.
fn mark<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    let ts_micros: i64 = Utc::now().timestamp_nanos() / 1000;
    ctx.ip
        .private_data
        .insert("HRTI.mark".to_owned(), Rc::new(ts_micros));
    InstructionResult::Continue
}

/// `T` 'Timer' pushes the number of microseconds elapsed since the last
/// time an IP with this ID marked the timer. If there is no previous mark,
/// acts like `r`.
fn timer<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    if let Some(mark) = ctx.ip.private_data.get("HRTI.mark") {
        if let Some(ts_ref) = mark.downcast_ref::<i64>() {
            let ts_micros: i64 = Utc::now().timestamp_nanos() / 1000;
            let ts_diff = ts_micros - *ts_ref;
            ctx.ip.push(T::from(ts_diff as i32));
        } else {
            ctx.ip.reflect();
        }
    } else {
        ctx.ip.reflect();
    }
    InstructionResult::Continue
}

/// `E` 'Erase mark' erases the last timer mark by this IP (such that `T`
/// above will act like `r`).
fn erase<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.private_data.remove("HRTI.mark");
    InstructionResult::Continue
}

/// `S` 'Second' pushes the number of microseconds elapsed since the last
/// whole second.
fn second<T: FungeValue>(ctx: &mut InstructionContext<T>) -> InstructionResult {
    ctx.ip.push(T::from(Utc::now().timestamp_subsec_micros() as i32));
    InstructionResult::Continue
}
