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

#![allow(non_snake_case)]

mod BOOL;
mod FILE;
mod HRTI;
mod MODU;
mod NULL;
mod REFC;
mod ROMA;

use super::instruction_set::InstructionContext;
use crate::fungespace::FungeValue;

/// Convert a fingerprint name (e.g. `"ROMA"`) to its packed numeric id, per
/// spec.md §3: the bytes of the name, big-endian.
pub fn string_to_fingerprint(fpr_str: &str) -> i32 {
    let mut fpr = 0_i32;
    for c in fpr_str.chars() {
        fpr = fpr.wrapping_mul(256).wrapping_add(c as i32);
    }
    fpr
}

/// Fingerprints with no file, process-execution, or clock side effects;
/// offered to callers (e.g. `-b`/`-S` CLI modes) that want to restrict the
/// catalog without disabling the extension mechanism outright.
pub fn safe_fingerprints() -> Vec<i32> {
    vec![
        string_to_fingerprint("NULL"),
        string_to_fingerprint("BOOL"),
        string_to_fingerprint("HRTI"),
        string_to_fingerprint("ROMA"),
        string_to_fingerprint("MODU"),
        string_to_fingerprint("REFC"),
    ]
}

/// Every fingerprint this build knows how to load.
pub fn all_fingerprints() -> Vec<i32> {
    let mut fprts = safe_fingerprints();
    fprts.push(string_to_fingerprint("FILE"));
    fprts
}

/// Load fingerprint `fpr` onto the current IP's overlay, if known.
pub fn load<T: FungeValue>(ctx: &mut InstructionContext<T>, fpr: i32) -> bool {
    if fpr == string_to_fingerprint("NULL") {
        NULL::load(ctx)
    } else if fpr == string_to_fingerprint("BOOL") {
        BOOL::load(ctx)
    } else if fpr == string_to_fingerprint("HRTI") {
        HRTI::load(ctx)
    } else if fpr == string_to_fingerprint("ROMA") {
        ROMA::load(ctx)
    } else if fpr == string_to_fingerprint("MODU") {
        MODU::load(ctx)
    } else if fpr == string_to_fingerprint("REFC") {
        REFC::load(ctx)
    } else if fpr == string_to_fingerprint("FILE") {
        FILE::load(ctx)
    } else {
        false
    }
}

/// Unload the top layer fingerprint `fpr` installed for its letters.
pub fn unload<T: FungeValue>(ctx: &mut InstructionContext<T>, fpr: i32) -> bool {
    if fpr == string_to_fingerprint("NULL") {
        NULL::unload(ctx)
    } else if fpr == string_to_fingerprint("BOOL") {
        BOOL::unload(ctx)
    } else if fpr == string_to_fingerprint("HRTI") {
        HRTI::unload(ctx)
    } else if fpr == string_to_fingerprint("ROMA") {
        ROMA::unload(ctx)
    } else if fpr == string_to_fingerprint("MODU") {
        MODU::unload(ctx)
    } else if fpr == string_to_fingerprint("REFC") {
        REFC::unload(ctx)
    } else if fpr == string_to_fingerprint("FILE") {
        FILE::unload(ctx)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_id_is_packed_bytes() {
        assert_eq!(string_to_fingerprint("FILE"), 0x46494c45);
        assert_eq!(string_to_fingerprint("ROMA"), 0x524f4d41);
    }
}
