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

//! Funge-space: the sparse, unbounded 2-D grid a Funge program lives and
//! runs in.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::io;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};
use std::path::Path;

use divrem::DivRem;
use hashbrown::HashMap;
use num::{FromPrimitive, Signed, ToPrimitive};

/// A value that can live in a Funge-space cell.
///
/// One configurable signed integer width is used throughout a given
/// interpreter instance; `i32` and `i64` are provided.
pub trait FungeValue:
    From<i32>
    + ToPrimitive
    + FromPrimitive
    + Signed
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
    + Neg<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + DivRem<Output = (Self, Self)>
    + Ord
    + Eq
    + Hash
    + Copy
    + Display
    + Debug
{
    /// Return the value as a character, if the unicode code point exists.
    fn try_to_char(&self) -> Option<char> {
        self.to_u32().and_then(char::from_u32)
    }

    /// Return the value as a character, or U+FFFD if it isn't one.
    fn to_char(&self) -> char {
        self.try_to_char().unwrap_or('\u{FFFD}')
    }
}

impl FungeValue for i32 {}
impl FungeValue for i64 {}

/// A 2-D coordinate or delta in Funge-space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Vector<T> {
    pub x: T,
    pub y: T,
}

pub fn vector<T>(x: T, y: T) -> Vector<T> {
    Vector { x, y }
}

impl<T: FungeValue> Vector<T> {
    /// True if `self` points along one of the four cardinal directions (or
    /// is the zero vector).
    pub fn is_cardinal(&self) -> bool {
        self.x == T::from(0) || self.y == T::from(0)
    }

    /// Turn 90° clockwise (Funge-98 `]`).
    pub fn turn_right(&self) -> Self {
        vector(-self.y, self.x)
    }

    /// Turn 90° counter-clockwise (Funge-98 `[`).
    pub fn turn_left(&self) -> Self {
        vector(self.y, -self.x)
    }

    /// Reverse direction (`r`, and what error reflection applies).
    pub fn reversed(&self) -> Self {
        vector(-self.x, -self.y)
    }
}

impl<T: Add<Output = T>> Add for Vector<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        vector(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Vector<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        vector(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Neg<Output = T>> Neg for Vector<T> {
    type Output = Self;
    fn neg(self) -> Self {
        vector(-self.x, -self.y)
    }
}

impl<T: Display> Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned bounding rectangle, inclusive of both corners.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect<T> {
    pub min: Vector<T>,
    pub max: Vector<T>,
}

impl<T: FungeValue> Rect<T> {
    pub fn contains(&self, p: Vector<T>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// `max - min + (1, 1)`: the width and height of the rectangle.
    pub fn size(&self) -> Vector<T> {
        (self.max - self.min) + vector(T::from(1), T::from(1))
    }
}

/// The sparse 2-D cell store a Funge program runs in.
///
/// Unvisited cells read as ASCII space (32). The crate tracks the smallest
/// rectangle containing every cell ever explicitly written, widening it
/// monotonically as code self-modifies via `p`; this rectangle never
/// shrinks, matching every other Funge-98 implementation's observable
/// behaviour for `y`'s least/greatest point fields.
#[derive(Clone, Debug, Default)]
pub struct FungeSpace<T> {
    cells: HashMap<Vector<T>, T>,
    bounds: Option<Rect<T>>,
}

impl<T: FungeValue> FungeSpace<T> {
    pub fn new() -> Self {
        FungeSpace {
            cells: HashMap::new(),
            bounds: None,
        }
    }

    fn widen(&mut self, p: Vector<T>) {
        self.bounds = Some(match self.bounds {
            None => Rect { min: p, max: p },
            Some(r) => Rect {
                min: vector(r.min.x.min(p.x), r.min.y.min(p.y)),
                max: vector(r.max.x.max(p.x), r.max.y.max(p.y)),
            },
        });
    }

    /// Read the cell at `p`, or space if it was never written.
    pub fn get(&self, p: Vector<T>) -> T {
        *self.cells.get(&p).unwrap_or(&T::from(' ' as i32))
    }

    /// Write the cell at `p`, widening the bounding rectangle if needed.
    ///
    /// Writing a space does not shrink the bounding rectangle (Funge-98
    /// requires it to stay monotone), but the cell is dropped from the
    /// backing map so storage doesn't grow without bound for programs that
    /// clear regions after use.
    pub fn set(&mut self, p: Vector<T>, v: T) {
        self.widen(p);
        if v == T::from(' ' as i32) {
            self.cells.remove(&p);
        } else {
            self.cells.insert(p, v);
        }
    }

    /// Read relative to a storage offset (`g`'s effective address).
    pub fn get_off(&self, offset: Vector<T>, p: Vector<T>) -> T {
        self.get(offset + p)
    }

    /// Write relative to a storage offset (`p`'s effective address).
    pub fn set_off(&mut self, offset: Vector<T>, p: Vector<T>, v: T) {
        self.set(offset + p, v);
    }

    /// The smallest rectangle containing every cell ever written, if any.
    pub fn bounding_box(&self) -> Option<Rect<T>> {
        self.bounds
    }

    /// Move one step from `start` along `delta`, applying Funge-98's
    /// "Lahey-space" wraparound: if the destination falls outside the
    /// tracked bounding rectangle, the IP re-enters from the opposite edge.
    ///
    /// Cardinal deltas (one axis zero) wrap by snapping directly to the
    /// opposite boundary coordinate on that axis. Non-cardinal deltas step
    /// backward along `-delta` until falling outside the rectangle, then
    /// take one more step forward; this is bounded by the rectangle's own
    /// diameter so it always terminates.
    pub fn wrap(&self, start: Vector<T>, delta: Vector<T>) -> Vector<T> {
        let bounds = match self.bounds {
            Some(b) => b,
            None => return start,
        };
        if delta.is_cardinal() {
            let mut p = start;
            if delta.x > T::from(0) {
                p.x = bounds.min.x;
            } else if delta.x < T::from(0) {
                p.x = bounds.max.x;
            }
            if delta.y > T::from(0) {
                p.y = bounds.min.y;
            } else if delta.y < T::from(0) {
                p.y = bounds.max.y;
            }
            p
        } else {
            let back = delta.reversed();
            let mut p = start;
            let limit = (bounds.size().x.to_i64().unwrap_or(1)
                + bounds.size().y.to_i64().unwrap_or(1))
            .unsigned_abs() as usize
                + 2;
            for _ in 0..limit {
                let next = p + back;
                if !bounds.contains(next) {
                    return next + delta;
                }
                p = next;
            }
            start
        }
    }

    /// Step from `start` along `delta`, wrapping and skipping spaces, until
    /// landing on a non-space cell (or giving up after traversing the whole
    /// rectangle once, returning the position it landed on last).
    pub fn move_by(&self, start: Vector<T>, delta: Vector<T>) -> Vector<T> {
        let mut p = start + delta;
        if self.bounds.map_or(false, |b| !b.contains(p)) {
            p = self.wrap(start, delta);
        }
        let steps = self
            .bounds
            .map(|b| {
                let s = b.size();
                (s.x.to_i64().unwrap_or(1) * s.y.to_i64().unwrap_or(1)).unsigned_abs() as usize
            })
            .unwrap_or(1)
            + 1;
        for _ in 0..steps {
            if self.get(p) != T::from(' ' as i32) {
                return p;
            }
            let mut next = p + delta;
            if self.bounds.map_or(false, |b| !b.contains(next)) {
                next = self.wrap(p, delta);
            }
            p = next;
        }
        p
    }

    /// Advance one step from `start` along `delta`, implementing the
    /// fetch-next-executable rule spec.md §4.D defines for the main loop
    /// and for `k`: [FungeSpace::move_by] already skips spaces and wraps;
    /// on top of that, a `;` is treated as the start of a comment that
    /// swallows everything (including further spaces and nested `;` pairs
    /// are not supported — only the next `;` closes it) up to and
    /// including its matching `;`, after which skipping resumes.
    pub fn fetch_next(&self, start: Vector<T>, delta: Vector<T>) -> Vector<T> {
        let mut p = self.move_by(start, delta);
        while self.get(p).to_char() == ';' {
            loop {
                p = self.move_by(p, delta);
                if self.get(p).to_char() == ';' {
                    break;
                }
            }
            p = self.move_by(p, delta);
        }
        p
    }

    /// Load a program into the space, starting at `origin`. `binary`
    /// selects raw-byte loading (`i`'s flag bit 0 reset) versus text
    /// loading, which treats `\r\n` and bare `\r` as line breaks the way
    /// Funge source files on disk are conventionally read. Returns the
    /// rectangle the loaded data now occupies.
    pub fn load(&mut self, origin: Vector<T>, data: &[u8], binary: bool) -> Rect<T> {
        let mut end = origin;
        if binary {
            let mut p = origin;
            for &b in data {
                self.set(p, T::from(b as i32));
                end = vector(p.x.max(end.x), p.y.max(end.y));
                p.x = p.x + T::from(1);
            }
        } else {
            let mut y = 0i64;
            let mut x = 0i64;
            let mut i = 0usize;
            while i < data.len() {
                let b = data[i];
                if b == b'\r' {
                    if data.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    y += 1;
                    x = 0;
                } else if b == b'\n' {
                    y += 1;
                    x = 0;
                } else {
                    if b != b' ' {
                        let p = vector(
                            origin.x + T::from_i64(x).unwrap_or_else(|| T::from(0)),
                            origin.y + T::from_i64(y).unwrap_or_else(|| T::from(0)),
                        );
                        self.set(p, T::from(b as i32));
                        end = vector(p.x.max(end.x), p.y.max(end.y));
                    }
                    x += 1;
                }
                i += 1;
            }
        }
        Rect { min: origin, max: end }
    }

    /// Read a whole file's bytes into the space at `origin`.
    pub fn load_file(
        &mut self,
        path: &Path,
        origin: Vector<T>,
        binary: bool,
    ) -> io::Result<Rect<T>> {
        let data = std::fs::read(path)?;
        Ok(self.load(origin, &data, binary))
    }

    /// Render a rectangular region of the space back out, either as raw
    /// bytes or as text with trailing spaces trimmed from each row (`o`'s
    /// text mode).
    pub fn save(&self, origin: Vector<T>, size: Vector<T>, text: bool) -> Vec<u8> {
        let mut out = Vec::new();
        let w = size.x.to_i64().unwrap_or(0).max(0);
        let h = size.y.to_i64().unwrap_or(0).max(0);
        for dy in 0..h {
            let mut row = Vec::new();
            for dx in 0..w {
                let p = vector(
                    origin.x + T::from_i64(dx).unwrap_or_else(|| T::from(0)),
                    origin.y + T::from_i64(dy).unwrap_or_else(|| T::from(0)),
                );
                row.push(self.get(p).to_i64().unwrap_or(' ' as i64) as u8);
            }
            if text {
                while row.last() == Some(&b' ') {
                    row.pop();
                }
                row.push(b'\n');
            }
            out.extend(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let mut space = FungeSpace::<i32>::new();
        space.set(vector(3, 4), 'x' as i32);
        assert_eq!(space.get(vector(3, 4)), 'x' as i32);
        assert_eq!(space.get(vector(0, 0)), ' ' as i32);
    }

    #[test]
    fn load_tracks_bounds() {
        let mut space = FungeSpace::<i32>::new();
        space.load(vector(0, 0), b"abc\ndef", false);
        let b = space.bounding_box().unwrap();
        assert_eq!(b.min, vector(0, 0));
        assert_eq!(b.max, vector(2, 1));
        assert_eq!(space.get(vector(1, 1)), 'e' as i32);
    }

    #[test]
    fn cardinal_wrap() {
        let mut space = FungeSpace::<i32>::new();
        space.load(vector(0, 0), b"abc\ndef", false);
        let p = space.move_by(vector(2, 0), vector(1, 0));
        assert_eq!(p, vector(0, 0));
    }

    #[test]
    fn diagonal_wrap_reenters_opposite_corner() {
        let mut space = FungeSpace::<i32>::new();
        space.load(vector(0, 0), b"ab\ncd", false);
        let p = space.move_by(vector(1, 1), vector(1, 1));
        assert_eq!(p, vector(0, 0));
    }
}
