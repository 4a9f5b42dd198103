/*!
A safe, zero-allocation parser and pair resolver for the TrueType
[`kern`](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kern.html)
table.

## Features

- Resolves horizontal kerning for a pair of 16-bit character codes
  against the raw table bytes. No font file handling.
- Supports both the legacy version 0 and the version 1 container layouts.
- Zero heap allocations.
- Zero unsafe.
- Zero required dependencies. Logging is enabled by default.
- `no_std` compatible.

## Safety

- The library must not panic. Any panic considered as a critical bug
  and should be reported.
- The library forbids the unsafe code.
- All table walking is bounds-checked. A subtable length that lies about
  its size is reported as [`MalformedTable`] instead of being followed.

## Error handling

There is exactly one error: [`MalformedTable`], for raw bytes that are too
short or internally inconsistent. Everything else that cannot be resolved —
unknown subtable versions and formats, vertical, cross-stream, `minimum`
and variation subtables — is skipped with a warning and contributes nothing,
since a font is allowed to carry subtables we do not understand.

A 0 kerning value is returned both for pairs that are not in the table and
for pairs whose stored kerning is zero. The format cannot tell those apart.
*/

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "logging")]
macro_rules! warn {
    ($($arg:tt)+) => {
        log::log!(log::Level::Warn, $($arg)+);
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! warn {
    ($($arg:tt)+) => {}; // do nothing
}

mod kern;
mod parser;

pub use kern::{Subtable0, Subtable1, Subtables0, Subtables1, Table};

/// A type-safe wrapper for a 16-bit character code.
///
/// This is whatever the font stores in its kerning pairs. For the fonts
/// this crate targets these are UTF-16 code units, but the table format
/// itself does not care.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Debug, Default, Hash)]
pub struct CharCode(pub u16);

/// A raw table that is too short or has inconsistent length fields.
///
/// Covers any declared size that is not backed by actual bytes:
/// a table shorter than its 4-byte header, a subtable `length` smaller
/// than the subtable header or running past the end of the table,
/// and an ordered list shorter than its own pair count.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MalformedTable;

impl core::fmt::Display for MalformedTable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "malformed kerning table")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MalformedTable {}

/// Resolves horizontal kerning between two character codes.
///
/// A shorthand for [`Table::parse`] followed by
/// [`horizontal_kerning`](Table::horizontal_kerning).
/// The result is in font design units.
pub fn kerning(data: &[u8], left: CharCode, right: CharCode) -> Result<i16, MalformedTable> {
    Table::parse(data)?.horizontal_kerning(left, right)
}

/// Converts a kerning value from font design units into points.
///
/// `x_scale` is the `a` component of the font transformation matrix
/// and is 1.0 for an untransformed font.
///
/// A font with zero `units_per_em` is broken, so instead of dividing
/// by it we simply return 0.
#[inline]
pub fn kerning_to_points(value: i16, x_scale: f32, units_per_em: u16, point_size: f32) -> f32 {
    if units_per_em == 0 {
        return 0.0;
    }

    f32::from(value) * point_size * x_scale / f32::from(units_per_em)
}
