/*!
A [kerning table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kern.html)
implementation.

A `kern` table is a list of subtables and comes in two layouts, selected by
the 16-bit version field at the start of the table: the legacy version 0
layout and the version 1 container layout. The two use different subtable
headers and different coverage encodings, so each gets its own iterator type
and [`Table`] is a sum of the two.

Only horizontal, non-cross-stream *Ordered List of Kerning Pairs* (format 0)
subtables are resolved. Everything else is reported via a warning and
contributes nothing.
*/

use crate::parser::{FromData, Stream};
use crate::{CharCode, MalformedTable};

/// The *Ordered List of Kerning Pairs* subtable format.
const ORDERED_LIST_FORMAT: u8 = 0;

#[derive(Clone, Copy, Debug)]
struct OTCoverage(u8);

impl OTCoverage {
    #[inline]
    fn is_horizontal(self) -> bool {
        self.0 & (1 << 0) != 0
    }

    #[inline]
    fn has_minimum(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    #[inline]
    fn has_cross_stream(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    #[inline]
    fn has_override(self) -> bool {
        self.0 & (1 << 3) != 0
    }
}

impl FromData for OTCoverage {
    const SIZE: usize = 1;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0).copied().map(OTCoverage)
    }
}

#[derive(Clone, Copy, Debug)]
struct AATCoverage(u8);

impl AATCoverage {
    #[inline]
    fn is_horizontal(self) -> bool {
        self.0 & (1 << 7) == 0
    }

    #[inline]
    fn has_cross_stream(self) -> bool {
        self.0 & (1 << 6) != 0
    }

    #[inline]
    fn is_variable(self) -> bool {
        self.0 & (1 << 5) != 0
    }
}

impl FromData for AATCoverage {
    const SIZE: usize = 1;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0).copied().map(AATCoverage)
    }
}

#[derive(Clone, Copy)]
struct KerningRecord {
    // In the kern table spec, a kerning pair is stored as two u16,
    // but we are using one u32, so we can binary search it directly.
    pair: u32,
    value: i16,
}

impl FromData for KerningRecord {
    const SIZE: usize = 6;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        let mut s = Stream::new(data);
        Some(KerningRecord {
            pair: s.read::<u32>()?,
            value: s.read::<i16>()?,
        })
    }
}

/// A version 0 kerning subtable.
#[derive(Clone, Copy, Default)]
pub struct Subtable0<'a> {
    version: u16,
    is_horizontal: bool,
    has_minimum: bool,
    has_cross_stream: bool,
    has_override: bool,
    format: u8,
    data: &'a [u8],
}

impl<'a> Subtable0<'a> {
    /// Returns the subtable version. Must be 0 to be resolvable.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Checks that subtable is for horizontal text.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.is_horizontal
    }

    /// Checks that subtable has the `minimum` semantics.
    #[inline]
    pub fn has_minimum(&self) -> bool {
        self.has_minimum
    }

    /// Checks that subtable has cross-stream values.
    #[inline]
    pub fn has_cross_stream(&self) -> bool {
        self.has_cross_stream
    }

    /// Checks that subtable values replace the accumulated ones
    /// instead of being added to them.
    #[inline]
    pub fn has_override(&self) -> bool {
        self.has_override
    }

    /// Returns the subtable format.
    #[inline]
    pub fn format(&self) -> u8 {
        self.format
    }

    /// Returns kerning for a pair of character codes.
    ///
    /// Returns 0 for unsupported subtable formats.
    #[inline]
    pub fn kerning(&self, left: CharCode, right: CharCode) -> Result<i16, MalformedTable> {
        match self.format {
            ORDERED_LIST_FORMAT => ordered_list_kerning(self.data, left, right),
            _ => Ok(0),
        }
    }
}

impl core::fmt::Debug for Subtable0<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Subtable0")
            .field("version", &self.version())
            .field("is_horizontal", &self.is_horizontal())
            .field("has_minimum", &self.has_minimum())
            .field("has_cross_stream", &self.has_cross_stream())
            .field("has_override", &self.has_override())
            .field("format", &self.format())
            .finish()
    }
}

/// A version 1 kerning subtable.
#[derive(Clone, Copy, Default)]
pub struct Subtable1<'a> {
    is_horizontal: bool,
    has_cross_stream: bool,
    is_variable: bool,
    format: u8,
    data: &'a [u8],
}

impl<'a> Subtable1<'a> {
    /// Checks that subtable is for horizontal text.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.is_horizontal
    }

    /// Checks that subtable has cross-stream values.
    #[inline]
    pub fn has_cross_stream(&self) -> bool {
        self.has_cross_stream
    }

    /// Checks that subtable is variable.
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.is_variable
    }

    /// Returns the subtable format.
    #[inline]
    pub fn format(&self) -> u8 {
        self.format
    }

    /// Returns kerning for a pair of character codes.
    ///
    /// Returns 0 for unsupported subtable formats.
    #[inline]
    pub fn kerning(&self, left: CharCode, right: CharCode) -> Result<i16, MalformedTable> {
        match self.format {
            ORDERED_LIST_FORMAT => ordered_list_kerning(self.data, left, right),
            _ => Ok(0),
        }
    }
}

impl core::fmt::Debug for Subtable1<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Subtable1")
            .field("is_horizontal", &self.is_horizontal())
            .field("has_cross_stream", &self.has_cross_stream())
            .field("is_variable", &self.is_variable())
            .field("format", &self.format())
            .finish()
    }
}

/// An iterator over version 0 subtables.
#[derive(Clone, Copy, Default, Debug)]
pub struct Subtables0<'a> {
    /// The current subtable index.
    index: u16,
    /// The total number of subtables.
    count: u16,
    /// Data right after the table header.
    stream: Stream<'a>,
}

impl<'a> Iterator for Subtables0<'a> {
    type Item = Result<Subtable0<'a>, MalformedTable>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index == self.count {
            return None;
        }

        self.index += 1;
        Some(parse_subtable0(&mut self.stream).ok_or(MalformedTable))
    }
}

fn parse_subtable0<'a>(s: &mut Stream<'a>) -> Option<Subtable0<'a>> {
    const HEADER_SIZE: usize = 6;

    let version: u16 = s.read()?;
    let length: u16 = s.read()?;
    // The format code occupies the high byte of the coverage field,
    // so it's the first one on the wire.
    let format: u8 = s.read()?;
    let coverage: OTCoverage = s.read()?;

    // A subtable length includes the header, so anything shorter is corrupt.
    let data_len = usize::from(length).checked_sub(HEADER_SIZE)?;

    Some(Subtable0 {
        version,
        is_horizontal: coverage.is_horizontal(),
        has_minimum: coverage.has_minimum(),
        has_cross_stream: coverage.has_cross_stream(),
        has_override: coverage.has_override(),
        format,
        data: s.read_bytes(data_len)?,
    })
}

/// An iterator over version 1 subtables.
#[derive(Clone, Copy, Default, Debug)]
pub struct Subtables1<'a> {
    /// The current subtable index.
    index: u16,
    /// The total number of subtables.
    count: u16,
    /// Data right after the table header.
    stream: Stream<'a>,
}

impl<'a> Iterator for Subtables1<'a> {
    type Item = Result<Subtable1<'a>, MalformedTable>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index == self.count {
            return None;
        }

        self.index += 1;
        Some(parse_subtable1(&mut self.stream).ok_or(MalformedTable))
    }
}

fn parse_subtable1<'a>(s: &mut Stream<'a>) -> Option<Subtable1<'a>> {
    const HEADER_SIZE: usize = 8;

    let length: u16 = s.read()?;
    // Unlike in version 0, the coverage flags occupy the high byte
    // and the format code the low one.
    let coverage: AATCoverage = s.read()?;
    let format: u8 = s.read()?;
    s.skip::<u16>(); // variation tuple index
    s.skip::<u16>(); // reserved

    let data_len = usize::from(length).checked_sub(HEADER_SIZE)?;

    Some(Subtable1 {
        is_horizontal: coverage.is_horizontal(),
        has_cross_stream: coverage.has_cross_stream(),
        is_variable: coverage.is_variable(),
        format,
        data: s.read_bytes(data_len)?,
    })
}

/// A kerning table.
///
/// The two table layouts share nothing past the 4-byte header,
/// hence the explicit split.
#[derive(Clone, Copy, Debug)]
pub enum Table<'a> {
    /// The legacy layout: a version 0 header followed by version 0 subtables.
    Version0(Subtables0<'a>),
    /// The container layout: any non-zero version, version 1 subtables.
    Version1(Subtables1<'a>),
}

impl<'a> Table<'a> {
    /// Parses a `kern` table header.
    ///
    /// `data` must start at the first byte of the table.
    /// Subtables are parsed lazily, during iteration/resolution.
    pub fn parse(data: &'a [u8]) -> Result<Self, MalformedTable> {
        let mut s = Stream::new(data);
        let version: u16 = s.read().ok_or(MalformedTable)?;
        let count: u16 = s.read().ok_or(MalformedTable)?;

        if version == 0 {
            Ok(Table::Version0(Subtables0 {
                index: 0,
                count,
                stream: s,
            }))
        } else {
            Ok(Table::Version1(Subtables1 {
                index: 0,
                count,
                stream: s,
            }))
        }
    }

    /// Resolves horizontal kerning for a pair of character codes.
    ///
    /// Walks all subtables and combines their values. 0 means that
    /// either the pair is not present or its kerning is actually zero;
    /// the format cannot tell those apart.
    pub fn horizontal_kerning(
        &self,
        left: CharCode,
        right: CharCode,
    ) -> Result<i16, MalformedTable> {
        match self {
            Table::Version0(subtables) => horizontal_kerning0(*subtables, left, right),
            Table::Version1(subtables) => horizontal_kerning1(*subtables, left, right),
        }
    }
}

fn horizontal_kerning0(
    subtables: Subtables0,
    left: CharCode,
    right: CharCode,
) -> Result<i16, MalformedTable> {
    let mut kern = 0i16;

    for subtable in subtables {
        let subtable = subtable?;

        if subtable.version() != 0 {
            warn!(
                "kerning is not supported for subtables with version {}",
                subtable.version()
            );
            continue;
        }

        if !subtable.is_horizontal() {
            warn!("kerning is not supported for vertical subtables");
            continue;
        }

        if subtable.has_cross_stream() {
            warn!("kerning is not supported for cross-stream subtables");
            continue;
        }

        if subtable.has_minimum() {
            warn!("kerning is not supported for `minimum` subtables");
            continue;
        }

        if subtable.format() != ORDERED_LIST_FORMAT {
            warn!(
                "kerning is not supported for subtables with format {}",
                subtable.format()
            );
            continue;
        }

        let value = subtable.kerning(left, right)?;
        if subtable.has_override() {
            kern = value;
        } else {
            kern = kern.wrapping_add(value);
        }
    }

    Ok(kern)
}

fn horizontal_kerning1(
    subtables: Subtables1,
    left: CharCode,
    right: CharCode,
) -> Result<i16, MalformedTable> {
    let mut kern = 0i16;

    for subtable in subtables {
        let subtable = subtable?;

        if !subtable.is_horizontal() {
            warn!("kerning is not supported for vertical subtables");
            continue;
        }

        if subtable.has_cross_stream() {
            warn!("kerning is not supported for cross-stream subtables");
            continue;
        }

        if subtable.is_variable() {
            warn!("kerning is not supported for variation subtables");
            continue;
        }

        if subtable.format() != ORDERED_LIST_FORMAT {
            warn!(
                "kerning is not supported for subtables with format {}",
                subtable.format()
            );
            continue;
        }

        // No override semantics in this layout, values are always summed.
        kern = kern.wrapping_add(subtable.kerning(left, right)?);
    }

    Ok(kern)
}

/// A *Format 0 Kerning Subtable (Ordered List of Kerning Pairs)* implementation
/// from <https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6kern.html>
fn ordered_list_kerning(
    data: &[u8],
    left: CharCode,
    right: CharCode,
) -> Result<i16, MalformedTable> {
    let mut s = Stream::new(data);
    let number_of_pairs: u16 = s.read().ok_or(MalformedTable)?;
    if number_of_pairs == 0 {
        return Ok(0);
    }

    s.advance(6); // search_range (u16) + entry_selector (u16) + range_shift (u16)
    let pairs = s
        .read_array16::<KerningRecord>(number_of_pairs)
        .ok_or(MalformedTable)?;

    let needle = u32::from(left.0) << 16 | u32::from(right.0);
    Ok(pairs
        .binary_search_by(|v| v.pair.cmp(&needle))
        .map(|(_, v)| v.value)
        .unwrap_or(0))
}
