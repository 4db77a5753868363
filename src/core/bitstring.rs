// src/core/bitstring.rs

use super::constants::qsearch_constants::MAX_REGISTER_WIDTH;
use super::error::{SearchError, SearchResult};
use std::fmt;
use std::str::FromStr;

/// A fixed-width register of qubits.
///
/// The width is validated once on construction and stays constant for the
/// lifetime of a run; everything that depends on it (oracles, diffusion,
/// state vectors) is built from a `Register` rather than a raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    width: usize,
}

impl Register {
    /// Validates `width` against `1..=MAX_REGISTER_WIDTH`.
    pub fn new(width: usize) -> SearchResult<Self> {
        if width == 0 {
            return Err(SearchError::configuration("register width must be greater than zero"));
        }
        if width > MAX_REGISTER_WIDTH {
            return Err(SearchError::configuration(format!(
                "register width {} exceeds the dense simulation limit of {}",
                width, MAX_REGISTER_WIDTH
            )));
        }
        Ok(Self { width })
    }

    /// Number of qubits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of basis states (2^N).
    pub fn dim(&self) -> usize {
        1usize << self.width
    }

    /// Every bitstring of this width, in ascending basis-index order.
    pub fn basis(&self) -> impl Iterator<Item = Bitstring> + use<> {
        Bitstring::all(self.width)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register({} qubits)", self.width)
    }
}

/// The classical label of one basis state.
///
/// Character `i` of the textual form is qubit `i`, and qubit 0 is the most
/// significant bit of the basis index: `"101"` labels index 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitstring {
    width: usize,
    value: u64,
}

impl Bitstring {
    /// Builds the bitstring labelling basis index `index` in a register of `width` qubits.
    pub fn from_index(index: usize, width: usize) -> SearchResult<Self> {
        if width > MAX_REGISTER_WIDTH {
            return Err(SearchError::configuration(format!(
                "bitstring width {} exceeds the limit of {}",
                width, MAX_REGISTER_WIDTH
            )));
        }
        if (index as u64) >> width != 0 {
            return Err(SearchError::configuration(format!(
                "basis index {} does not fit in {} bits",
                index, width
            )));
        }
        Ok(Self { width, value: index as u64 })
    }

    /// Builds a bitstring from a slice of 0/1 values, qubit 0 first.
    pub fn from_bits(bits: &[u8]) -> SearchResult<Self> {
        if bits.len() > MAX_REGISTER_WIDTH {
            return Err(SearchError::configuration(format!(
                "bitstring width {} exceeds the limit of {}",
                bits.len(),
                MAX_REGISTER_WIDTH
            )));
        }
        let mut value = 0u64;
        for &bit in bits {
            let bit = match bit {
                0 => 0,
                1 => 1,
                other => {
                    return Err(SearchError::configuration(format!(
                        "bit value {} is not 0 or 1",
                        other
                    )));
                }
            };
            value = (value << 1) | bit;
        }
        Ok(Self { width: bits.len(), value })
    }

    /// Enumerates every bitstring of `width` in ascending basis-index order.
    pub fn all(width: usize) -> impl Iterator<Item = Bitstring> {
        let count = if width >= 64 { 0 } else { 1u64 << width };
        (0..count).map(move |value| Bitstring { width, value })
    }

    /// Number of bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Basis-state index in the 2^N state vector.
    pub fn index(&self) -> usize {
        self.value as usize
    }

    /// Value of qubit `position` (0 is the leftmost character), or `None` out of range.
    pub fn bit(&self, position: usize) -> Option<bool> {
        if position >= self.width {
            return None;
        }
        let shift = self.width - 1 - position;
        Some((self.value >> shift) & 1 == 1)
    }

    /// The bits as 0/1 values, qubit 0 first.
    pub fn bits(&self) -> Vec<u8> {
        (0..self.width)
            .map(|i| ((self.value >> (self.width - 1 - i)) & 1) as u8)
            .collect()
    }

    /// The leading `len` bits, or `None` if `len` exceeds the width.
    pub fn prefix(&self, len: usize) -> Option<Bitstring> {
        if len > self.width {
            return None;
        }
        Some(Bitstring {
            width: len,
            value: self.value >> (self.width - len),
        })
    }

    /// `true` when the leading bits equal `prefix`.
    pub fn has_prefix(&self, prefix: &Bitstring) -> bool {
        self.prefix(prefix.width).is_some_and(|p| p == *prefix)
    }

    /// Hamming weight.
    pub fn count_ones(&self) -> u32 {
        self.value.count_ones()
    }

    /// Same width and Hamming weight with every one gathered at the end, or
    /// at the front when `ones_first` is set.
    pub(crate) fn gathered(&self, ones_first: bool) -> Bitstring {
        let ones = self.count_ones() as usize;
        let block = if ones == 0 { 0 } else { u64::MAX >> (64 - ones) };
        let value = if ones_first { block << (self.width - ones) } else { block };
        Bitstring { width: self.width, value }
    }

    /// Returns a copy with the bits at positions `i` and `j` exchanged.
    pub(crate) fn swapped(&self, i: usize, j: usize) -> Bitstring {
        let si = self.width - 1 - i;
        let sj = self.width - 1 - j;
        let bi = (self.value >> si) & 1;
        let bj = (self.value >> sj) & 1;
        if bi == bj {
            return *self;
        }
        Bitstring {
            width: self.width,
            value: self.value ^ ((1 << si) | (1 << sj)),
        }
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl FromStr for Bitstring {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(0u8),
                '1' => Ok(1u8),
                other => Err(SearchError::configuration(format!(
                    "'{}' is not a valid bit in bitstring '{}'",
                    other, s
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Bitstring::from_bits(&bits)
    }
}
