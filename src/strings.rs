// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loggable heap values.
//!
//! The log does not own an object model.  Runtimes describe their strings and symbols to it
//! through the [`LogString`] and [`LogSymbol`] traits; the encoders in
//! [`MessageBuilder`](crate::MessageBuilder) only ever read code units by index and a few shape
//! bits.
//!
//! [`FlatString`] and [`Symbol`] are ready-made implementations for callers without a heap of
//! their own, and `[u8]` / `[u16]` slices implement [`LogString`] directly as one-byte and
//! two-byte strings.

/// A string as stored by the runtime.
pub trait LogString {
    /// Number of code units.
    fn length(&self) -> usize;

    /// The code unit at `index`, which must be below [`LogString::length`].
    fn get(&self, index: usize) -> u32;

    /// Whether every code unit is stored in a single byte.
    fn is_one_byte(&self) -> bool;

    /// Whether the characters live outside the managed heap.
    fn is_external(&self) -> bool {
        false
    }

    /// Whether the string is the canonical interned copy.
    fn is_internalized(&self) -> bool {
        false
    }
}

impl LogString for [u8] {
    fn length(&self) -> usize {
        self.len()
    }
    fn get(&self, index: usize) -> u32 {
        u32::from(self[index])
    }
    fn is_one_byte(&self) -> bool {
        true
    }
}

impl LogString for [u16] {
    fn length(&self) -> usize {
        self.len()
    }
    fn get(&self, index: usize) -> u32 {
        u32::from(self[index])
    }
    fn is_one_byte(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    OneByte(Box<[u8]>),
    TwoByte(Box<[u16]>),
}

/**
An owned, flat string in either one-byte (Latin-1) or two-byte (UTF-16) representation.

```
use runlog::{FlatString, LogString};

let plain = FlatString::from("abc");
assert!(plain.is_one_byte());

let wide = FlatString::from("π=3");
assert!(!wide.is_one_byte());
assert_eq!(wide.get(0), 0x3c0);
```
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatString {
    repr: Repr,
    external: bool,
    internalized: bool,
}

impl FlatString {
    pub fn one_byte(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            repr: Repr::OneByte(bytes.into()),
            external: false,
            internalized: false,
        }
    }

    pub fn two_byte(units: impl Into<Box<[u16]>>) -> Self {
        Self {
            repr: Repr::TwoByte(units.into()),
            external: false,
            internalized: false,
        }
    }

    /// Marks the string as externally backed.
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Marks the string as interned.
    pub fn internalized(mut self) -> Self {
        self.internalized = true;
        self
    }
}

impl From<&str> for FlatString {
    /// Picks the one-byte representation when every character fits in Latin-1.
    fn from(s: &str) -> Self {
        if s.chars().all(|c| u32::from(c) <= 0xff) {
            let bytes: Vec<u8> = s.chars().map(|c| u32::from(c) as u8).collect();
            Self::one_byte(bytes)
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            Self::two_byte(units)
        }
    }
}

impl LogString for FlatString {
    fn length(&self) -> usize {
        match &self.repr {
            Repr::OneByte(bytes) => bytes.len(),
            Repr::TwoByte(units) => units.len(),
        }
    }

    fn get(&self, index: usize) -> u32 {
        match &self.repr {
            Repr::OneByte(bytes) => u32::from(bytes[index]),
            Repr::TwoByte(units) => u32::from(units[index]),
        }
    }

    fn is_one_byte(&self) -> bool {
        matches!(self.repr, Repr::OneByte(_))
    }

    fn is_external(&self) -> bool {
        self.external
    }

    fn is_internalized(&self) -> bool {
        self.internalized
    }
}

/// A symbol as stored by the runtime.
pub trait LogSymbol {
    /// The description, or `None` when the symbol's name is undefined.
    fn name(&self) -> Option<&dyn LogString>;
    fn hash(&self) -> u32;
}

/// An owned symbol with an optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: Option<FlatString>,
    hash: u32,
}

impl Symbol {
    pub fn new(name: Option<FlatString>, hash: u32) -> Self {
        Self { name, hash }
    }
}

impl LogSymbol for Symbol {
    fn name(&self) -> Option<&dyn LogString> {
        self.name.as_ref().map(|name| name as &dyn LogString)
    }

    fn hash(&self) -> u32 {
        self.hash
    }
}
