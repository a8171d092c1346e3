// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! Payload wire format.
//!
//! Text fields are a big-endian `u32` byte length followed by UTF-8 bytes.
//! Amounts are big-endian `u128`. Payloads carry no framing of their own and
//! must be consumed exactly.

use thiserror::Error;

use crate::types::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("payload truncated")]
    Truncated,

    #[error("payload has {0} trailing bytes")]
    TrailingBytes(usize),

    #[error("text field is not valid utf-8")]
    InvalidUtf8,

    #[error("text field of {len} bytes exceeds limit {max}")]
    TooLong { len: usize, max: usize },
}

#[derive(Debug, Default)]
pub struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, value: &str) -> Result<Self, CodecError> {
        self.out.extend_from_slice(&length_prefix(value.len())?);
        self.out.extend_from_slice(value.as_bytes());
        Ok(self)
    }

    pub fn amount(mut self, value: Amount) -> Self {
        self.out.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

fn length_prefix(len: usize) -> Result<[u8; 4], CodecError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| CodecError::TooLong {
            len,
            max: u32::MAX as usize,
        })
}

pub struct Decoder<'a> {
    input: &'a [u8],
    max_text_bytes: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8], max_text_bytes: usize) -> Self {
        Self {
            input,
            max_text_bytes,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.input.len() < n {
            return Err(CodecError::Truncated);
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    pub fn text(&mut self) -> Result<String, CodecError> {
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(self.take(4)?);
        let len = u32::from_be_bytes(len_bytes) as usize;
        if len > self.max_text_bytes {
            return Err(CodecError::TooLong {
                len,
                max: self.max_text_bytes,
            });
        }
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn amount(&mut self) -> Result<Amount, CodecError> {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(self.take(16)?);
        Ok(Amount::from_be_bytes(bytes))
    }

    pub fn finish(self) -> Result<(), CodecError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(self.input.len()))
        }
    }
}
