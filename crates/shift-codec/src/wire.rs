use bytes::{Buf, BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};

use crate::error::{CodecError, CodecResult};

/// Julian day number of 0001-01-01 minus its `num_days_from_ce` (which is 1).
const JULIAN_DAY_OFFSET: i64 = 1_721_425;

/// Length value that marks a null string.
const NULL_STRING: u32 = u32::MAX;

/// Append-only big-endian writer.
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    pub fn put_str(&mut self, s: &str) -> CodecResult<()> {
        let len = u32::try_from(s.len())
            .ok()
            .filter(|len| *len != NULL_STRING)
            .ok_or(CodecError::TooLarge {
                what: "string",
                len: s.len(),
            })?;
        self.buf.put_u32(len);
        self.buf.put_slice(s.as_bytes());
        Ok(())
    }

    pub fn put_date(&mut self, date: NaiveDate) {
        self.put_i64(date_to_julian(date));
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds-checked big-endian reader. Every short read is `BadFileFormat`.
pub struct WireReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize, what: &str) -> CodecResult<()> {
        if self.buf.remaining() < n {
            return Err(CodecError::bad(format!(
                "truncated {what} at offset {}: need {n}, have {}",
                self.consumed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn get_u16(&mut self, what: &str) -> CodecResult<u16> {
        self.need(2, what)?;
        self.consumed += 2;
        Ok(self.buf.get_u16())
    }

    pub fn get_i32(&mut self, what: &str) -> CodecResult<i32> {
        self.need(4, what)?;
        self.consumed += 4;
        Ok(self.buf.get_i32())
    }

    pub fn get_i64(&mut self, what: &str) -> CodecResult<i64> {
        self.need(8, what)?;
        self.consumed += 8;
        Ok(self.buf.get_i64())
    }

    pub fn get_u64(&mut self, what: &str) -> CodecResult<u64> {
        self.need(8, what)?;
        self.consumed += 8;
        Ok(self.buf.get_u64())
    }

    pub fn get_str(&mut self, what: &str) -> CodecResult<String> {
        self.need(4, what)?;
        self.consumed += 4;
        let len = self.buf.get_u32();
        if len == NULL_STRING {
            return Ok(String::new());
        }
        let len = len as usize;
        self.need(len, what)?;
        let (bytes, rest) = self.buf.split_at(len);
        let s = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::bad(format!("{what} is not UTF-8: {e}")))?
            .to_string();
        self.buf = rest;
        self.consumed += len;
        Ok(s)
    }

    pub fn get_date(&mut self, what: &str) -> CodecResult<NaiveDate> {
        let jd = self.get_i64(what)?;
        julian_to_date(jd).ok_or_else(|| CodecError::bad(format!("{what} out of range: {jd}")))
    }
}

pub fn date_to_julian(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + JULIAN_DAY_OFFSET
}

pub fn julian_to_date(jd: i64) -> Option<NaiveDate> {
    let days = i32::try_from(jd.checked_sub(JULIAN_DAY_OFFSET)?).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}
