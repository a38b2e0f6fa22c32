//! SIMH tape container
//!
//! Each record is framed by its byte length as a little-endian `u32`, before
//! and after the data. Odd lengths are followed by one pad byte. A zero length
//! is a tape mark; all ones is end of medium.

use super::read_fill;
use crate::constants::{
    SIMH_END_OF_MEDIUM, SIMH_ERROR_FLAG, SIMH_LENGTH_MASK, SIMH_TAPE_MARK, START_FILE, START_RECORD,
};
use crate::types::Word;
use bytes::{BufMut, BytesMut};
use std::io::{self, Read, Write};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// How one word is spread over tape frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TapeFrame {
    /// Six frames of six bits, bit 6 odd parity
    Seven,
    /// Core dump: four full bytes then a nibble
    Nine,
}

impl TapeFrame {
    pub(crate) const fn bytes_per_word(self) -> usize {
        match self {
            Self::Seven => 6,
            Self::Nine => 5,
        }
    }

    fn pack(self, value: u64, out: &mut BytesMut) {
        match self {
            Self::Seven => {
                for shift in (0..6).rev() {
                    let frame = ((value >> (shift * 6)) & 0o77) as u8;
                    let parity = if frame.count_ones() % 2 == 0 { 0o100 } else { 0 };
                    out.put_u8(frame | parity);
                }
            }
            Self::Nine => {
                out.put_u8((value >> 28) as u8);
                out.put_u8((value >> 20) as u8);
                out.put_u8((value >> 12) as u8);
                out.put_u8((value >> 4) as u8);
                out.put_u8((value & 0o17) as u8);
            }
        }
    }

    fn unpack(self, frames: &[u8]) -> u64 {
        match self {
            Self::Seven => frames
                .iter()
                .fold(0u64, |acc, &frame| (acc << 6) | u64::from(frame & 0o77)),
            Self::Nine => {
                (u64::from(frames[0]) << 28)
                    | (u64::from(frames[1]) << 20)
                    | (u64::from(frames[2]) << 12)
                    | (u64::from(frames[3]) << 4)
                    | u64::from(frames[4] & 0o17)
            }
        }
    }
}

fn read_length<R: Read>(reader: &mut R) -> io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    if read_fill(reader, &mut buf)? < buf.len() {
        return Ok(None);
    }
    Ok(Some(u32::from_le_bytes(buf)))
}

/// Record-tracking state for reading
#[derive(Debug, Default)]
pub(crate) struct SimhReader {
    remaining: usize,
    record_len: usize,
    in_record: bool,
    pending: u64,
    ended: bool,
}

impl SimhReader {
    pub(crate) fn read_word<R: Read>(
        &mut self,
        reader: &mut R,
        frame: TapeFrame,
    ) -> io::Result<Option<Word>> {
        if self.ended {
            return Ok(None);
        }
        while self.remaining == 0 {
            if self.in_record {
                self.end_record(reader)?;
            }
            let header = match read_length(reader)? {
                Some(SIMH_END_OF_MEDIUM) | None => {
                    self.ended = true;
                    return Ok(None);
                }
                Some(header) => header,
            };
            if header == SIMH_TAPE_MARK {
                #[cfg(feature = "logging")]
                debug!("tape mark");
                self.pending |= START_FILE;
                continue;
            }
            if header & SIMH_ERROR_FLAG != 0 {
                #[cfg(feature = "logging")]
                warn!("tape record flagged as read with errors");
            }
            let len = (header & SIMH_LENGTH_MASK) as usize;
            self.remaining = len;
            self.record_len = len;
            self.in_record = true;
            self.pending |= START_RECORD;
        }

        let wanted = frame.bytes_per_word().min(self.remaining);
        let mut frames = [0u8; 6];
        let got = read_fill(reader, &mut frames[..wanted])?;
        if got < wanted {
            self.ended = true;
            return Ok(None);
        }
        self.remaining -= wanted;

        // A short final word in a record is zero-filled.
        let value = frame.unpack(&frames[..frame.bytes_per_word()]);
        let markers = std::mem::take(&mut self.pending);
        Ok(Some(Word::new(value).with_markers(markers)))
    }

    fn end_record<R: Read>(&mut self, reader: &mut R) -> io::Result<()> {
        self.in_record = false;
        if self.record_len % 2 == 1 {
            let mut pad = [0u8; 1];
            read_fill(reader, &mut pad)?;
        }
        match read_length(reader)? {
            Some(trailer) if (trailer & SIMH_LENGTH_MASK) as usize == self.record_len => {}
            Some(_trailer) => {
                #[cfg(feature = "logging")]
                warn!(
                    "tape record trailer {} does not match header {}",
                    _trailer & SIMH_LENGTH_MASK,
                    self.record_len
                );
            }
            None => self.ended = true,
        }
        Ok(())
    }
}

/// Record-buffering state for writing
#[derive(Debug, Default)]
pub(crate) struct SimhWriter {
    record: BytesMut,
    open: bool,
    started: bool,
    dirty: bool,
}

impl SimhWriter {
    pub(crate) fn write_word<W: Write>(
        &mut self,
        writer: &mut W,
        word: Word,
        frame: TapeFrame,
    ) -> io::Result<()> {
        if word.starts_file() {
            self.close_record(writer)?;
            if self.started {
                writer.write_all(&SIMH_TAPE_MARK.to_le_bytes())?;
            }
        } else if word.starts_record() {
            self.close_record(writer)?;
        }
        frame.pack(word.value(), &mut self.record);
        self.open = true;
        self.started = true;
        self.dirty = true;
        Ok(())
    }

    fn close_record<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        let len = self.record.len();
        let mut out = BytesMut::with_capacity(len + 9);
        out.put_u32_le(len as u32);
        out.put_slice(&self.record);
        if len % 2 == 1 {
            out.put_u8(0);
        }
        out.put_u32_le(len as u32);
        writer.write_all(&out)?;
        self.record.clear();
        self.open = false;
        Ok(())
    }

    /// Close the last record and write the end-of-tape double mark
    pub(crate) fn finish<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.close_record(writer)?;
        writer.write_all(&SIMH_TAPE_MARK.to_le_bytes())?;
        writer.write_all(&SIMH_TAPE_MARK.to_le_bytes())?;
        self.dirty = false;
        Ok(())
    }
}
