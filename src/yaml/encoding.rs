//! Input encoding detection and streaming decode
//!
//! The scanner consumes UTF-8 internally. This module sniffs a byte order
//! mark on the first bytes of input, then decodes UTF-8/16/32 feeds into
//! the scanner's working buffer, carrying incomplete code units across
//! feeds. Line breaks are normalized to `\n` on the way through.

use crate::{Error, Result};
use encoding_rs::{Decoder, DecoderResult, UTF_16BE, UTF_16LE};

/// Input encodings recognized by BOM sniffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 (the default when no BOM is present)
    Utf8,
    /// UTF-16 little endian
    Utf16Le,
    /// UTF-16 big endian
    Utf16Be,
    /// UTF-32 little endian
    Utf32Le,
    /// UTF-32 big endian
    Utf32Be,
}

/// Resumable byte-to-UTF-8 transducer with BOM detection
pub(crate) struct StreamDecoder {
    encoding: Option<Encoding>,
    /// Raw prefix held until the BOM can be judged (at most 4 bytes)
    sniff: Vec<u8>,
    /// Incomplete trailing code unit carried across feeds
    pending: Vec<u8>,
    utf16: Option<Decoder>,
    /// A `\r` was emitted as `\n`; a following `\n` is swallowed
    suppress_lf: bool,
}

impl std::fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("encoding", &self.encoding)
            .field("sniff_len", &self.sniff.len())
            .field("pending_len", &self.pending.len())
            .finish()
    }
}

impl StreamDecoder {
    pub(crate) fn new() -> Self {
        Self {
            encoding: None,
            sniff: Vec::new(),
            pending: Vec::new(),
            utf16: None,
            suppress_lf: false,
        }
    }

    /// The detected encoding, once known
    pub(crate) fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Decode a chunk of raw input into `out`
    pub(crate) fn feed(&mut self, bytes: &[u8], out: &mut String) -> Result<()> {
        if self.encoding.is_none() {
            self.sniff.extend_from_slice(bytes);
            if self.sniff.len() < 4 {
                return Ok(());
            }
            let rest = self.detect()?;
            return self.decode(&rest, out);
        }
        self.decode(bytes, out)
    }

    /// Flush carried state at end of input
    pub(crate) fn finish(&mut self, out: &mut String) -> Result<()> {
        if self.encoding.is_none() {
            // The whole input fit inside the sniff window.
            let rest = self.detect()?;
            self.decode(&rest, out)?;
        }
        match self.encoding {
            Some(Encoding::Utf16Le | Encoding::Utf16Be) => {
                if let Some(decoder) = self.utf16.as_mut() {
                    let mut tail = String::new();
                    let (result, _read) =
                        decoder.decode_to_string_without_replacement(&[], &mut tail, true);
                    if matches!(result, DecoderResult::Malformed(_, _)) {
                        return Err(Error::encoding("truncated UTF-16 sequence"));
                    }
                    self.push_normalized(&tail, out);
                }
            }
            _ => {
                if !self.pending.is_empty() {
                    return Err(Error::encoding(
                        "truncated multi-byte sequence at end of input",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Judge the sniff window, consuming any BOM; returns the remaining bytes
    fn detect(&mut self) -> Result<Vec<u8>> {
        let sniff = std::mem::take(&mut self.sniff);
        let (encoding, bom_len) = match sniff.as_slice() {
            [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
            [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
            [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
            [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
            [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
            _ => (Encoding::Utf8, 0),
        };
        self.encoding = Some(encoding);
        match encoding {
            Encoding::Utf16Le => {
                self.utf16 = Some(UTF_16LE.new_decoder_without_bom_handling());
            }
            Encoding::Utf16Be => {
                self.utf16 = Some(UTF_16BE.new_decoder_without_bom_handling());
            }
            _ => {}
        }
        Ok(sniff[bom_len..].to_vec())
    }

    fn decode(&mut self, bytes: &[u8], out: &mut String) -> Result<()> {
        match self.encoding.expect("encoding detected before decode") {
            Encoding::Utf8 => self.decode_utf8(bytes, out),
            Encoding::Utf16Le | Encoding::Utf16Be => self.decode_utf16(bytes, out),
            Encoding::Utf32Le => self.decode_utf32(bytes, out, false),
            Encoding::Utf32Be => self.decode_utf32(bytes, out, true),
        }
    }

    fn decode_utf8(&mut self, bytes: &[u8], out: &mut String) -> Result<()> {
        if self.pending.is_empty() {
            return self.decode_utf8_run(bytes, out);
        }
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);
        self.decode_utf8_run(&data, out)
    }

    fn decode_utf8_run(&mut self, data: &[u8], out: &mut String) -> Result<()> {
        match std::str::from_utf8(data) {
            Ok(text) => {
                self.push_normalized(text, out);
                Ok(())
            }
            Err(err) => {
                let valid = err.valid_up_to();
                if err.error_len().is_some() {
                    return Err(Error::encoding("invalid UTF-8 sequence"));
                }
                // Incomplete trailing sequence: emit the valid prefix and
                // carry the tail into the next feed.
                let text = std::str::from_utf8(&data[..valid]).expect("validated prefix");
                self.push_normalized(text, out);
                self.pending = data[valid..].to_vec();
                Ok(())
            }
        }
    }

    fn decode_utf16(&mut self, bytes: &[u8], out: &mut String) -> Result<()> {
        let decoder = self.utf16.as_mut().expect("utf16 decoder initialized");
        let mut tmp = String::new();
        let mut read_total = 0;
        loop {
            let src = &bytes[read_total..];
            let needed = decoder
                .max_utf8_buffer_length_without_replacement(src.len())
                .unwrap_or(src.len() * 3 + 16);
            tmp.reserve(needed);
            let (result, read) = decoder.decode_to_string_without_replacement(src, &mut tmp, false);
            read_total += read;
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => {
                    return Err(Error::encoding("invalid UTF-16 sequence"));
                }
            }
        }
        self.push_normalized(&tmp, out);
        Ok(())
    }

    fn decode_utf32(&mut self, bytes: &[u8], out: &mut String, big_endian: bool) -> Result<()> {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let complete = data.len() - data.len() % 4;
        let mut tmp = String::new();
        for unit in data[..complete].chunks_exact(4) {
            let value = if big_endian {
                u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]])
            } else {
                u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]])
            };
            let ch = char::from_u32(value)
                .ok_or_else(|| Error::encoding(format!("invalid UTF-32 code point {value:#x}")))?;
            tmp.push(ch);
        }
        self.pending = data[complete..].to_vec();
        self.push_normalized(&tmp, out);
        Ok(())
    }

    /// Append decoded text with line breaks normalized to `\n`
    fn push_normalized(&mut self, text: &str, out: &mut String) {
        for ch in text.chars() {
            match ch {
                '\r' => {
                    out.push('\n');
                    self.suppress_lf = true;
                }
                '\n' => {
                    if self.suppress_lf {
                        self.suppress_lf = false;
                    } else {
                        out.push('\n');
                    }
                }
                _ => {
                    self.suppress_lf = false;
                    out.push(ch);
                }
            }
        }
    }
}
