// Copyright 2022 Parity Technologies (UK) Ltd.
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
// OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Options mapping codec.
//!
//! A bounded string-to-string mapping embedded in modern records:
//!
//! ```text
//!   bytes 0-1: length of the entries that follow
//!   entries:   1-byte key length, key, '=', 1-byte value length, value, ';'
//! ```
//!
//! Entries are encoded in ascending key order so the encoding of a given
//! mapping is deterministic. Decoding reads strictly the declared length, so
//! trailing random padding never disturbs it.

use crate::error::Error;
use std::collections::BTreeMap;

/// Options carried by modern build records.
pub type Options = BTreeMap<String, String>;

const SEP_EQ: u8 = b'=';
const SEP_END: u8 = b';';

/// Bytes [`encode_into`] will write for `options`, length prefix included.
pub fn encoded_len(options: &Options) -> usize {
	2 + options.iter().map(|(k, v)| 1 + k.len() + 1 + 1 + v.len() + 1).sum::<usize>()
}

/// Serialize `options` into the front of `out`.
///
/// Fails if the encoding exceeds `max` bytes or a single key or value
/// exceeds the one-byte length prefix.
///
/// Returns the number of bytes written.
pub fn encode_into(out: &mut [u8], options: &Options, max: usize) -> Result<usize, Error> {
	let total = encoded_len(options);
	if total > max || total > out.len() {
		return Err(Error::OversizedOptions)
	}
	let payload = total - 2;
	if payload > u16::MAX as usize {
		return Err(Error::OversizedOptions)
	}
	out[0..2].copy_from_slice(&(payload as u16).to_be_bytes());

	let mut off = 2;
	for (key, value) in options {
		if key.len() > u8::MAX as usize || value.len() > u8::MAX as usize {
			return Err(Error::OversizedOptions)
		}
		out[off] = key.len() as u8;
		off += 1;
		out[off..off + key.len()].copy_from_slice(key.as_bytes());
		off += key.len();
		out[off] = SEP_EQ;
		off += 1;
		out[off] = value.len() as u8;
		off += 1;
		out[off..off + value.len()].copy_from_slice(value.as_bytes());
		off += value.len();
		out[off] = SEP_END;
		off += 1;
	}
	Ok(off)
}

/// Parse an options mapping from the front of `data`.
///
/// A corrupted mapping is indistinguishable from absent options followed by
/// random padding, so every parse error yields an empty mapping.
pub fn decode(data: &[u8]) -> Options {
	parse(data).unwrap_or_default()
}

fn parse(data: &[u8]) -> Option<Options> {
	if data.len() < 2 {
		return None
	}
	let payload = u16::from_be_bytes([data[0], data[1]]) as usize;
	let entries = data.get(2..2 + payload)?;

	let mut options = Options::new();
	let mut off = 0;
	while off < entries.len() {
		let key = read_string(entries, &mut off)?;
		if *entries.get(off)? != SEP_EQ {
			return None
		}
		off += 1;
		let value = read_string(entries, &mut off)?;
		if *entries.get(off)? != SEP_END {
			return None
		}
		off += 1;
		options.insert(key, value);
	}
	Some(options)
}

fn read_string(data: &[u8], off: &mut usize) -> Option<String> {
	let len = *data.get(*off)? as usize;
	let bytes = data.get(*off + 1..*off + 1 + len)?;
	*off += 1 + len;
	String::from_utf8(bytes.to_vec()).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opts(pairs: &[(&str, &str)]) -> Options {
		pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	#[test]
	fn round_trip() {
		let options = opts(&[("foo", "bar"), ("a", ""), ("x", "y")]);
		let mut buf = [0u8; 64];
		let len = encode_into(&mut buf, &options, 64).unwrap();
		assert_eq!(len, encoded_len(&options));
		assert_eq!(decode(&buf), options);
	}

	#[test]
	fn empty_mapping_is_two_bytes() {
		let mut buf = [0xAAu8; 8];
		assert_eq!(encode_into(&mut buf, &Options::new(), 8).unwrap(), 2);
		assert_eq!(&buf[..2], &[0, 0]);
		assert_eq!(decode(&buf), Options::new());
	}

	#[test]
	fn trailing_padding_ignored() {
		let options = opts(&[("k", "v")]);
		let mut buf = [0u8; 32];
		let len = encode_into(&mut buf, &options, 32).unwrap();
		// Random-looking garbage after the declared length.
		for byte in buf[len..].iter_mut() {
			*byte = 0xC7;
		}
		assert_eq!(decode(&buf), options);
	}

	#[test]
	fn corrupt_mapping_reads_empty() {
		let options = opts(&[("key", "value")]);
		let mut buf = [0u8; 32];
		encode_into(&mut buf, &options, 32).unwrap();
		buf[4] = 0xFF; // key bytes now run past the declared length
		assert_eq!(decode(&buf), Options::new());
		assert_eq!(decode(&[7]), Options::new());
	}

	#[test]
	fn bound_enforced() {
		let options = opts(&[("foo", "bar")]);
		let mut buf = [0u8; 64];
		let needed = encoded_len(&options);
		assert_eq!(encode_into(&mut buf, &options, needed - 1), Err(Error::OversizedOptions));
		assert!(encode_into(&mut buf, &options, needed).is_ok());
	}

	#[test]
	fn deterministic_order() {
		let a = opts(&[("b", "2"), ("a", "1")]);
		let b = opts(&[("a", "1"), ("b", "2")]);
		let mut buf_a = [0u8; 32];
		let mut buf_b = [0u8; 32];
		let len_a = encode_into(&mut buf_a, &a, 32).unwrap();
		let len_b = encode_into(&mut buf_b, &b, 32).unwrap();
		assert_eq!(&buf_a[..len_a], &buf_b[..len_b]);
	}
}
