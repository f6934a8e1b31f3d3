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

//! Per-format offset tables and length constants.
//!
//! Legacy cleartext (222 bytes):
//!
//! ```text
//!   bytes     0-3: tunnel ID to receive messages as
//!   bytes    4-35: local hop identity hash
//!   bytes   36-39: next tunnel ID
//!   bytes   40-71: next hop identity hash
//!   bytes  72-103: tunnel layer key
//!   bytes 104-135: tunnel IV key
//!   bytes 136-167: reply key
//!   bytes 168-183: reply IV
//!   byte      184: flags
//!   bytes 185-188: request time (hours since the epoch)
//!   bytes 189-192: next message ID
//!   bytes 193-221: random padding
//! ```
//!
//! Long cleartext (464 bytes):
//!
//! ```text
//!   bytes     0-3: tunnel ID to receive messages as
//!   bytes     4-7: next tunnel ID
//!   bytes    8-39: next hop identity hash
//!   bytes   40-71: tunnel layer key
//!   bytes  72-103: tunnel IV key
//!   bytes 104-135: reply key
//!   bytes 136-151: reply IV
//!   byte      152: flags
//!   bytes 153-155: more flags, unused, zero
//!   bytes 156-159: request time (minutes since the epoch)
//!   bytes 160-163: request expiration (seconds since creation)
//!   bytes 164-167: next message ID
//!   bytes   168-x: options mapping
//!   bytes   x-463: random padding
//! ```
//!
//! Short cleartext (154 bytes):
//!
//! ```text
//!   bytes     0-3: tunnel ID to receive messages as
//!   bytes     4-7: next tunnel ID
//!   bytes    8-39: next hop identity hash
//!   byte       40: flags
//!   bytes   41-42: more flags, unused, zero
//!   byte       43: layer encryption type
//!   bytes   44-47: request time (minutes since the epoch)
//!   bytes   48-51: request expiration (seconds since creation)
//!   bytes   52-55: next message ID
//!   bytes    56-x: options mapping
//!   bytes   x-153: random padding
//! ```
//!
//! Wire records carry a 16-byte truncated identity hash, then either two
//! 256-byte ElGamal halves (legacy) or a 32-byte ephemeral key, the
//! ciphertext, and a 16-byte tag (modern).

use crate::elgamal;

/// Size in bytes of the truncated identity hash prefixed to every wire record.
pub const PEER_PREFIX_SIZE: usize = 16;

/// Size in bytes of the authentication tag on modern wire records.
pub const MAC_SIZE: usize = 16;

/// Wire size of legacy and long records.
pub const WIRE_LONG: usize = 528;

/// Wire size of short records.
pub const WIRE_SHORT: usize = 218;

/// Bytes a modern wire record adds around the cleartext.
pub const MODERN_OVERHEAD: usize = PEER_PREFIX_SIZE + crate::KX_PUBLIC_SIZE + MAC_SIZE;

/// Offset of one stripped ElGamal half within the legacy wire record.
pub const ELG_HALF_1: usize = PEER_PREFIX_SIZE;
/// Offset of the other.
pub const ELG_HALF_2: usize = PEER_PREFIX_SIZE + elgamal::KEY_SIZE;

/// Cleartext offset table for one record format.
///
/// `None` marks a field the format does not carry.
pub struct Layout {
	pub len: usize,
	pub receive_tunnel: usize,
	pub our_ident: Option<usize>,
	pub next_tunnel: usize,
	pub next_ident: usize,
	pub layer_key: Option<usize>,
	pub iv_key: Option<usize>,
	pub reply_key: Option<usize>,
	pub reply_iv: Option<usize>,
	pub flag: usize,
	pub layer_enc_type: Option<usize>,
	pub req_time: usize,
	pub expiration: Option<usize>,
	pub next_msg_id: usize,
	/// Start of the options mapping; serialized options (length prefix
	/// included) must fit in `max_options` bytes.
	pub options: Option<usize>,
	pub max_options: usize,
}

pub const LEGACY: Layout = Layout {
	len: 222,
	receive_tunnel: 0,
	our_ident: Some(4),
	next_tunnel: 36,
	next_ident: 40,
	layer_key: Some(72),
	iv_key: Some(104),
	reply_key: Some(136),
	reply_iv: Some(168),
	flag: 184,
	layer_enc_type: None,
	req_time: 185,
	expiration: None,
	next_msg_id: 189,
	options: None,
	max_options: 0,
};

pub const LONG: Layout = Layout {
	len: 464,
	receive_tunnel: 0,
	our_ident: None,
	next_tunnel: 4,
	next_ident: 8,
	layer_key: Some(40),
	iv_key: Some(72),
	reply_key: Some(104),
	reply_iv: Some(136),
	flag: 152,
	layer_enc_type: None,
	req_time: 156,
	expiration: Some(160),
	next_msg_id: 164,
	options: Some(168),
	max_options: 464 - 168,
};

pub const SHORT: Layout = Layout {
	len: 154,
	receive_tunnel: 0,
	our_ident: None,
	next_tunnel: 4,
	next_ident: 8,
	layer_key: None,
	iv_key: None,
	reply_key: None,
	reply_iv: None,
	flag: 40,
	layer_enc_type: Some(43),
	req_time: 44,
	expiration: Some(48),
	next_msg_id: 52,
	options: Some(56),
	max_options: 154 - 56,
};
