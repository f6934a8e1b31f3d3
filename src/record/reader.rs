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

//! Typed accessors over cleartext records.
//!
//! None of the reads are cached; callers should read each field once.

use super::{
	builder::{DEFAULT_EXPIRATION_SECONDS, HOUR_MS, MINUTE_MS},
	options::{self, Options},
	BuildRequestRecord, GarlicKeys, RecordFormat, SessionKey, FLAG_OUTBOUND_ENDPOINT,
	FLAG_UNRESTRICTED_PREV, REPLY_IV_SIZE,
};
use crate::{error::Error, IdentityHash, MessageId, TunnelId};
use arrayref::array_ref;
use std::fmt;

impl BuildRequestRecord {
	/// Tunnel id this hop will accept incoming tunnel messages on.
	pub fn read_receive_tunnel_id(&self) -> TunnelId {
		self.read_u32(self.layout().receive_tunnel)
	}

	/// Tunnel id of the next hop, or, at the outbound endpoint, the tunnel
	/// the reply travels in.
	pub fn read_next_tunnel_id(&self) -> TunnelId {
		self.read_u32(self.layout().next_tunnel)
	}

	/// Next hop identity, or the reply gateway at the outbound endpoint.
	pub fn read_next_identity(&self) -> IdentityHash {
		*array_ref![self.data, self.layout().next_ident, 32]
	}

	/// Whether any peer may send messages into this tunnel; set only on an
	/// inbound gateway.
	pub fn read_is_inbound_gateway(&self) -> bool {
		self.data[self.layout().flag] & FLAG_UNRESTRICTED_PREV != 0
	}

	/// Whether this hop is the outbound endpoint.
	pub fn read_is_outbound_endpoint(&self) -> bool {
		self.data[self.layout().flag] & FLAG_OUTBOUND_ENDPOINT != 0
	}

	/// Moment the record was minted, in milliseconds, at the format's
	/// quantization (hours for legacy records, minutes for modern ones).
	pub fn read_request_time_millis(&self) -> u64 {
		let quanta = u64::from(self.read_u32(self.layout().req_time));
		match self.format {
			RecordFormat::Legacy => quanta * HOUR_MS,
			_ => quanta * MINUTE_MS,
		}
	}

	/// Expiration in milliseconds from creation.
	pub fn read_expiration_millis(&self) -> u64 {
		match self.layout().expiration {
			Some(off) => u64::from(self.read_u32(off)) * 1000,
			None => u64::from(DEFAULT_EXPIRATION_SECONDS) * 1000,
		}
	}

	/// Message id for the forwarded request, or for the reply at the
	/// outbound endpoint.
	pub fn read_next_msg_id(&self) -> MessageId {
		self.read_u32(self.layout().next_msg_id)
	}

	/// Tunnel layer key for this hop: in-band for legacy and long records,
	/// derived for short ones.
	pub fn read_layer_key(&self) -> Result<SessionKey, Error> {
		match self.layout().layer_key {
			Some(off) => Ok(*array_ref![self.data, off, 32]),
			None => self.derived_tunnel().map(|keys| keys.layer_key),
		}
	}

	/// Tunnel IV key for this hop; derived for short records.
	pub fn read_iv_key(&self) -> Result<SessionKey, Error> {
		match self.layout().iv_key {
			Some(off) => Ok(*array_ref![self.data, off, 32]),
			None => self.derived_tunnel().map(|keys| keys.iv_key),
		}
	}

	/// Key encrypting the reply to this request.
	///
	/// Short records never carry one; their reply is sealed with the derived
	/// key in [`DerivedKeys`](super::DerivedKeys) instead, and this fails.
	pub fn read_reply_key(&self) -> Result<SessionKey, Error> {
		match self.layout().reply_key {
			Some(off) => Ok(*array_ref![self.data, off, 32]),
			None => Err(Error::IllegalState),
		}
	}

	/// IV for the reply encryption; fails on short records as
	/// [`read_reply_key`](Self::read_reply_key) does.
	pub fn read_reply_iv(&self) -> Result<[u8; REPLY_IV_SIZE], Error> {
		match self.layout().reply_iv {
			Some(off) => Ok(*array_ref![self.data, off, REPLY_IV_SIZE]),
			None => Err(Error::IllegalState),
		}
	}

	/// Options mapping of a modern record; empty for legacy records and on
	/// parse errors (corrupted options are indistinguishable from padding).
	pub fn read_options(&self) -> Options {
		match self.layout().options {
			Some(off) => options::decode(&self.data[off..off + self.layout().max_options]),
			None => Options::new(),
		}
	}

	/// Tunnel layer encryption type; zero outside short records.
	pub fn read_layer_enc_type(&self) -> u8 {
		match self.layout().layer_enc_type {
			Some(off) => self.data[off],
			None => 0,
		}
	}

	/// Garlic session keys, present only after encrypting or decrypting a
	/// short outbound-endpoint record.
	pub fn garlic_keys(&self) -> Option<&GarlicKeys> {
		self.derived.as_ref()?.tunnel.as_ref()?.garlic.as_ref()
	}

	fn read_u32(&self, off: usize) -> u32 {
		u32::from_be_bytes(*array_ref![self.data, off, 4])
	}

	fn derived_tunnel(&self) -> Result<&super::TunnelKeys, Error> {
		self.derived
			.as_ref()
			.and_then(|keys| keys.tunnel.as_ref())
			.ok_or(Error::IllegalState)
	}
}

impl fmt::Debug for BuildRequestRecord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("BuildRequestRecord")
			.field("format", &self.format)
			.field("derived", &self.derived.is_some())
			.finish_non_exhaustive()
	}
}

/// Role summary; key material is not printed.
impl fmt::Display for BuildRequestRecord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let format = match self.format {
			RecordFormat::Legacy => "legacy",
			RecordFormat::ModernLong => "long",
			RecordFormat::ModernShort => "short",
		};
		if self.read_is_inbound_gateway() {
			write!(
				f,
				"{} IBGW record in: {} out: {}",
				format,
				self.read_receive_tunnel_id(),
				self.read_next_tunnel_id()
			)?;
		} else if self.read_is_outbound_endpoint() {
			write!(f, "{} OBEP record in: {}", format, self.read_receive_tunnel_id())?;
		} else {
			write!(
				f,
				"{} participant record in: {} out: {}",
				format,
				self.read_receive_tunnel_id(),
				self.read_next_tunnel_id()
			)?;
		}
		write!(
			f,
			" reply msg id: {} minted: {}ms expires in: {}ms",
			self.read_next_msg_id(),
			self.read_request_time_millis(),
			self.read_expiration_millis()
		)
	}
}
