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

//! Build request record formats.
//!
//! A cleartext [`BuildRequestRecord`] is created by one of the builders,
//! encrypted exactly once by the tunnel creator, or decrypted exactly once by
//! the receiving hop. Accessors hide the per-format offsets; for short
//! records the reply and tunnel-layer keys are not carried in the cleartext
//! at all but derived from the handshake, and live in [`DerivedKeys`].

mod builder;
mod decrypt;
mod encrypt;
mod layout;
mod noise;
pub mod options;
mod reader;
pub mod response;
#[cfg(test)]
mod tests;

pub use decrypt::decrypt_record;
pub use encrypt::encrypt_record;

use crate::{
	elgamal,
	error::Error,
	kx_pair::{KeyExchange, KxPublic},
	IdentityHash,
};
use layout::Layout;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// Size in bytes of a symmetric [`SessionKey`].
pub const SESSION_KEY_SIZE: usize = 32;

/// Symmetric key carried in or derived for a record.
pub type SessionKey = [u8; SESSION_KEY_SIZE];

/// Size in bytes of the reply IV carried by legacy and long records.
pub const REPLY_IV_SIZE: usize = 16;

/// Any peer may send messages into this tunnel; set only on an inbound
/// gateway.
pub(crate) const FLAG_UNRESTRICTED_PREV: u8 = 1 << 7;

/// This hop is an outbound endpoint; the next-hop fields describe where the
/// reply travels.
pub(crate) const FLAG_OUTBOUND_ENDPOINT: u8 = 1 << 6;

/// The three coexisting record formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
	/// 222-byte cleartext, ElGamal-encrypted into 528 bytes.
	Legacy,
	/// 464-byte cleartext, ECIES-encrypted into 528 bytes.
	ModernLong,
	/// 154-byte cleartext, ECIES-encrypted into 218 bytes, reply keys
	/// derived rather than carried.
	ModernShort,
}

impl RecordFormat {
	/// Fixed cleartext length of the format.
	pub const fn cleartext_len(self) -> usize {
		self.layout().len
	}

	/// Fixed wire length of the format.
	pub const fn encrypted_len(self) -> usize {
		match self {
			RecordFormat::Legacy | RecordFormat::ModernLong => layout::WIRE_LONG,
			RecordFormat::ModernShort => layout::WIRE_SHORT,
		}
	}

	pub(crate) const fn layout(self) -> &'static Layout {
		match self {
			RecordFormat::Legacy => &layout::LEGACY,
			RecordFormat::ModernLong => &layout::LONG,
			RecordFormat::ModernShort => &layout::SHORT,
		}
	}

	fn from_cleartext_len(len: usize) -> Result<Self, Error> {
		match len {
			l if l == layout::LEGACY.len => Ok(RecordFormat::Legacy),
			l if l == layout::LONG.len => Ok(RecordFormat::ModernLong),
			l if l == layout::SHORT.len => Ok(RecordFormat::ModernShort),
			_ => Err(Error::MalformedCleartext),
		}
	}
}

/// Cleartext build request record.
///
/// The buffer is zeroed when the record is dropped; derived keys can be
/// taken out first to outlive it.
pub struct BuildRequestRecord {
	pub(crate) data: Zeroizing<Vec<u8>>,
	pub(crate) format: RecordFormat,
	pub(crate) derived: Option<DerivedKeys>,
}

impl BuildRequestRecord {
	/// Wrap an already-decoded cleartext buffer.
	///
	/// The length selects the format; any other length is rejected.
	pub fn from_cleartext(data: Vec<u8>) -> Result<Self, Error> {
		let format = RecordFormat::from_cleartext_len(data.len())?;
		Ok(Self { data: Zeroizing::new(data), format, derived: None })
	}

	pub fn format(&self) -> RecordFormat {
		self.format
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Keys derived during encryption or decryption of this record, if any.
	pub fn derived_keys(&self) -> Option<&DerivedKeys> {
		self.derived.as_ref()
	}

	/// Move the derived keys out, so the cleartext can be dropped (and
	/// zeroed) while the keys live on.
	pub fn take_derived_keys(&mut self) -> Option<DerivedKeys> {
		self.derived.take()
	}

	pub(crate) fn layout(&self) -> &'static Layout {
		self.format.layout()
	}
}

/// Keys derived from the handshake of a modern record.
///
/// `reply_key`/`reply_ad` seal the build reply for both modern formats. The
/// tunnel-layer keys are derived for short records only; long records carry
/// them in the cleartext instead.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct DerivedKeys {
	/// Key sealing the reply record travelling back to the creator.
	pub reply_key: SessionKey,
	/// Handshake hash, used as associated data when sealing the reply.
	pub reply_ad: [u8; 32],
	/// Derived tunnel-layer keys; short records only.
	pub tunnel: Option<TunnelKeys>,
}

/// Tunnel-layer keys derived for a short record.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct TunnelKeys {
	pub layer_key: SessionKey,
	pub iv_key: SessionKey,
	/// Post-build garlic session keys; outbound endpoints only.
	pub garlic: Option<GarlicKeys>,
}

/// Key and tag consumed by the post-build garlic session.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct GarlicKeys {
	pub key: SessionKey,
	pub tag: [u8; 32],
}

/// Recipient key a record is encrypted to.
pub enum RecipientKey<'a> {
	ElGamal(&'a elgamal::PublicKey),
	X25519(&'a KxPublic),
}

/// Local key a record is decrypted with.
pub enum LocalKey<'a> {
	ElGamal(&'a elgamal::PrivateKey),
	X25519(&'a dyn KeyExchange),
}

/// Encrypted build record as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBuildRecord {
	data: Vec<u8>,
}

impl EncryptedBuildRecord {
	/// Wrap wire bytes. Only the two legal wire lengths are accepted.
	pub fn new(data: Vec<u8>) -> Result<Self, Error> {
		if data.len() != layout::WIRE_LONG && data.len() != layout::WIRE_SHORT {
			return Err(Error::InvalidArgument)
		}
		Ok(Self { data })
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether this is a short wire record.
	pub fn is_short(&self) -> bool {
		self.data.len() == layout::WIRE_SHORT
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.data
	}

	/// Whether the record's selector matches `hash`.
	///
	/// Each hop must check this before attempting to decrypt: the selector is
	/// how a hop finds its own record in a multi-record build message.
	pub fn matches_identity(&self, hash: &IdentityHash) -> bool {
		self.data[..layout::PEER_PREFIX_SIZE]
			.ct_eq(&hash[..layout::PEER_PREFIX_SIZE])
			.unwrap_u8() == 1
	}
}
