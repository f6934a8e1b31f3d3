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

//! Tunnel build request record codec.
//!
//! Each hop of a newly built tunnel receives one fixed-size encrypted record
//! telling it what its role is, which keys to use for forwarding, and how to
//! reply. Three wire formats coexist:
//!
//! * the legacy 222-byte cleartext, ElGamal-encrypted into 528 bytes,
//! * the long 464-byte cleartext, ECIES-encrypted into 528 bytes,
//! * the short 154-byte cleartext, ECIES-encrypted into 218 bytes, with the
//!   reply-side symmetric keys derived from the handshake chaining key rather
//!   than carried in the cleartext.
//!
//! The codec builds cleartext records, encrypts them to a hop, decrypts them
//! as a hop, and answers typed queries against the decoded cleartext. The
//! enclosing multi-record build message, peer selection, and transport are
//! all the caller's concern.

pub mod elgamal;
mod error;
mod kx_pair;
mod record;

pub use error::Error;
pub use kx_pair::{KeyExchange, KxPair, KxPublic, SharedSecret, KX_PUBLIC_SIZE};
pub use record::{
	decrypt_record, encrypt_record,
	options::Options,
	response::{
		create_legacy_response, create_long_response, create_short_response,
		read_legacy_response, read_long_response, read_short_response, BuildResponse,
		STATUS_ACCEPT,
	},
	BuildRequestRecord, DerivedKeys, EncryptedBuildRecord, GarlicKeys, LocalKey, RecipientKey,
	RecordFormat, SessionKey, TunnelKeys, REPLY_IV_SIZE, SESSION_KEY_SIZE,
};

/// Identity hash of a hop.
pub type IdentityHash = [u8; IDENTITY_HASH_SIZE];

/// Size in bytes of an [`IdentityHash`].
pub const IDENTITY_HASH_SIZE: usize = 32;

/// Tunnel identifier carried in build records.
pub type TunnelId = u32;

/// Message identifier used for the forwarded request or the reply.
pub type MessageId = u32;

/// Wall-clock source with millisecond resolution.
///
/// Builders take the clock as a parameter so tests can pin time.
pub trait Clock {
	/// Milliseconds since the Unix epoch.
	fn now_millis(&self) -> u64;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			// A clock before the epoch reads as the epoch.
			.map_or(0, |d| d.as_millis() as u64)
	}
}
