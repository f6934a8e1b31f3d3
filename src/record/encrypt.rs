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

//! Record encryption to a hop.

use super::{
	layout, noise, BuildRequestRecord, EncryptedBuildRecord, RecipientKey, RecordFormat,
};
use crate::{elgamal, error::Error, IdentityHash};
use rand::{CryptoRng, Rng};

/// Encrypt `record` to the hop identified by `to_peer`, whose public key is
/// `to_key`.
///
/// The key type must match the record format: ElGamal for legacy records,
/// X25519 for modern ones. For modern records the reply keys (and, for short
/// records, the tunnel-layer keys) become available through
/// [`BuildRequestRecord::derived_keys`] after this call.
pub fn encrypt_record(
	rng: &mut (impl Rng + CryptoRng),
	record: &mut BuildRequestRecord,
	to_key: &RecipientKey,
	to_peer: &IdentityHash,
) -> Result<EncryptedBuildRecord, Error> {
	let mut out = vec![0u8; record.format.encrypted_len()];
	out[..layout::PEER_PREFIX_SIZE].copy_from_slice(&to_peer[..layout::PEER_PREFIX_SIZE]);

	match (record.format, to_key) {
		(RecordFormat::Legacy, RecipientKey::ElGamal(key)) => {
			let encrypted = elgamal::encrypt(rng, record.as_bytes(), *key)?;
			// The engine emits 257-byte halves; the leading zero byte of each
			// is dropped on the wire.
			out[layout::ELG_HALF_1..layout::ELG_HALF_2]
				.copy_from_slice(&encrypted[1..elgamal::KEY_SIZE + 1]);
			out[layout::ELG_HALF_2..].copy_from_slice(&encrypted[elgamal::KEY_SIZE + 2..]);
		},
		(RecordFormat::ModernLong | RecordFormat::ModernShort, RecipientKey::X25519(key)) => {
			let is_outbound_endpoint = record.read_is_outbound_endpoint();
			let handshake = noise::initiator_write(
				rng,
				*key,
				record.as_bytes(),
				&mut out[layout::PEER_PREFIX_SIZE..],
			);
			record.derived = Some(noise::derive_keys(
				handshake,
				record.format == RecordFormat::ModernShort,
				is_outbound_endpoint,
			));
		},
		_ => return Err(Error::UnsupportedKeyType),
	}
	EncryptedBuildRecord::new(out)
}
