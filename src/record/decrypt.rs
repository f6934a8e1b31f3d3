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

//! Record decryption by the receiving hop.

use super::{
	layout, noise, BuildRequestRecord, EncryptedBuildRecord, LocalKey, RecordFormat,
	FLAG_OUTBOUND_ENDPOINT,
};
use crate::{elgamal, error::Error, kx_pair::KeyExchange, KX_PUBLIC_SIZE};
use arrayref::array_ref;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Decrypt a record addressed to us.
///
/// The caller must already have checked that the record's selector matches
/// our identity hash ([`EncryptedBuildRecord::matches_identity`]); that is
/// not re-checked here.
///
/// Every rejection reason, from a malformed ephemeral key to an
/// authentication failure, reports the same [`Error::DecryptFailed`] so the
/// sender learns nothing from the failure mode.
pub fn decrypt_record(
	encrypted: &EncryptedBuildRecord,
	our_key: &LocalKey,
) -> Result<BuildRequestRecord, Error> {
	match our_key {
		LocalKey::ElGamal(key) => decrypt_legacy(encrypted, *key),
		LocalKey::X25519(key) => decrypt_modern(encrypted, *key),
	}
}

fn decrypt_legacy(
	encrypted: &EncryptedBuildRecord,
	key: &elgamal::PrivateKey,
) -> Result<BuildRequestRecord, Error> {
	if encrypted.len() != layout::WIRE_LONG {
		return Err(Error::DecryptFailed)
	}
	let data = encrypted.as_bytes();

	// Reinsert the leading zero byte of each half the wire format dropped.
	let mut halves = [0u8; elgamal::ENCRYPTED_SIZE];
	halves[1..elgamal::KEY_SIZE + 1].copy_from_slice(&data[layout::ELG_HALF_1..layout::ELG_HALF_2]);
	halves[elgamal::KEY_SIZE + 2..].copy_from_slice(&data[layout::ELG_HALF_2..]);

	let cleartext = elgamal::decrypt(&halves, key)?;
	if cleartext.len() != layout::LEGACY.len {
		return Err(Error::DecryptFailed)
	}
	Ok(BuildRequestRecord {
		data: Zeroizing::new(cleartext),
		format: RecordFormat::Legacy,
		derived: None,
	})
}

fn decrypt_modern(
	encrypted: &EncryptedBuildRecord,
	our_key: &dyn KeyExchange,
) -> Result<BuildRequestRecord, Error> {
	let data = encrypted.as_bytes();
	let ephemeral = array_ref![data, layout::PEER_PREFIX_SIZE, KX_PUBLIC_SIZE];

	// Bogus-encrypted records are common enough (peers picking the wrong
	// key type, echoing our own key, or sending a zero key) that they are
	// weeded out before paying for the exchange.
	//
	// A canonical public key is below 2^255.
	if ephemeral[KX_PUBLIC_SIZE - 1] & 0x80 != 0 {
		log::trace!(target: "tunnel_build", "Rejecting record, non-canonical ephemeral key");
		return Err(Error::DecryptFailed)
	}
	if our_key.public().ct_eq(ephemeral).unwrap_u8() == 1 {
		log::trace!(target: "tunnel_build", "Rejecting record encrypted to our own public key");
		return Err(Error::DecryptFailed)
	}
	if ephemeral.ct_eq(&[0u8; KX_PUBLIC_SIZE]).unwrap_u8() == 1 {
		log::trace!(target: "tunnel_build", "Rejecting record with all-zero ephemeral key");
		return Err(Error::DecryptFailed)
	}

	// Wire length minus selector, ephemeral key, and tag disambiguates the
	// long and short cleartext formats.
	let cleartext_len = data.len() - layout::MODERN_OVERHEAD;
	let format =
		if encrypted.is_short() { RecordFormat::ModernShort } else { RecordFormat::ModernLong };
	debug_assert_eq!(cleartext_len, format.cleartext_len());

	let mut cleartext = Zeroizing::new(vec![0u8; cleartext_len]);
	let handshake =
		noise::responder_read(our_key, &data[layout::PEER_PREFIX_SIZE..], &mut cleartext)?;

	let is_outbound_endpoint = format == RecordFormat::ModernShort &&
		cleartext[layout::SHORT.flag] & FLAG_OUTBOUND_ENDPOINT != 0;
	let derived = noise::derive_keys(
		handshake,
		format == RecordFormat::ModernShort,
		is_outbound_endpoint,
	);

	Ok(BuildRequestRecord { data: cleartext, format, derived: Some(derived) })
}
