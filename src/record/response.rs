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

//! Build response record codec.
//!
//! Each hop answers a build request with a response record of the same wire
//! size, so the message length does not betray how far the build has
//! progressed. Modern responses are sealed with the reply key this codec
//! derives ([`DerivedKeys`]); legacy responses are integrity-framed here and
//! iteratively encrypted elsewhere, as with legacy requests.

use super::{
	layout,
	options::{self, Options},
	DerivedKeys,
};
use crate::error::Error;
use chacha20poly1305::{
	aead::{Aead, KeyInit, Payload},
	ChaCha20Poly1305, Key, Nonce,
};
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Reply status of a hop that accepted the request. Any other value is a
/// rejection, with semantics agreed between router implementations.
pub const STATUS_ACCEPT: u8 = 0;

/// Plaintext size of a long response; the tag brings it to the wire size.
const LONG_PLAINTEXT: usize = layout::WIRE_LONG - layout::MAC_SIZE;

/// Plaintext size of a short response.
const SHORT_PLAINTEXT: usize = layout::WIRE_SHORT - layout::MAC_SIZE;

/// Decoded build response.
#[derive(Debug, PartialEq, Eq)]
pub struct BuildResponse {
	pub status: u8,
	pub options: Options,
}

/// Frame a legacy response: a hash over the remainder, random fill, and the
/// status in the last byte.
///
/// Legacy records carry no options mapping, in either direction; only modern
/// responses do.
pub fn create_legacy_response(rng: &mut (impl Rng + CryptoRng), status: u8) -> Vec<u8> {
	let mut out = vec![0u8; layout::WIRE_LONG];
	rng.fill_bytes(&mut out[32..]);
	out[layout::WIRE_LONG - 1] = status;
	let hash: [u8; 32] = Sha256::digest(&out[32..]).into();
	out[..32].copy_from_slice(&hash);
	out
}

/// Check a legacy response frame and extract the status. The options
/// mapping is always empty for legacy responses.
pub fn read_legacy_response(data: &[u8]) -> Result<BuildResponse, Error> {
	if data.len() != layout::WIRE_LONG {
		return Err(Error::DecryptFailed)
	}
	let hash = Sha256::digest(&data[32..]);
	if hash.ct_eq(&data[..32]).unwrap_u8() == 0 {
		return Err(Error::DecryptFailed)
	}
	Ok(BuildResponse { status: data[layout::WIRE_LONG - 1], options: Options::new() })
}

/// Seal a long response with the reply key derived from the request.
pub fn create_long_response(
	rng: &mut (impl Rng + CryptoRng),
	keys: &DerivedKeys,
	status: u8,
	response_options: &Options,
) -> Result<Vec<u8>, Error> {
	let plaintext = fill_plaintext(rng, LONG_PLAINTEXT, status, response_options)?;
	seal(keys, 0, &plaintext)
}

/// Open a long response.
pub fn read_long_response(data: &[u8], keys: &DerivedKeys) -> Result<BuildResponse, Error> {
	if data.len() != layout::WIRE_LONG {
		return Err(Error::DecryptFailed)
	}
	open(keys, 0, data)
}

/// Seal a short response. `slot` is the record's position in the enclosing
/// build message; it keeps the nonce unique across the message's records.
pub fn create_short_response(
	rng: &mut (impl Rng + CryptoRng),
	keys: &DerivedKeys,
	slot: u64,
	status: u8,
	response_options: &Options,
) -> Result<Vec<u8>, Error> {
	let plaintext = fill_plaintext(rng, SHORT_PLAINTEXT, status, response_options)?;
	seal(keys, slot, &plaintext)
}

/// Open a short response from position `slot`.
pub fn read_short_response(
	data: &[u8],
	keys: &DerivedKeys,
	slot: u64,
) -> Result<BuildResponse, Error> {
	if data.len() != layout::WIRE_SHORT {
		return Err(Error::DecryptFailed)
	}
	open(keys, slot, data)
}

/// Options up front, random fill, status in the last byte.
fn fill_plaintext(
	rng: &mut (impl Rng + CryptoRng),
	len: usize,
	status: u8,
	response_options: &Options,
) -> Result<Vec<u8>, Error> {
	let mut plaintext = vec![0u8; len];
	let written = options::encode_into(&mut plaintext, response_options, len - 1)?;
	rng.fill_bytes(&mut plaintext[written..len - 1]);
	plaintext[len - 1] = status;
	Ok(plaintext)
}

fn seal(keys: &DerivedKeys, slot: u64, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
	let cipher = ChaCha20Poly1305::new(Key::from_slice(&keys.reply_key));
	cipher
		.encrypt(&nonce(slot), Payload { msg: plaintext, aad: &keys.reply_ad })
		.map_err(|_| Error::InvalidArgument)
}

fn open(keys: &DerivedKeys, slot: u64, data: &[u8]) -> Result<BuildResponse, Error> {
	let cipher = ChaCha20Poly1305::new(Key::from_slice(&keys.reply_key));
	let plaintext = cipher
		.decrypt(&nonce(slot), Payload { msg: data, aad: &keys.reply_ad })
		.map_err(|_| Error::DecryptFailed)?;
	let status = plaintext[plaintext.len() - 1];
	Ok(BuildResponse { status, options: options::decode(&plaintext) })
}

fn nonce(slot: u64) -> Nonce {
	let mut nonce = [0u8; 12];
	nonce[4..].copy_from_slice(&slot.to_le_bytes());
	nonce.into()
}
