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

//! Single-message Noise `N` handshake and post-handshake key derivation.
//!
//! One message, initiator ephemeral against the hop's known static key. The
//! prologue is empty; callers interoperating with other stacks should confirm
//! this against the wrapping protocol before relying on it.
//!
//! Handshake symmetric state lives in [`Zeroizing`] buffers so it is
//! destroyed on every exit path.

use crate::{
	error::Error,
	kx_pair::{KeyExchange, KxPair, KxPublic, KX_PUBLIC_SIZE},
	record::{DerivedKeys, GarlicKeys, TunnelKeys},
};
use chacha20poly1305::{
	aead::{Aead, KeyInit, Payload},
	ChaCha20Poly1305, Key, Nonce,
};
use hkdf::Hkdf;
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const PROTOCOL_NAME: &[u8] = b"Noise_N_25519_ChaChaPoly_SHA256";

const INFO_REPLY_KEY: &[u8] = b"SMTunnelReplyKey";
const INFO_LAYER_KEY: &[u8] = b"SMTunnelLayerKey";
const INFO_IV_KEY: &[u8] = b"TunnelLayerIVKey";
const INFO_GARLIC: &[u8] = b"RGarlicKeyAndTag";

/// Final chaining key and handshake hash of a completed handshake.
#[derive(Debug)]
pub(crate) struct Handshake {
	pub chaining_key: Zeroizing<[u8; 32]>,
	pub hash: [u8; 32],
}

/// Run the initiator side, sealing `plaintext` to `their_static`.
///
/// Writes `[ephemeral public key ‖ ciphertext ‖ tag]` into `out`, which must
/// be exactly `plaintext.len() + 48` bytes.
pub(crate) fn initiator_write(
	rng: &mut (impl Rng + CryptoRng),
	their_static: &KxPublic,
	plaintext: &[u8],
	out: &mut [u8],
) -> Handshake {
	debug_assert_eq!(out.len(), plaintext.len() + KX_PUBLIC_SIZE + 16);
	let ephemeral = KxPair::gen(rng);

	let mut hash = mix_hash(&prologue_hash(), their_static);
	hash = mix_hash(&hash, ephemeral.public());

	let shared = Zeroizing::new(ephemeral.exchange(their_static));
	let (chaining_key, key) = mix_key(&protocol_chaining_key(), &*shared);

	let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
	let ciphertext = cipher
		.encrypt(&Nonce::default(), Payload { msg: plaintext, aad: &hash })
		.expect("Record cleartext fits a single AEAD message");

	out[..KX_PUBLIC_SIZE].copy_from_slice(ephemeral.public());
	out[KX_PUBLIC_SIZE..].copy_from_slice(&ciphertext);
	hash = mix_hash(&hash, &ciphertext);

	Handshake { chaining_key, hash }
}

/// Run the responder side over `message` = `[ephemeral ‖ ciphertext ‖ tag]`,
/// decrypting into `cleartext` (`message.len() - 48` bytes).
///
/// The caller is expected to have already rejected non-canonical ephemeral
/// keys; this only performs the exchange and the AEAD open.
pub(crate) fn responder_read(
	ours: &dyn KeyExchange,
	message: &[u8],
	cleartext: &mut [u8],
) -> Result<Handshake, Error> {
	debug_assert_eq!(message.len(), cleartext.len() + KX_PUBLIC_SIZE + 16);
	let mut their_ephemeral = [0u8; KX_PUBLIC_SIZE];
	their_ephemeral.copy_from_slice(&message[..KX_PUBLIC_SIZE]);

	let mut hash = mix_hash(&prologue_hash(), ours.public());
	hash = mix_hash(&hash, &their_ephemeral);

	let shared = Zeroizing::new(ours.exchange(&their_ephemeral));
	let (chaining_key, key) = mix_key(&protocol_chaining_key(), &*shared);

	let ciphertext = &message[KX_PUBLIC_SIZE..];
	let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
	let plaintext = cipher
		.decrypt(&Nonce::default(), Payload { msg: ciphertext, aad: &hash })
		.map_err(|_| {
			log::trace!(
				target: "tunnel_build",
				"Handshake open failed, hash {:02x?}, ephemeral {:02x?}",
				hash,
				their_ephemeral,
			);
			Error::DecryptFailed
		})?;
	cleartext.copy_from_slice(&plaintext);
	hash = mix_hash(&hash, ciphertext);

	Ok(Handshake { chaining_key, hash })
}

/// Expand a completed handshake into the keys the record's reply and tunnel
/// layers consume.
///
/// Long records use the chaining key and handshake hash directly. Short
/// records run the reply-key derivation chain; `is_outbound_endpoint`
/// selects the two extra steps producing the IV and garlic keys.
pub(crate) fn derive_keys(
	handshake: Handshake,
	short: bool,
	is_outbound_endpoint: bool,
) -> DerivedKeys {
	let Handshake { chaining_key, hash } = handshake;
	if !short {
		return DerivedKeys { reply_key: *chaining_key, reply_ad: hash, tunnel: None }
	}

	let (ck, reply_key) = hkdf_step(&chaining_key, INFO_REPLY_KEY);
	let (ck, layer_key) = hkdf_step(&ck, INFO_LAYER_KEY);
	let tunnel = if is_outbound_endpoint {
		let (ck, iv_key) = hkdf_step(&ck, INFO_IV_KEY);
		let (tag, garlic_key) = hkdf_step(&ck, INFO_GARLIC);
		TunnelKeys { layer_key, iv_key, garlic: Some(GarlicKeys { key: garlic_key, tag: *tag }) }
	} else {
		TunnelKeys { layer_key, iv_key: *ck, garlic: None }
	};
	DerivedKeys { reply_key, reply_ad: hash, tunnel: Some(tunnel) }
}

/// Chaining key the protocol name initializes: the name, zero-padded to 32.
fn protocol_chaining_key() -> [u8; 32] {
	let mut ck = [0u8; 32];
	ck[..PROTOCOL_NAME.len()].copy_from_slice(PROTOCOL_NAME);
	ck
}

/// Handshake hash after mixing the empty prologue.
fn prologue_hash() -> [u8; 32] {
	Sha256::digest(protocol_chaining_key()).into()
}

fn mix_hash(hash: &[u8; 32], data: &[u8]) -> [u8; 32] {
	let mut hasher = Sha256::new();
	hasher.update(hash);
	hasher.update(data);
	hasher.finalize().into()
}

/// Noise `MixKey`: HKDF with the chaining key as salt and the exchange
/// output as keying material, no info.
fn mix_key(ck: &[u8; 32], ikm: &[u8]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
	let (first, second) = expand(ck, ikm, &[]);
	(first, second)
}

/// One reply-chain step: HKDF with the chaining key as salt, empty keying
/// material, and the step label as info. Yields the next chaining key and
/// the named key.
fn hkdf_step(ck: &[u8; 32], info: &[u8]) -> (Zeroizing<[u8; 32]>, [u8; 32]) {
	let (next_ck, key) = expand(ck, &[], info);
	(next_ck, *key)
}

fn expand(salt: &[u8; 32], ikm: &[u8], info: &[u8]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
	let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
	let mut okm = Zeroizing::new([0u8; 64]);
	hk.expand(info, &mut *okm).expect("64 bytes is a valid HKDF-SHA-256 output length");
	let mut first = Zeroizing::new([0u8; 32]);
	let mut second = Zeroizing::new([0u8; 32]);
	first.copy_from_slice(&okm[..32]);
	second.copy_from_slice(&okm[32..]);
	(first, second)
}
