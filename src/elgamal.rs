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

//! Legacy 2048-bit ElGamal engine.
//!
//! Discrete-log ElGamal over the RFC 3526 group 14 prime with generator 2.
//! The plaintext is wrapped in a hashed block before exponentiation:
//!
//! ```text
//!   byte       0: 0xFF
//!   bytes   1-32: SHA-256 of the payload
//!   bytes    33..: payload (up to 222 bytes)
//! ```
//!
//! The engine's output is two 257-byte halves, one per group element, each
//! carrying a leading zero byte. Wire formats that embed the ciphertext strip
//! that byte on encode and reinsert it on decode; the quirk belongs to the
//! engine's output encoding, not to any record layout.

use crate::error::Error;
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Size in bytes of a serialized group element.
pub const KEY_SIZE: usize = 256;

/// Size in bytes of the engine output: two halves of `KEY_SIZE` + 1 each.
pub const ENCRYPTED_SIZE: usize = 2 * (KEY_SIZE + 1);

/// Largest payload the hashed block can carry.
pub const MAX_PLAINTEXT: usize = 255 - BLOCK_OVERHEAD;

/// Leading marker byte plus payload hash.
const BLOCK_OVERHEAD: usize = 1 + 32;

/// ElGamal public key (y = g^x mod p).
#[derive(Clone)]
pub struct PublicKey(BigUint);

/// ElGamal private exponent.
#[derive(Clone)]
pub struct PrivateKey(BigUint);

impl PublicKey {
	pub fn from_bytes(bytes: &[u8; KEY_SIZE]) -> Self {
		Self(BigUint::from_bytes_be(bytes))
	}

	pub fn to_bytes(&self) -> [u8; KEY_SIZE] {
		to_fixed::<KEY_SIZE>(&self.0)
	}
}

impl PrivateKey {
	pub fn from_bytes(bytes: &[u8; KEY_SIZE]) -> Self {
		Self(BigUint::from_bytes_be(bytes))
	}

	pub fn to_bytes(&self) -> [u8; KEY_SIZE] {
		to_fixed::<KEY_SIZE>(&self.0)
	}
}

/// Generate a key pair.
pub fn generate_keys(rng: &mut (impl Rng + CryptoRng)) -> (PublicKey, PrivateKey) {
	let p = prime();
	let x = random_below(rng, &(&p - 2u8)) + 1u8;
	let y = BigUint::from(2u8).modpow(&x, &p);
	(PublicKey(y), PrivateKey(x))
}

/// Encrypt `data` to `to_key`.
///
/// Returns the two 257-byte halves back to back, leading zero bytes included.
pub fn encrypt(
	rng: &mut (impl Rng + CryptoRng),
	data: &[u8],
	to_key: &PublicKey,
) -> Result<[u8; ENCRYPTED_SIZE], Error> {
	if data.is_empty() || data.len() > MAX_PLAINTEXT {
		return Err(Error::InvalidArgument)
	}
	let p = prime();

	let mut block = Vec::with_capacity(BLOCK_OVERHEAD + data.len());
	block.push(0xFF);
	block.extend_from_slice(&Sha256::digest(data));
	block.extend_from_slice(data);
	let m = BigUint::from_bytes_be(&block);

	let k = random_below(rng, &(&p - 2u8)) + 1u8;
	let c1 = BigUint::from(2u8).modpow(&k, &p);
	let c2 = (m * to_key.0.modpow(&k, &p)) % &p;

	let mut out = [0u8; ENCRYPTED_SIZE];
	out[1..KEY_SIZE + 1].copy_from_slice(&to_fixed::<KEY_SIZE>(&c1));
	out[KEY_SIZE + 2..].copy_from_slice(&to_fixed::<KEY_SIZE>(&c2));
	Ok(out)
}

/// Decrypt two 257-byte halves produced by [`encrypt`].
///
/// Fails if the block marker or the payload hash does not check out.
pub fn decrypt(data: &[u8; ENCRYPTED_SIZE], key: &PrivateKey) -> Result<Vec<u8>, Error> {
	let p = prime();
	let c1 = BigUint::from_bytes_be(&data[..KEY_SIZE + 1]);
	let c2 = BigUint::from_bytes_be(&data[KEY_SIZE + 1..]);

	let exp = &p - BigUint::one() - &key.0;
	let m = (c1.modpow(&exp, &p) * c2) % &p;

	let block = m.to_bytes_be();
	if block.len() <= BLOCK_OVERHEAD || block[0] != 0xFF {
		return Err(Error::DecryptFailed)
	}
	let payload = &block[BLOCK_OVERHEAD..];
	let hash = Sha256::digest(payload);
	if hash.ct_eq(&block[1..BLOCK_OVERHEAD]).unwrap_u8() == 0 {
		return Err(Error::DecryptFailed)
	}
	Ok(payload.to_vec())
}

/// RFC 3526 group 14 modulus.
fn prime() -> BigUint {
	const PRIME_HEX: &[u8] = b"\
		FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
		020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
		4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
		EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
		98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
		9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
		E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
		3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";
	BigUint::parse_bytes(PRIME_HEX, 16).expect("Modulus constant is valid hex")
}

fn random_below(rng: &mut (impl Rng + CryptoRng), bound: &BigUint) -> BigUint {
	let mut buf = [0u8; KEY_SIZE];
	rng.fill_bytes(&mut buf);
	BigUint::from_bytes_be(&buf) % bound
}

fn to_fixed<const N: usize>(n: &BigUint) -> [u8; N] {
	let bytes = n.to_bytes_be();
	let mut out = [0u8; N];
	out[N - bytes.len()..].copy_from_slice(&bytes);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::RngCore;

	#[test]
	fn round_trip() {
		let mut rng = rand::thread_rng();
		let (public, private) = generate_keys(&mut rng);

		let mut data = [0u8; MAX_PLAINTEXT];
		rng.fill_bytes(&mut data);
		let encrypted = encrypt(&mut rng, &data, &public).unwrap();
		assert_eq!(encrypted[0], 0);
		assert_eq!(encrypted[KEY_SIZE + 1], 0);
		assert_eq!(decrypt(&encrypted, &private).unwrap(), data);
	}

	#[test]
	fn corrupt_half_fails() {
		let mut rng = rand::thread_rng();
		let (public, private) = generate_keys(&mut rng);

		let mut encrypted = encrypt(&mut rng, b"payload", &public).unwrap();
		encrypted[KEY_SIZE] ^= 1;
		assert_eq!(decrypt(&encrypted, &private), Err(Error::DecryptFailed));
	}

	#[test]
	fn oversized_plaintext_rejected() {
		let mut rng = rand::thread_rng();
		let (public, _) = generate_keys(&mut rng);
		let data = [0u8; MAX_PLAINTEXT + 1];
		assert_eq!(encrypt(&mut rng, &data, &public), Err(Error::InvalidArgument));
	}
}
