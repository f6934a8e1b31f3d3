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

//! X25519 key-exchange key pair.

use rand::{CryptoRng, Rng};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// Size in bytes of a [`KxPublic`].
pub const KX_PUBLIC_SIZE: usize = 32;

/// X25519 public key bytes.
pub type KxPublic = [u8; KX_PUBLIC_SIZE];

/// Raw Diffie-Hellman output.
pub type SharedSecret = [u8; 32];

/// Diffie-Hellman seam used by the record decryptor.
///
/// Implemented by [`KxPair`]; tests substitute an instrumented implementation
/// to assert that malformed records are rejected before any exchange runs.
pub trait KeyExchange {
	/// Public half of the key pair.
	fn public(&self) -> &KxPublic;

	/// X25519 exchange against `their_public`.
	fn exchange(&self, their_public: &KxPublic) -> SharedSecret;
}

/// Static or ephemeral X25519 key pair.
pub struct KxPair {
	/// Boxed to avoid leaving copies of the secret key around in memory if `KxPair` is moved.
	secret: Box<StaticSecret>,
	public: KxPublic,
}

impl KxPair {
	pub fn gen(rng: &mut (impl Rng + CryptoRng)) -> Self {
		let mut raw_key = [0u8; 32];
		rng.fill_bytes(&mut raw_key);
		let pair = Self::from(raw_key);
		raw_key.zeroize();
		pair
	}

	pub fn public(&self) -> &KxPublic {
		&self.public
	}
}

impl From<[u8; 32]> for KxPair {
	fn from(secret: [u8; 32]) -> Self {
		// We box the secret to avoid leaving copies of it in memory when the KxPair is moved. Note
		// that we will likely leave some copies on the stack here; I'm not aware of any good way
		// of avoiding this.
		let secret = Box::new(StaticSecret::from(secret));
		let public = PublicKey::from(secret.as_ref()).to_bytes();
		Self { secret, public }
	}
}

impl KeyExchange for KxPair {
	fn public(&self) -> &KxPublic {
		&self.public
	}

	fn exchange(&self, their_public: &KxPublic) -> SharedSecret {
		self.secret.diffie_hellman(&PublicKey::from(*their_public)).to_bytes()
	}
}
