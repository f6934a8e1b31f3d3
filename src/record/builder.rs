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

//! Cleartext record builders, one per format.

use super::{
	layout, options::{self, Options}, BuildRequestRecord, RecordFormat, SessionKey,
	FLAG_OUTBOUND_ENDPOINT, FLAG_UNRESTRICTED_PREV, REPLY_IV_SIZE,
};
use crate::{error::Error, Clock, IdentityHash, MessageId, TunnelId};
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

/// Milliseconds per request-time quantum, legacy records.
pub(crate) const HOUR_MS: u64 = 60 * 60 * 1000;

/// Milliseconds per request-time quantum, modern records.
pub(crate) const MINUTE_MS: u64 = 60 * 1000;

/// Anti-correlation window for legacy records. The request time is backed
/// off by a random amount below this before quantization, so hops built near
/// the top of the hour cannot be correlated by their timestamps.
const LEGACY_BACKDATE_MS: u64 = 90 * 1000;

/// Anti-correlation window for modern records.
const MODERN_BACKDATE_MS: u64 = 2048;

/// Request expiration written into modern records, and implied by legacy
/// ones.
pub(crate) const DEFAULT_EXPIRATION_SECONDS: u32 = 10 * 60;

impl BuildRequestRecord {
	/// Build a legacy record.
	///
	/// `next_tunnel_id`/`next_ident` name the next hop, or where the reply
	/// travels if this hop is the outbound endpoint. The four symmetric keys
	/// are carried in the cleartext.
	#[allow(clippy::too_many_arguments)]
	pub fn new_legacy(
		rng: &mut (impl Rng + CryptoRng),
		clock: &impl Clock,
		receive_tunnel_id: TunnelId,
		our_ident: &IdentityHash,
		next_tunnel_id: TunnelId,
		next_ident: &IdentityHash,
		next_msg_id: MessageId,
		layer_key: &SessionKey,
		iv_key: &SessionKey,
		reply_key: &SessionKey,
		reply_iv: &[u8; REPLY_IV_SIZE],
		is_inbound_gateway: bool,
		is_outbound_endpoint: bool,
	) -> Result<Self, Error> {
		let lo = &layout::LEGACY;
		let mut buf = start(lo.len, is_inbound_gateway, is_outbound_endpoint)?;

		buf[lo.receive_tunnel..lo.receive_tunnel + 4]
			.copy_from_slice(&receive_tunnel_id.to_be_bytes());
		let our = lo.our_ident.expect("Legacy layout carries the local identity");
		buf[our..our + 32].copy_from_slice(our_ident);
		buf[lo.next_tunnel..lo.next_tunnel + 4].copy_from_slice(&next_tunnel_id.to_be_bytes());
		buf[lo.next_ident..lo.next_ident + 32].copy_from_slice(next_ident);
		write_keys(&mut buf, lo, layer_key, iv_key, reply_key, reply_iv);
		buf[lo.flag] = flag_byte(is_inbound_gateway, is_outbound_endpoint);

		let hours = quantized_time(rng, clock, LEGACY_BACKDATE_MS, HOUR_MS);
		buf[lo.req_time..lo.req_time + 4].copy_from_slice(&hours.to_be_bytes());
		buf[lo.next_msg_id..lo.next_msg_id + 4].copy_from_slice(&next_msg_id.to_be_bytes());

		rng.fill_bytes(&mut buf[lo.next_msg_id + 4..]);
		Ok(Self { data: buf, format: RecordFormat::Legacy, derived: None })
	}

	/// Build a long record. As [`new_legacy`](Self::new_legacy), minus the
	/// local identity, plus an explicit expiration and an options mapping.
	#[allow(clippy::too_many_arguments)]
	pub fn new_long(
		rng: &mut (impl Rng + CryptoRng),
		clock: &impl Clock,
		receive_tunnel_id: TunnelId,
		next_tunnel_id: TunnelId,
		next_ident: &IdentityHash,
		next_msg_id: MessageId,
		layer_key: &SessionKey,
		iv_key: &SessionKey,
		reply_key: &SessionKey,
		reply_iv: &[u8; REPLY_IV_SIZE],
		is_inbound_gateway: bool,
		is_outbound_endpoint: bool,
		options: &Options,
	) -> Result<Self, Error> {
		let lo = &layout::LONG;
		let mut buf = start(lo.len, is_inbound_gateway, is_outbound_endpoint)?;

		buf[lo.receive_tunnel..lo.receive_tunnel + 4]
			.copy_from_slice(&receive_tunnel_id.to_be_bytes());
		buf[lo.next_tunnel..lo.next_tunnel + 4].copy_from_slice(&next_tunnel_id.to_be_bytes());
		buf[lo.next_ident..lo.next_ident + 32].copy_from_slice(next_ident);
		write_keys(&mut buf, lo, layer_key, iv_key, reply_key, reply_iv);

		finish_modern(
			rng,
			clock,
			&mut buf,
			lo,
			next_msg_id,
			is_inbound_gateway,
			is_outbound_endpoint,
			options,
		)?;
		Ok(Self { data: buf, format: RecordFormat::ModernLong, derived: None })
	}

	/// Build a short record. No keys are carried: the hop derives its reply
	/// and tunnel-layer keys from the handshake chaining key.
	pub fn new_short(
		rng: &mut (impl Rng + CryptoRng),
		clock: &impl Clock,
		receive_tunnel_id: TunnelId,
		next_tunnel_id: TunnelId,
		next_ident: &IdentityHash,
		next_msg_id: MessageId,
		is_inbound_gateway: bool,
		is_outbound_endpoint: bool,
		options: &Options,
	) -> Result<Self, Error> {
		let lo = &layout::SHORT;
		let mut buf = start(lo.len, is_inbound_gateway, is_outbound_endpoint)?;

		buf[lo.receive_tunnel..lo.receive_tunnel + 4]
			.copy_from_slice(&receive_tunnel_id.to_be_bytes());
		buf[lo.next_tunnel..lo.next_tunnel + 4].copy_from_slice(&next_tunnel_id.to_be_bytes());
		buf[lo.next_ident..lo.next_ident + 32].copy_from_slice(next_ident);
		// Unused flags and layer encryption type stay zero.

		finish_modern(
			rng,
			clock,
			&mut buf,
			lo,
			next_msg_id,
			is_inbound_gateway,
			is_outbound_endpoint,
			options,
		)?;
		Ok(Self { data: buf, format: RecordFormat::ModernShort, derived: None })
	}
}

fn start(
	len: usize,
	is_inbound_gateway: bool,
	is_outbound_endpoint: bool,
) -> Result<Zeroizing<Vec<u8>>, Error> {
	if is_inbound_gateway && is_outbound_endpoint {
		return Err(Error::InvalidArgument)
	}
	Ok(Zeroizing::new(vec![0u8; len]))
}

fn flag_byte(is_inbound_gateway: bool, is_outbound_endpoint: bool) -> u8 {
	if is_inbound_gateway {
		FLAG_UNRESTRICTED_PREV
	} else if is_outbound_endpoint {
		FLAG_OUTBOUND_ENDPOINT
	} else {
		0
	}
}

fn write_keys(
	buf: &mut [u8],
	lo: &layout::Layout,
	layer_key: &SessionKey,
	iv_key: &SessionKey,
	reply_key: &SessionKey,
	reply_iv: &[u8; REPLY_IV_SIZE],
) {
	let off = lo.layer_key.expect("Layout carries in-band keys");
	buf[off..off + 32].copy_from_slice(layer_key);
	let off = lo.iv_key.expect("Layout carries in-band keys");
	buf[off..off + 32].copy_from_slice(iv_key);
	let off = lo.reply_key.expect("Layout carries in-band keys");
	buf[off..off + 32].copy_from_slice(reply_key);
	let off = lo.reply_iv.expect("Layout carries in-band keys");
	buf[off..off + REPLY_IV_SIZE].copy_from_slice(reply_iv);
}

/// Shared tail of the two modern builders: flags, timestamps, message id,
/// options, then random padding over whatever remains.
#[allow(clippy::too_many_arguments)]
fn finish_modern(
	rng: &mut (impl Rng + CryptoRng),
	clock: &impl Clock,
	buf: &mut [u8],
	lo: &layout::Layout,
	next_msg_id: MessageId,
	is_inbound_gateway: bool,
	is_outbound_endpoint: bool,
	options: &Options,
) -> Result<(), Error> {
	buf[lo.flag] = flag_byte(is_inbound_gateway, is_outbound_endpoint);

	let minutes = quantized_time(rng, clock, MODERN_BACKDATE_MS, MINUTE_MS);
	buf[lo.req_time..lo.req_time + 4].copy_from_slice(&minutes.to_be_bytes());
	let expiration = lo.expiration.expect("Modern layouts carry an expiration");
	buf[expiration..expiration + 4].copy_from_slice(&DEFAULT_EXPIRATION_SECONDS.to_be_bytes());
	buf[lo.next_msg_id..lo.next_msg_id + 4].copy_from_slice(&next_msg_id.to_be_bytes());

	let off = lo.options.expect("Modern layouts carry options");
	let written = options::encode_into(&mut buf[off..], options, lo.max_options)?;
	rng.fill_bytes(&mut buf[off + written..]);
	Ok(())
}

/// Read the clock, back off by a random amount below `window` so records
/// minted near a quantum boundary do not correlate across hops, then
/// truncate to the quantum.
fn quantized_time(
	rng: &mut (impl Rng + CryptoRng),
	clock: &impl Clock,
	window: u64,
	quantum: u64,
) -> u32 {
	let now = clock.now_millis().saturating_sub(rng.gen_range(0..window));
	(now / quantum) as u32
}
