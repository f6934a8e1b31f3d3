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

//! Record building and accessor tests.

#![cfg(test)]

use super::{options::Options, response, BuildRequestRecord, RecordFormat};
use crate::{error::Error, Clock, IdentityHash};

/// Clock pinned to a fixed instant.
struct FixedClock(u64);

impl Clock for FixedClock {
	fn now_millis(&self) -> u64 {
		self.0
	}
}

fn opts(pairs: &[(&str, &str)]) -> Options {
	pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

const NOW_MS: u64 = 1_700_000_123_456;

fn legacy_record(is_inbound_gateway: bool, is_outbound_endpoint: bool) -> Result<BuildRequestRecord, Error> {
	let mut rng = rand::thread_rng();
	BuildRequestRecord::new_legacy(
		&mut rng,
		&FixedClock(NOW_MS),
		1,
		&[0xAB; 32],
		2,
		&IdentityHash::default(),
		3,
		&[0x11; 32],
		&[0x22; 32],
		&[0x33; 32],
		&[0x44; 16],
		is_inbound_gateway,
		is_outbound_endpoint,
	)
}

#[test]
fn legacy_build_and_read() {
	let record = legacy_record(true, false).unwrap();

	assert_eq!(record.format(), RecordFormat::Legacy);
	assert_eq!(record.as_bytes().len(), 222);
	assert_eq!(record.as_bytes()[184], 0x80);

	assert_eq!(record.read_receive_tunnel_id(), 1);
	assert_eq!(record.read_next_tunnel_id(), 2);
	assert_eq!(record.read_next_identity(), IdentityHash::default());
	assert_eq!(record.read_next_msg_id(), 3);
	assert_eq!(record.read_layer_key().unwrap(), [0x11; 32]);
	assert_eq!(record.read_iv_key().unwrap(), [0x22; 32]);
	assert_eq!(record.read_reply_key().unwrap(), [0x33; 32]);
	assert_eq!(record.read_reply_iv().unwrap(), [0x44; 16]);
	assert!(record.read_is_inbound_gateway());
	assert!(!record.read_is_outbound_endpoint());
	assert_eq!(record.read_expiration_millis(), 600_000);
	assert_eq!(record.read_layer_enc_type(), 0);
	assert_eq!(record.read_options(), Options::new());

	// Hours since the epoch; the fixed instant is far enough into the hour
	// that the 90s back-off cannot change the quantum.
	let hours = u32::from_be_bytes(record.as_bytes()[185..189].try_into().unwrap());
	assert_eq!(u64::from(hours), NOW_MS / 3_600_000);
	let minted = record.read_request_time_millis();
	assert!(minted <= NOW_MS && NOW_MS - minted <= 3_600_000);
}

#[test]
fn role_flags_are_exclusive() {
	assert_eq!(legacy_record(true, true).unwrap_err(), Error::InvalidArgument);

	let record = legacy_record(false, true).unwrap();
	assert!(!record.read_is_inbound_gateway());
	assert!(record.read_is_outbound_endpoint());
	assert_eq!(record.as_bytes()[184], 0x40);

	let record = legacy_record(false, false).unwrap();
	assert!(!record.read_is_inbound_gateway());
	assert!(!record.read_is_outbound_endpoint());
}

#[test]
fn long_build_and_read() {
	let mut rng = rand::thread_rng();
	let options = opts(&[("foo", "bar")]);
	let record = BuildRequestRecord::new_long(
		&mut rng,
		&FixedClock(NOW_MS),
		10,
		20,
		&[0x05; 32],
		30,
		&[0x11; 32],
		&[0x22; 32],
		&[0x33; 32],
		&[0x44; 16],
		false,
		false,
		&options,
	)
	.unwrap();

	assert_eq!(record.format(), RecordFormat::ModernLong);
	assert_eq!(record.as_bytes().len(), 464);
	// Unused flag bytes stay zero for compatibility.
	assert_eq!(&record.as_bytes()[153..156], &[0, 0, 0]);

	assert_eq!(record.read_receive_tunnel_id(), 10);
	assert_eq!(record.read_next_tunnel_id(), 20);
	assert_eq!(record.read_next_identity(), [0x05; 32]);
	assert_eq!(record.read_next_msg_id(), 30);
	assert_eq!(record.read_layer_key().unwrap(), [0x11; 32]);
	assert_eq!(record.read_reply_key().unwrap(), [0x33; 32]);
	assert_eq!(record.read_options(), options);
	assert_eq!(record.read_expiration_millis(), 600_000);

	let minted = record.read_request_time_millis();
	assert!(minted <= NOW_MS && NOW_MS - minted <= 60_000);
}

#[test]
fn short_build_and_read() {
	let mut rng = rand::thread_rng();
	let record = BuildRequestRecord::new_short(
		&mut rng,
		&FixedClock(NOW_MS),
		7,
		8,
		&[0x09; 32],
		11,
		true,
		false,
		&Options::new(),
	)
	.unwrap();

	assert_eq!(record.format(), RecordFormat::ModernShort);
	assert_eq!(record.as_bytes().len(), 154);
	assert_eq!(record.read_receive_tunnel_id(), 7);
	assert_eq!(record.read_next_tunnel_id(), 8);
	assert_eq!(record.read_layer_enc_type(), 0);

	// No in-band keys, and nothing derived before encryption.
	assert_eq!(record.read_reply_key().unwrap_err(), Error::IllegalState);
	assert_eq!(record.read_reply_iv().unwrap_err(), Error::IllegalState);
	assert_eq!(record.read_layer_key().unwrap_err(), Error::IllegalState);
	assert_eq!(record.read_iv_key().unwrap_err(), Error::IllegalState);
	assert!(record.garlic_keys().is_none());
}

#[test]
fn backdating_crosses_quantum_boundaries() {
	let mut rng = rand::thread_rng();
	// 1s into a minute; the 2048ms window reaches back across the boundary.
	let now = 3_000_000 * 60_000 + 1_000;
	let mut seen = std::collections::HashSet::new();
	for _ in 0..200 {
		let record = BuildRequestRecord::new_short(
			&mut rng,
			&FixedClock(now),
			1,
			2,
			&[0; 32],
			3,
			false,
			false,
			&Options::new(),
		)
		.unwrap();
		seen.insert(record.read_request_time_millis());
	}
	assert_eq!(seen.len(), 2);
}

#[test]
fn cleartext_length_selects_format() {
	assert_eq!(
		BuildRequestRecord::from_cleartext(vec![0; 222]).unwrap().format(),
		RecordFormat::Legacy
	);
	assert_eq!(
		BuildRequestRecord::from_cleartext(vec![0; 464]).unwrap().format(),
		RecordFormat::ModernLong
	);
	assert_eq!(
		BuildRequestRecord::from_cleartext(vec![0; 154]).unwrap().format(),
		RecordFormat::ModernShort
	);
	assert_eq!(
		BuildRequestRecord::from_cleartext(vec![0; 223]).unwrap_err(),
		Error::MalformedCleartext
	);
}

#[test]
fn options_budget_enforced() {
	let mut rng = rand::thread_rng();
	// 2-byte prefix + klen + k + '=' + vlen + v + ';' = 98 bytes exactly.
	let fits = opts(&[("opts", &"v".repeat(88))]);
	let record = BuildRequestRecord::new_short(
		&mut rng,
		&FixedClock(NOW_MS),
		1,
		2,
		&[0; 32],
		3,
		false,
		false,
		&fits,
	)
	.unwrap();
	assert_eq!(record.read_options(), fits);

	let overflows = opts(&[("opts", &"v".repeat(89))]);
	let result = BuildRequestRecord::new_short(
		&mut rng,
		&FixedClock(NOW_MS),
		1,
		2,
		&[0; 32],
		3,
		false,
		false,
		&overflows,
	);
	assert_eq!(result.unwrap_err(), Error::OversizedOptions);
}

#[test]
fn display_redacts_keys() {
	let record = legacy_record(true, false).unwrap();
	let printed = format!("{}", record);
	assert!(printed.contains("IBGW"));
	assert!(printed.contains("in: 1"));
	// The layer key must not leak into the summary.
	assert!(!printed.contains("11111111"));
}

#[test]
fn legacy_response_round_trip() {
	let mut rng = rand::thread_rng();
	let encoded = response::create_legacy_response(&mut rng, response::STATUS_ACCEPT);
	assert_eq!(encoded.len(), 528);
	let decoded = response::read_legacy_response(&encoded).unwrap();
	assert_eq!(decoded.status, response::STATUS_ACCEPT);
	// Legacy responses never carry options.
	assert_eq!(decoded.options, Options::new());

	let mut tampered = encoded;
	tampered[100] ^= 1;
	assert_eq!(response::read_legacy_response(&tampered).unwrap_err(), Error::DecryptFailed);
}
