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

/// Error handling
use std::fmt;

/// Record codec error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
	/// The recipient or local key is not of a type usable with the record format.
	UnsupportedKeyType,
	/// Decryption failed. All modern-path rejection reasons and the legacy
	/// ElGamal failure collapse into this one kind; callers must not be able
	/// to tell them apart.
	DecryptFailed,
	/// Serialized options do not fit the format's budget.
	OversizedOptions,
	/// An accessor was called on a format that does not carry that field, or
	/// before the keys it reports were derived.
	IllegalState,
	/// Cleartext length matches none of the record formats.
	MalformedCleartext,
	/// Invalid builder argument, e.g. both role flags set.
	InvalidArgument,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::UnsupportedKeyType => write!(f, "Key type not usable with this record format."),
			Error::DecryptFailed => write!(f, "Record decryption failed."),
			Error::OversizedOptions => write!(f, "Serialized options exceed the format budget."),
			Error::IllegalState => write!(f, "Field not carried by this record format."),
			Error::MalformedCleartext => write!(f, "Cleartext length matches no record format."),
			Error::InvalidArgument => write!(f, "Invalid build record argument."),
		}
	}
}

impl std::error::Error for Error {}
