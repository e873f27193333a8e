// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ed25519 verification of inbound Discord interactions.

use ring::signature::{UnparsedPublicKey, ED25519};

/// Verifies `X-Signature-Ed25519` over `timestamp || body`.
#[derive(Clone)]
pub struct InteractionVerifier {
    public_key: Vec<u8>,
}

impl InteractionVerifier {
    /// Build from the hex-encoded application public key.
    pub fn from_hex(public_key_hex: &str) -> Result<Self, hex::FromHexError> {
        let public_key = hex::decode(public_key_hex.trim())?;
        if public_key.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Self { public_key })
    }

    /// Fails closed: anything other than a valid signature is `false`.
    pub fn verify(&self, body: &[u8], signature_hex: &str, timestamp: &str) -> bool {
        if timestamp.is_empty() {
            return false;
        }
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .is_ok()
    }
}
