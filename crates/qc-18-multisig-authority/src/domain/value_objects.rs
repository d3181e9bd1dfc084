//! # Domain Value Objects
//!
//! Immutable value types for the Multi-Signer Authority.
//!
//! Identities, operation ids and execution domains are compared by value
//! and carry no ownership of their own.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account reference used for signer membership, approvals and balances.
///
/// Ethereum-style: the last 20 bytes of keccak256(uncompressed pubkey).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; 20]);

impl Identity {
    /// The null identity. Never a valid signer, recipient or bridge caller.
    pub const ZERO: Identity = Identity([0u8; 20]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check for the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Encode as an integer (address in the low 160 bits).
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Decode from an integer. Returns `None` if any of the high 96 bits are set.
    pub fn from_u256(value: U256) -> Option<Self> {
        if value.bits() > 160 {
            return None;
        }
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Some(Self(bytes))
    }

    /// Parse a `0x`-prefixed (or bare) 40 character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).ok()?;
        let bytes: [u8; 20] = decoded.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl From<[u8; 20]> for Identity {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity(0x{})", hex::encode(self.0))
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid identity"))
    }
}

/// Unique operation identifier (keccak256 of counter, content and domain).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId([u8; 32]);

impl OperationId {
    /// Create from raw hash bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short form for log lines.
    pub fn short(&self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}..", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId(0x{})", hex::encode(self.0))
    }
}

impl Serialize for OperationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OperationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        let decoded = hex::decode(raw).map_err(serde::de::Error::custom)?;
        let bytes: [u8; 32] = decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid operation id length"))?;
        Ok(Self(bytes))
    }
}

/// Execution-environment identifier bound into every signed message.
///
/// Prevents an approval signed for one deployment/network being replayed
/// on another. Encoded as a 32-byte big-endian word, like a chain id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionDomain(pub u64);

impl ExecutionDomain {
    /// 32-byte big-endian encoding.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&self.0.to_be_bytes());
        word
    }
}

impl fmt::Display for ExecutionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain:{}", self.0)
    }
}

/// The closed set of operations gated by threshold approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    /// Credit the fixed mint amount to the holding account.
    Mint,
    /// Destroy `value` from the holding account.
    Burn,
    /// Irreversibly leave pre-launch mode.
    SwitchToPostLaunch,
    /// Close the ledger's transfer gate.
    Pause,
    /// Reopen the ledger's transfer gate.
    Unpause,
    /// Assign the identity allowed to call bridge-in.
    SetBridgeCaller,
    /// Set bridge-in max amount (`value`) and cooldown (`extra`).
    SetBridgeLimits,
    /// Replace signer `target` with the identity encoded in `value`.
    UpdateSigner,
    /// Transfer `value` from the holding account to `target`.
    Distribute,
}

impl OperationKind {
    /// Every kind, in tag order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Mint,
        OperationKind::Burn,
        OperationKind::SwitchToPostLaunch,
        OperationKind::Pause,
        OperationKind::Unpause,
        OperationKind::SetBridgeCaller,
        OperationKind::SetBridgeLimits,
        OperationKind::UpdateSigner,
        OperationKind::Distribute,
    ];

    /// Stable one-byte tag used in id derivation and bound messages.
    pub fn tag(&self) -> u8 {
        match self {
            OperationKind::Mint => 0,
            OperationKind::Burn => 1,
            OperationKind::SwitchToPostLaunch => 2,
            OperationKind::Pause => 3,
            OperationKind::Unpause => 4,
            OperationKind::SetBridgeCaller => 5,
            OperationKind::SetBridgeLimits => 6,
            OperationKind::UpdateSigner => 7,
            OperationKind::Distribute => 8,
        }
    }

    /// Human-readable name (also used by signing tools).
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Mint => "MINT",
            OperationKind::Burn => "BURN",
            OperationKind::SwitchToPostLaunch => "SWITCH_TO_POST_LAUNCH",
            OperationKind::Pause => "PAUSE",
            OperationKind::Unpause => "UNPAUSE",
            OperationKind::SetBridgeCaller => "SET_BRIDGE_CALLER",
            OperationKind::SetBridgeLimits => "SET_BRIDGE_LIMITS",
            OperationKind::UpdateSigner => "UPDATE_SIGNER",
            OperationKind::Distribute => "DISTRIBUTE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One-way launch mode flag.
///
/// Mint/burn are allowed only pre-launch; bridging only post-launch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMode {
    /// Supply is being issued; bridging is closed.
    #[default]
    PreLaunch,
    /// Supply is fixed; bridging is open.
    PostLaunch,
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::PreLaunch => f.write_str("pre-launch"),
            LaunchMode::PostLaunch => f.write_str("post-launch"),
        }
    }
}

/// Recoverable secp256k1 signature over a bound approval message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl ApprovalSignature {
    /// Parse the 65-byte `r || s || v` wire form.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self { r, s, v: bytes[64] }
    }

    /// Encode as 65-byte `r || s || v`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}
