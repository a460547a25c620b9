//! Minimal Solidity ABI codec for the strategy factory and strategy contracts.
//!
//! Covers exactly the shapes those contracts use: addresses, uint256, bool,
//! strings, dynamic arrays and tuples. Encoding is generic over `Token`;
//! decoding is per return shape.

use alloy_primitives::{keccak256, Address, U256};

use super::error::{LedgerError, Result};
use super::types::{RawDestination, RawStrategyInfo};

const WORD: usize = 32;

/// A single ABI value to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
    Bool(bool),
    String(String),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        match self {
            Token::String(_) | Token::Array(_) => true,
            Token::Tuple(items) => items.iter().any(Token::is_dynamic),
            Token::Address(_) | Token::Uint(_) | Token::Bool(_) => false,
        }
    }

    /// Head size of a static token.
    fn static_size(&self) -> usize {
        match self {
            Token::Tuple(items) => items.iter().map(Token::static_size).sum(),
            _ => WORD,
        }
    }
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode(args));
    out
}

/// Head/tail encoding of a token sequence.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens
        .iter()
        .map(|t| if t.is_dynamic() { WORD } else { t.static_size() })
        .sum();

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        if token.is_dynamic() {
            head.extend(usize_word(head_len + tail.len()));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }
    head.extend(tail);
    head
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(address) => {
            let mut word = vec![0u8; 12];
            word.extend_from_slice(address.as_slice());
            word
        }
        Token::Uint(value) => value.to_be_bytes::<32>().to_vec(),
        Token::Bool(flag) => U256::from(u8::from(*flag)).to_be_bytes::<32>().to_vec(),
        Token::String(text) => {
            let bytes = text.as_bytes();
            let mut out = usize_word(bytes.len()).to_vec();
            out.extend_from_slice(bytes);
            out.resize(WORD + padded_len(bytes.len()), 0);
            out
        }
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode(items));
            out
        }
        Token::Tuple(items) => encode(items),
    }
}

fn usize_word(value: usize) -> [u8; 32] {
    U256::from(value).to_be_bytes::<32>()
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Bounds-checked reader over ABI return data.
struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn word(&self, pos: usize) -> Result<&'a [u8]> {
        pos.checked_add(WORD)
            .and_then(|end| self.data.get(pos..end))
            .ok_or_else(|| decode_error(format!("word at {pos} past end ({} bytes)", self.data.len())))
    }

    fn uint(&self, pos: usize) -> Result<U256> {
        Ok(U256::from_be_slice(self.word(pos)?))
    }

    fn bool(&self, pos: usize) -> Result<bool> {
        let value = self.uint(pos)?;
        match value {
            v if v == U256::ZERO => Ok(false),
            v if v == U256::from(1u8) => Ok(true),
            v => Err(decode_error(format!("invalid bool word {v}"))),
        }
    }

    fn address(&self, pos: usize) -> Result<Address> {
        let word = self.word(pos)?;
        if word[..12].iter().any(|&b| b != 0) {
            return Err(decode_error(format!("dirty address word at {pos}")));
        }
        Ok(Address::from_slice(&word[12..]))
    }

    /// A word used as an offset or length; must point inside the data.
    fn index(&self, pos: usize) -> Result<usize> {
        let value = self.uint(pos)?;
        if value > U256::from(self.data.len()) {
            return Err(decode_error(format!("offset/length {value} exceeds data")));
        }
        Ok(value.as_limbs()[0] as usize)
    }

    fn string(&self, pos: usize) -> Result<String> {
        let len = self.index(pos)?;
        let start = pos + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| decode_error(format!("string at {pos} past end")))?;
        String::from_utf8(bytes.to_vec()).map_err(|e| decode_error(format!("string at {pos}: {e}")))
    }

    /// Start of a dynamic array's elements and its length.
    fn array(&self, base: usize, head_pos: usize) -> Result<(usize, usize)> {
        let start = base + self.index(head_pos)?;
        let len = self.index(start)?;
        Ok((start + WORD, len))
    }
}

fn decode_error(message: String) -> LedgerError {
    LedgerError::Decode(message)
}

/// Decode a single `uint256` return.
pub fn decode_uint(data: &[u8]) -> Result<U256> {
    Decoder::new(data).uint(0)
}

/// Decode a single `bool` return.
pub fn decode_bool(data: &[u8]) -> Result<bool> {
    Decoder::new(data).bool(0)
}

/// Decode an `address[]` return.
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>> {
    let decoder = Decoder::new(data);
    let (elements, len) = decoder.array(0, 0)?;
    (0..len)
        .map(|i| decoder.address(elements + i * WORD))
        .collect()
}

/// Decode the `getInfo()` tuple
/// `(string,string,address,uint256,uint256,uint256)`.
pub fn decode_strategy_info(data: &[u8]) -> Result<RawStrategyInfo> {
    let d = Decoder::new(data);
    Ok(RawStrategyInfo {
        name: d.string(d.index(0)?)?,
        metadata_uri: d.string(d.index(WORD)?)?,
        curator: d.address(2 * WORD)?,
        curator_fee_bps: d.uint(3 * WORD)?,
        total_allocated: d.uint(4 * WORD)?,
        total_donors: d.uint(5 * WORD)?,
    })
}

/// Decode the `getDestinations()` return `(address,uint256,string)[]`.
pub fn decode_destinations(data: &[u8]) -> Result<Vec<RawDestination>> {
    let d = Decoder::new(data);
    let (elements, len) = d.array(0, 0)?;

    (0..len)
        .map(|i| {
            let tuple = elements + d.index(elements + i * WORD)?;
            Ok(RawDestination {
                recipient: d.address(tuple)?,
                weight_bps: d.uint(tuple + WORD)?,
                label: d.string(tuple + d.index(tuple + 2 * WORD)?)?,
            })
        })
        .collect()
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse `0x`-prefixed hex. An empty payload (`0x`) decodes to no bytes.
pub fn from_hex(raw: &str) -> Result<Vec<u8>> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| decode_error(format!("missing 0x prefix: {raw}")))?;
    hex::decode(digits).map_err(|e| decode_error(format!("invalid hex: {e}")))
}
