//! Classification of RLP-encoded Merkle-Patricia-Trie proof nodes.
//!
//! Only the node shape is decoded: branch nodes are recognized by arity, and
//! two-element nodes have their compact (hex-prefix) path decoded to tell a
//! leaf from an extension. Nothing is hashed or verified.

use alloy_primitives::{hex, Bytes};
use alloy_rlp::Header;
use std::fmt;

const BRANCH_ARITY: usize = 17;
const SHORT_NODE_ARITY: usize = 2;

/// Flag nibble bit set on odd-length paths.
const ODD_FLAG: u8 = 0x1;
/// Flag nibble bit set on leaf paths.
const LEAF_FLAG: u8 = 0x2;

/// Shape of a single proof node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Branch,
    Extension { path: Vec<u8> },
    Leaf { path: Vec<u8>, value: Bytes },
    Unknown,
}

impl NodeKind {
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    pub const fn is_extension(&self) -> bool {
        matches!(self, Self::Extension { .. })
    }

    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch => f.write_str("branch"),
            Self::Extension { path } => write!(f, "extension [path={}]", nibbles_to_hex(path)),
            Self::Leaf { path, value } => write!(
                f,
                "leaf [path={}] [value={}]",
                nibbles_to_hex(path),
                hex::encode(value)
            ),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Classify a raw RLP-encoded node.
pub fn classify_node(raw: &[u8]) -> NodeKind {
    let Some(items) = decode_list(raw) else {
        return NodeKind::Unknown;
    };

    match items.len() {
        BRANCH_ARITY => NodeKind::Branch,
        SHORT_NODE_ARITY => {
            let (path_item, value_item) = (&items[0], &items[1]);
            if path_item.list {
                return NodeKind::Unknown;
            }
            match decode_compact(path_item.payload) {
                Some((path, true)) => NodeKind::Leaf {
                    path,
                    value: Bytes::copy_from_slice(value_item.payload),
                },
                Some((path, false)) => NodeKind::Extension { path },
                None => NodeKind::Unknown,
            }
        }
        _ => NodeKind::Unknown,
    }
}

/// Classify a hex-encoded node, with or without the `0x` prefix.
pub fn classify_hex(encoded: &str) -> NodeKind {
    hex::decode(encoded).map_or(NodeKind::Unknown, |raw| classify_node(&raw))
}

/// Decode a compact (hex-prefix) encoded path.
///
/// Returns the path nibbles and whether the flag marks a leaf. The flag nibble
/// is dropped, and so is the padding nibble that follows it on even-length
/// paths. `None` for an empty input, a flag nibble above 3, or a non-zero
/// padding nibble.
pub fn decode_compact(encoded: &[u8]) -> Option<(Vec<u8>, bool)> {
    let (&first, rest) = encoded.split_first()?;
    let flag = first >> 4;
    if flag > (ODD_FLAG | LEAF_FLAG) {
        return None;
    }
    if flag & ODD_FLAG == 0 && first & 0x0f != 0 {
        return None;
    }

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if flag & ODD_FLAG != 0 {
        nibbles.push(first & 0x0f);
    }
    for byte in rest {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0f);
    }

    Some((nibbles, flag & LEAF_FLAG != 0))
}

/// Render nibbles as a lowercase hex string, one character per nibble.
pub fn nibbles_to_hex(nibbles: &[u8]) -> String {
    nibbles
        .iter()
        .map(|n| char::from_digit(u32::from(*n), 16).unwrap_or('?'))
        .collect()
}

/// One top-level item of an RLP list.
struct Item<'a> {
    list: bool,
    payload: &'a [u8],
}

/// Split an RLP list into its items. `None` unless `raw` is exactly one
/// well-formed list.
fn decode_list(raw: &[u8]) -> Option<Vec<Item<'_>>> {
    let mut buf = raw;
    let header = Header::decode(&mut buf).ok()?;
    if !header.list || buf.len() != header.payload_length {
        return None;
    }

    let mut items = Vec::new();
    while !buf.is_empty() {
        let item = Header::decode(&mut buf).ok()?;
        if item.payload_length > buf.len() {
            return None;
        }
        let (payload, rest) = buf.split_at(item.payload_length);
        items.push(Item {
            list: item.list,
            payload,
        });
        buf = rest;
    }
    Some(items)
}
