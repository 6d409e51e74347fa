use serde::{Deserialize, Serialize};

use crate::request::RequestId;

/// The `<Alphabet>` element: an ordered sequence of single-symbol
/// `<symbols>` children, matching spec §6's XML wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireAlphabet {
    #[serde(rename = "symbols")]
    pub symbols: Vec<String>,
}

impl WireAlphabet {
    /// Builds a wire alphabet from a [`crackhash_core_codec::Alphabet`].
    pub fn from_codec(alphabet: &crackhash_core_codec::Alphabet) -> Self {
        let symbols = (0..alphabet.size())
            .filter_map(|i| alphabet.symbol(i))
            .map(|c| c.to_string())
            .collect();
        Self { symbols }
    }

    /// Converts back into a [`crackhash_core_codec::Alphabet`].
    pub fn to_codec(&self) -> crackhash_core_codec::Alphabet {
        self.symbols
            .iter()
            .filter_map(|s| s.chars().next())
            .collect()
    }
}

/// One shard of work, published to the task exchange as
/// `CrackHashManagerRequest`. Immutable once published (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "CrackHashManagerRequest")]
pub struct Shard {
    #[serde(rename = "RequestId")]
    pub request_id: RequestId,
    #[serde(rename = "PartNumber")]
    pub part_number: u64,
    #[serde(rename = "PartCount")]
    pub part_count: u64,
    #[serde(rename = "Hash")]
    pub hash: String,
    #[serde(rename = "MaxLength")]
    pub max_length: u32,
    #[serde(rename = "Alphabet")]
    pub alphabet: WireAlphabet,
}
