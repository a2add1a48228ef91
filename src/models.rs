//! Typed snapshots produced during a single walk
//!
//! Launch → Town → FlatType come from the summary page, BlockLink from a
//! flat-type page, BlockDetails and UnitFields from a rendered block. Each
//! level's context is copied into the terminal `UnitRecord`; nothing here is
//! mutated after construction.

use crate::grammar::{patterns, GrammarError};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One sales launch on the summary page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSummary {
    pub launch_date: String,
    pub towns: Vec<TownSummary>,
}

/// A town within a launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TownSummary {
    pub town: String,
    pub flat_types: Vec<FlatTypeSummary>,
}

/// A flat-type row within a town
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatTypeSummary {
    /// Row label as shown, e.g. "3-Room"
    pub flat_type_label: String,
    /// Absolute URL of the flat-type page
    pub link: String,
    pub units_available: u32,
    pub quota_malay: String,
    pub quota_chinese: String,
    pub quota_indian_others: String,
    #[serde(skip)]
    context: FlatTypeContext,
}

impl FlatTypeSummary {
    /// Creates a flat-type summary, rejecting links the walker could not resolve later
    ///
    /// The link must carry extractable `Town=` and `Flat=` parameters.
    pub fn new(
        flat_type_label: String,
        link: String,
        units_available: u32,
        quota_malay: String,
        quota_chinese: String,
        quota_indian_others: String,
    ) -> Result<Self, GrammarError> {
        let context = patterns::link_context(&link)?;
        Ok(Self {
            flat_type_label,
            link,
            units_available,
            quota_malay,
            quota_chinese,
            quota_indian_others,
            context,
        })
    }

    /// Town and flat type encoded in the link
    pub fn context(&self) -> &FlatTypeContext {
        &self.context
    }
}

/// Town and flat type carried down from a flat-type link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatTypeContext {
    pub town: String,
    /// Room count, e.g. "3" for a `Flat=3-Room` link
    pub flat_type: String,
}

/// Script token that activates one block's view on a flat-type page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BlockLink(String);

impl BlockLink {
    pub fn new(script: impl Into<String>) -> Self {
        Self(script.into())
    }

    pub fn script(&self) -> &str {
        &self.0
    }
}

/// Label → value pairs read from a block's detail panel, in page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDetails {
    block_id: String,
    fields: Vec<(String, String)>,
}

impl BlockDetails {
    /// Label the block identifier is published under
    pub const BLOCK_LABEL: &'static str = "Block";

    /// Builds block details from label/value pairs
    ///
    /// Fails when no `Block` label is present or when a label repeats with a
    /// different value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, GrammarError> {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(pairs.len());
        for (label, value) in pairs {
            match fields.iter().find(|(existing, _)| same_label(existing, &label)) {
                Some((_, previous)) if previous != &value => {
                    return Err(GrammarError::Mismatch(format!(
                        "block detail label '{}' appears with values '{}' and '{}'",
                        label, previous, value
                    )));
                }
                Some(_) => continue,
                None => fields.push((label, value)),
            }
        }

        let block_id = fields
            .iter()
            .find(|(label, _)| same_label(label, Self::BLOCK_LABEL))
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                GrammarError::Mismatch("block details have no 'Block' entry".to_string())
            })?;

        Ok(Self { block_id, fields })
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    pub fn street(&self) -> Option<&str> {
        self.get("Street")
    }

    /// Looks up a value by label, ignoring case and a trailing colon
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| same_label(existing, label))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Compares two detail labels the way the portal varies them
pub(crate) fn same_label(a: &str, b: &str) -> bool {
    fn bare(label: &str) -> &str {
        label.trim().trim_end_matches(':').trim_end()
    }
    bare(a).eq_ignore_ascii_case(bare(b))
}

/// Fields read from one unit element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFields {
    /// Unit identifier, e.g. "#05-123"
    pub unit: String,
    pub price: String,
    pub size: String,
}

/// Terminal, flattened record: one per unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub town: String,
    pub flat_type: String,
    pub block_id: String,
    pub unit: String,
    pub price: String,
    pub size: String,
    pub details: BlockDetails,
}

impl UnitRecord {
    pub const TOWN: &'static str = "Town";
    pub const FLAT_TYPE: &'static str = "Flat Type";
    pub const PRICE: &'static str = "Price";
    pub const SIZE: &'static str = "Size";
    pub const UNIT: &'static str = "Unit";

    /// Field names owned by the flat-type and unit levels
    pub const RESERVED: [&'static str; 5] =
        [Self::TOWN, Self::FLAT_TYPE, Self::PRICE, Self::SIZE, Self::UNIT];

    /// All fields in output order
    ///
    /// Town and flat type first, then the block panel in page order (which
    /// includes `Block`), then price, size and unit.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::with_capacity(self.details.len() + 5);
        fields.push((Self::TOWN, self.town.as_str()));
        fields.push((Self::FLAT_TYPE, self.flat_type.as_str()));
        fields.extend(self.details.iter());
        fields.push((Self::PRICE, self.price.as_str()));
        fields.push((Self::SIZE, self.size.as_str()));
        fields.push((Self::UNIT, self.unit.as_str()));
        fields
    }
}

impl Serialize for UnitRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (name, value) in fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
