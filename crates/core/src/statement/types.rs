//! Statement data types.

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// Key of the synthesized total in every group.
pub const TOTAL_KEY: &str = "TOTAL";

/// Name of the asset branch.
pub const ASSET_SIDE: &str = "ACTIF";

/// Name of the liability branch.
pub const LIABILITY_SIDE: &str = "PASSIF";

/// Number of fractional digits kept at every rollup level.
pub const TOTAL_SCALE: u32 = 3;

/// Rounds a rollup total to [`TOTAL_SCALE`] digits (banker's rounding).
#[must_use]
pub fn round_total(value: Decimal) -> Decimal {
    value.round_dp(TOTAL_SCALE)
}

/// Adds `value` to `sum`, leaving `sum` untouched when the result overflows.
fn accumulate(sum: &mut Decimal, name: &str, value: Decimal) -> bool {
    match sum.checked_add(value) {
        Some(next) => {
            *sum = next;
            true
        }
        None => {
            debug!(entry = name, "skipping amount that overflows the total");
            false
        }
    }
}

/// A named amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Display name.
    pub name: String,
    /// Amount taken from the ledger.
    pub value: Decimal,
}

impl LineItem {
    /// Creates a line item.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Decimal) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A child of a [`Group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Leaf amount.
    Item(LineItem),
    /// Nested group.
    Group(Group),
}

impl Entry {
    /// Returns the entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Item(item) => &item.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Returns the item value or the group total.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Item(item) => item.value,
            Self::Group(group) => group.total,
        }
    }
}

/// A named node of the statement with its rolled-up total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    /// Display name.
    pub name: String,
    /// Children in display order.
    pub entries: Vec<Entry>,
    /// Rounded total of the children.
    pub total: Decimal,
}

impl Group {
    /// Creates a group of leaf items; the total is their rounded sum.
    ///
    /// An item that would overflow the running sum is left out of the group.
    #[must_use]
    pub fn with_items(name: impl Into<String>, items: Vec<LineItem>) -> Self {
        let mut sum = Decimal::ZERO;
        let entries = items
            .into_iter()
            .filter(|item| accumulate(&mut sum, &item.name, item.value))
            .map(Entry::Item)
            .collect();
        Self {
            name: name.into(),
            entries,
            total: round_total(sum),
        }
    }

    /// Creates a group of leaf items with an explicitly computed total.
    #[must_use]
    pub fn with_total(name: impl Into<String>, items: Vec<LineItem>, total: Decimal) -> Self {
        Self {
            name: name.into(),
            entries: items.into_iter().map(Entry::Item).collect(),
            total,
        }
    }

    /// Creates a group of nested groups; the total is the rounded sum of
    /// their totals.
    ///
    /// A child whose total would overflow the sum is kept but not counted.
    #[must_use]
    pub fn rollup(name: impl Into<String>, groups: Vec<Group>) -> Self {
        let mut sum = Decimal::ZERO;
        for group in &groups {
            accumulate(&mut sum, &group.name, group.total);
        }
        let total = round_total(sum);
        Self {
            name: name.into(),
            entries: groups.into_iter().map(Entry::Group).collect(),
            total,
        }
    }

    /// Returns the child with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Returns the nested group with the given name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        match self.get(name)? {
            Entry::Group(group) => Some(group),
            Entry::Item(_) => None,
        }
    }

    /// Returns the value of the leaf item with the given name.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<Decimal> {
        match self.get(name)? {
            Entry::Item(item) => Some(item.value),
            Entry::Group(_) => None,
        }
    }

    /// Returns true when the group has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Balance sheet with an asset and a liability branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// `ACTIF` branch.
    pub asset: Group,
    /// `PASSIF` branch.
    pub liability: Group,
}

impl Statement {
    /// Resolves a path such as `["ACTIF", "Actif immobilisé", "TOTAL"]`.
    ///
    /// The last segment may be `TOTAL` to read a group total.
    #[must_use]
    pub fn value(&self, path: &[&str]) -> Option<Decimal> {
        let (side, rest) = path.split_first()?;
        let mut group = match *side {
            ASSET_SIDE => &self.asset,
            LIABILITY_SIDE => &self.liability,
            _ => return None,
        };

        let Some((last, parents)) = rest.split_last() else {
            return Some(group.total);
        };
        for name in parents {
            group = group.group(name)?;
        }

        if *last == TOTAL_KEY {
            Some(group.total)
        } else {
            group.get(last).map(Entry::amount)
        }
    }

    /// Returns both branches in display order.
    #[must_use]
    pub fn sides(&self) -> [&Group; 2] {
        [&self.asset, &self.liability]
    }
}

struct Amount(Decimal);

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&self.0, serializer)
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Item(item) => Amount(item.value).serialize(serializer),
            Self::Group(group) => group.serialize(serializer),
        }
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        for entry in &self.entries {
            map.serialize_entry(entry.name(), entry)?;
        }
        map.serialize_entry(TOTAL_KEY, &Amount(self.total))?;
        map.end()
    }
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(ASSET_SIDE, &self.asset)?;
        map.serialize_entry(LIABILITY_SIDE, &self.liability)?;
        map.end()
    }
}
