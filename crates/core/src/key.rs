//! Primary-key schema value types.
//!
//! `KeySpec` names the attributes a model keys on; `ItemKey` carries the
//! key values for one concrete item. Both come in the same two shapes:
//! a single key attribute, or the conventional partition + sort pair.

/// Conventional partition key attribute name in single-table designs.
pub const PARTITION_ATTRIBUTE: &str = "PK";

/// Conventional sort key attribute name in single-table designs.
pub const SORT_ATTRIBUTE: &str = "SK";

/// The key attribute names declared by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    /// A single key attribute.
    Simple { partition: &'static str },
    /// A partition + sort attribute pair.
    Composite {
        partition: &'static str,
        sort: &'static str,
    },
}

impl KeySpec {
    /// Simple key on the conventional `PK` attribute.
    pub fn simple() -> Self {
        Self::Simple {
            partition: PARTITION_ATTRIBUTE,
        }
    }

    /// Composite key on the conventional `PK`/`SK` attribute pair.
    pub fn composite() -> Self {
        Self::Composite {
            partition: PARTITION_ATTRIBUTE,
            sort: SORT_ATTRIBUTE,
        }
    }

    /// Name of the partition key attribute.
    pub fn partition_attribute(&self) -> &'static str {
        match self {
            Self::Simple { partition } | Self::Composite { partition, .. } => partition,
        }
    }

    /// Name of the sort key attribute, if the schema has one.
    pub fn sort_attribute(&self) -> Option<&'static str> {
        match self {
            Self::Simple { .. } => None,
            Self::Composite { sort, .. } => Some(sort),
        }
    }

    /// Whether a key value has the shape this schema expects.
    pub fn matches(&self, key: &ItemKey) -> bool {
        matches!(
            (self, key),
            (Self::Simple { .. }, ItemKey::Simple { .. })
                | (Self::Composite { .. }, ItemKey::Composite { .. })
        )
    }
}

/// The key values addressing one stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    /// Value for a single key attribute.
    Simple { partition: String },
    /// Values for a partition + sort attribute pair.
    Composite { partition: String, sort: String },
}

impl ItemKey {
    /// Key value for a simple-keyed item.
    pub fn simple(partition: impl Into<String>) -> Self {
        Self::Simple {
            partition: partition.into(),
        }
    }

    /// Key values for a composite-keyed item.
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self::Composite {
            partition: partition.into(),
            sort: sort.into(),
        }
    }

    /// The partition key value.
    pub fn partition(&self) -> &str {
        match self {
            Self::Simple { partition } | Self::Composite { partition, .. } => partition,
        }
    }

    /// The sort key value, if present.
    pub fn sort(&self) -> Option<&str> {
        match self {
            Self::Simple { .. } => None,
            Self::Composite { sort, .. } => Some(sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attribute_names() {
        assert_eq!(KeySpec::simple().partition_attribute(), "PK");
        assert_eq!(KeySpec::simple().sort_attribute(), None);
        assert_eq!(KeySpec::composite().partition_attribute(), "PK");
        assert_eq!(KeySpec::composite().sort_attribute(), Some("SK"));
    }

    #[test]
    fn test_custom_attribute_names() {
        let spec = KeySpec::Composite {
            partition: "tenant",
            sort: "id",
        };
        assert_eq!(spec.partition_attribute(), "tenant");
        assert_eq!(spec.sort_attribute(), Some("id"));
    }

    #[test]
    fn test_matches() {
        let simple = ItemKey::simple("USER#1");
        let composite = ItemKey::composite("USER#1", "PROFILE");

        assert!(KeySpec::simple().matches(&simple));
        assert!(KeySpec::composite().matches(&composite));
        assert!(!KeySpec::simple().matches(&composite));
        assert!(!KeySpec::composite().matches(&simple));
    }

    #[test]
    fn test_item_key_accessors() {
        let key = ItemKey::composite("USER#1", "NOTE#2");
        assert_eq!(key.partition(), "USER#1");
        assert_eq!(key.sort(), Some("NOTE#2"));

        let key = ItemKey::simple("USER#1");
        assert_eq!(key.partition(), "USER#1");
        assert_eq!(key.sort(), None);
    }
}
