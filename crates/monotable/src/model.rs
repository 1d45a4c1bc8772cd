//! Model mapping traits.
//!
//! A model declares its entity tag and key values; the provided methods
//! turn it into a write-ready item and back. Mapping has no side effects
//! beyond construction — no network calls hide in here.

use chrono::{DateTime, Duration, Utc};
use monotable_core::{ItemKey, KeySpec, Ksuid};

use crate::attrs::{self, Item};
use crate::error::{EmptyValueError, MappingError};

/// Attribute carrying the single-table entity tag.
pub const ENTITY_TYPE_ATTRIBUTE: &str = "entityType";

/// Attribute carrying the TTL deletion timestamp, see [`Expires`].
pub const SCHEDULED_FOR_DELETION_ATTRIBUTE: &str = "scheduledForDeletionAt";

/// A type stored 1:1 as one DynamoDB item.
pub trait Model: Sized {
    /// Entity tag stored in the `entityType` attribute. With single-table
    /// design every model carries one.
    const ENTITY_TYPE: &'static str;

    /// The key attribute names this model is stored under. Defaults to
    /// the conventional composite `PK`/`SK` pair.
    fn key_spec() -> KeySpec {
        KeySpec::composite()
    }

    /// The key values for this instance. Must match the shape of
    /// [`Model::key_spec`].
    fn key(&self) -> ItemKey;

    /// Data attributes, excluding key attributes and the entity tag.
    fn attributes(&self) -> Item;

    /// Inverse of [`Model::attributes`].
    fn from_attributes(item: &Item) -> Result<Self, MappingError>;

    /// Key attributes for this instance, named per the key spec.
    fn key_attributes(&self) -> Result<Item, MappingError> {
        key_attributes(Self::key_spec(), &self.key(), Self::ENTITY_TYPE)
    }

    /// Write-ready item: key attributes, entity tag, and data attributes.
    fn to_item(&self) -> Result<Item, MappingError> {
        let mut item = self.key_attributes()?;
        item.insert(
            ENTITY_TYPE_ATTRIBUTE.to_string(),
            attrs::s(Self::ENTITY_TYPE),
        );
        item.extend(self.attributes());
        Ok(item)
    }

    /// Same as [`Model::to_item`] with null attributes removed.
    fn to_non_null_item(&self) -> Result<Item, MappingError> {
        Ok(attrs::strip_nulls(self.to_item()?))
    }

    /// Reconstructs a model from a stored item. Fails if the item lacks
    /// the key attributes the model declares.
    fn from_item(item: &Item) -> Result<Self, MappingError> {
        let spec = Self::key_spec();
        if !item.contains_key(spec.partition_attribute()) {
            return Err(MappingError::MissingKey(spec.partition_attribute()));
        }
        if let Some(sort) = spec.sort_attribute() {
            if !item.contains_key(sort) {
                return Err(MappingError::MissingKey(sort));
            }
        }
        Self::from_attributes(item)
    }
}

pub(crate) fn key_attributes(
    spec: KeySpec,
    key: &ItemKey,
    entity_type: &'static str,
) -> Result<Item, MappingError> {
    if !spec.matches(key) {
        return Err(MappingError::KeyMismatch { entity_type });
    }

    let mut item = Item::new();
    item.insert(
        spec.partition_attribute().to_string(),
        attrs::s(key.partition()),
    );
    if let (Some(attribute), Some(value)) = (spec.sort_attribute(), key.sort()) {
        item.insert(attribute.to_string(), attrs::s(value));
    }
    Ok(item)
}

/// Presence validation: declared-required fields must be non-null and
/// non-empty before a write. Purely an in-memory precondition check.
pub trait ValidatesPresence: Model {
    /// Attribute names that must not be null or empty.
    fn required_fields() -> &'static [&'static str];

    /// Checks every required field against the emptiness rule in
    /// [`attrs::is_empty_value`]; reports all offending fields at once.
    fn validate_completeness(&self) -> Result<(), EmptyValueError> {
        let item = self.attributes();
        let fields: Vec<&'static str> = Self::required_fields()
            .iter()
            .copied()
            .filter(|field| item.get(*field).is_none_or(attrs::is_empty_value))
            .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(EmptyValueError { fields })
        }
    }
}

/// Models whose sort key is a [`Ksuid`], making items within a partition
/// range-queryable in creation order.
pub trait SortedById: Model {
    /// The sortable identifier, assigned once at write time.
    fn id(&self) -> Ksuid;

    /// Creation time carried by the identifier.
    fn created_at(&self) -> DateTime<Utc> {
        self.id().datetime()
    }
}

/// TTL convention: items expose a `scheduledForDeletionAt` epoch-seconds
/// attribute that the table's TTL setting deletes on.
pub trait Expires {
    /// How many days this item gets to live.
    fn ttl_days(&self) -> i64;

    /// When the item was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// Deletion timestamp as epoch seconds.
    fn scheduled_for_deletion_at(&self) -> i64 {
        (self.created_at() + Duration::days(self.ttl_days())).timestamp()
    }

    /// The TTL attribute, ready to insert into an item.
    fn expiry_attribute(&self) -> (String, aws_sdk_dynamodb::types::AttributeValue) {
        (
            SCHEDULED_FOR_DELETION_ATTRIBUTE.to_string(),
            attrs::n(self.scheduled_for_deletion_at()),
        )
    }
}
