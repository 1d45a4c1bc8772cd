//! Store operations over a DynamoDB table.
//!
//! A thin, generic layer over the SDK calls: no retry, no caching, no
//! partial-failure reconciliation. Batch results are handed back the way
//! the service returned them.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{
    AttributeValue, KeysAndAttributes, PutRequest, ReturnValue, WriteRequest,
};
use aws_sdk_dynamodb::Client;
use monotable_core::{ItemKey, KeySpec};
use tracing::debug;

use crate::attrs::Item;
use crate::client::{create_client, table_name_from_env, ClientConfig};
use crate::error::{MappingError, Result};
use crate::model::{self, Model};

/// A DynamoDB table handle.
///
/// Holds an injected client and a table name; all operations are plain
/// request/response calls addressed through a model's key spec.
pub struct Store {
    client: Client,
    table_name: String,
}

/// Result of a batch get: decoded models plus any keys the service left
/// unprocessed, exactly as returned.
#[derive(Debug)]
pub struct BatchGet<M> {
    pub models: Vec<M>,
    pub unprocessed_keys: Option<HashMap<String, KeysAndAttributes>>,
}

impl Store {
    /// Creates a store with the given client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a store from environment configuration: SDK default
    /// credential chain plus `DYNAMODB_TABLE_NAME`.
    pub async fn from_env() -> Self {
        let client = create_client(&ClientConfig::default()).await;
        Self::new(client, table_name_from_env())
    }

    /// The table this store addresses.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The underlying client, for operations this layer does not cover.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn key_attributes<M: Model>(key: &ItemKey) -> Result<Item> {
        Ok(model::key_attributes(M::key_spec(), key, M::ENTITY_TYPE)?)
    }

    /// Gets one item by key.
    pub async fn get<M: Model>(&self, key: &ItemKey) -> Result<Option<M>> {
        let key_attributes = Self::key_attributes::<M>(key)?;
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, "get item");

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes))
            .send()
            .await?;

        match result.item {
            Some(item) => Ok(Some(M::from_item(&item)?)),
            None => Ok(None),
        }
    }

    /// Gets a projection of one item by key. Returns the raw attribute
    /// map, since a projection may omit fields the model requires.
    pub async fn get_projected<M: Model>(
        &self,
        key: &ItemKey,
        attributes: &[&str],
    ) -> Result<Option<Item>> {
        let key_attributes = Self::key_attributes::<M>(key)?;
        let names: HashMap<String, String> = attributes
            .iter()
            .map(|name| (format!("#{name}"), (*name).to_string()))
            .collect();
        let projection = attributes
            .iter()
            .map(|name| format!("#{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, %projection, "get projected item");

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes))
            .projection_expression(projection)
            .set_expression_attribute_names(Some(names))
            .send()
            .await?;

        Ok(result.item)
    }

    /// Puts the full item, overwriting any existing item with the same key.
    pub async fn put<M: Model>(&self, model: &M) -> Result<()> {
        self.put_item::<M>(model.to_item()?, None).await
    }

    /// Puts the item with null attributes removed.
    pub async fn put_non_null<M: Model>(&self, model: &M) -> Result<()> {
        self.put_item::<M>(model.to_non_null_item()?, None).await
    }

    /// Puts the full item only if no item with the same partition key
    /// attribute exists yet.
    pub async fn put_if_not_exists<M: Model>(&self, model: &M) -> Result<()> {
        let condition = format!(
            "attribute_not_exists({})",
            M::key_spec().partition_attribute()
        );
        self.put_item::<M>(model.to_item()?, Some(condition)).await
    }

    /// Puts the full item under a caller-supplied condition expression.
    pub async fn put_with_condition<M: Model>(
        &self,
        model: &M,
        condition: impl Into<String>,
    ) -> Result<()> {
        self.put_item::<M>(model.to_item()?, Some(condition.into()))
            .await
    }

    async fn put_item<M: Model>(&self, item: Item, condition: Option<String>) -> Result<()> {
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, "put item");

        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item));
        if let Some(condition) = condition {
            request = request.condition_expression(condition);
        }
        request.send().await?;

        Ok(())
    }

    /// Writes only the named data attributes of an existing item with a
    /// `SET` expression. Returns the item as it looks after the update.
    pub async fn update_attributes<M: Model>(&self, model: &M, attributes: &[&str]) -> Result<Item> {
        if attributes.is_empty() {
            return Err(MappingError::NoAttributesSelected.into());
        }

        let all = model.attributes();
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for &name in attributes {
            let value = all
                .get(name)
                .cloned()
                .ok_or_else(|| MappingError::UnknownAttribute(name.to_string()))?;
            names.insert(format!("#{name}"), name.to_string());
            values.insert(format!(":{name}"), value);
        }

        let expression = update_expression(attributes);
        let key_attributes = Self::key_attributes::<M>(&model.key())?;
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, %expression, "update item");

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;

        Ok(result.attributes.unwrap_or_default())
    }

    /// Writes a single data attribute of an existing item.
    pub async fn update_attribute<M: Model>(&self, model: &M, attribute: &str) -> Result<Item> {
        self.update_attributes(model, &[attribute]).await
    }

    /// Writes all data attributes of an existing item.
    pub async fn update_all_attributes<M: Model>(&self, model: &M) -> Result<Item> {
        let all = model.attributes();
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        self.update_attributes(model, &names).await
    }

    /// Deletes one item by key.
    pub async fn delete<M: Model>(&self, key: &ItemKey) -> Result<()> {
        let key_attributes = Self::key_attributes::<M>(key)?;
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, "delete item");

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes))
            .send()
            .await?;

        Ok(())
    }

    /// Queries a partition of a composite-keyed model, optionally
    /// narrowed with `begins_with` on the sort key.
    pub async fn query_partition<M: Model>(
        &self,
        partition: &str,
        sort_prefix: Option<&str>,
    ) -> Result<Vec<M>> {
        let KeySpec::Composite {
            partition: partition_attribute,
            sort: sort_attribute,
        } = M::key_spec()
        else {
            return Err(MappingError::KeyMismatch {
                entity_type: M::ENTITY_TYPE,
            }
            .into());
        };
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, %partition, "query partition");

        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .expression_attribute_values(":pk", AttributeValue::S(partition.to_string()));

        request = match sort_prefix {
            Some(prefix) => request
                .key_condition_expression(format!(
                    "{partition_attribute} = :pk AND begins_with({sort_attribute}, :sk_prefix)"
                ))
                .expression_attribute_values(":sk_prefix", AttributeValue::S(prefix.to_string())),
            None => request.key_condition_expression(format!("{partition_attribute} = :pk")),
        };

        let result = request.send().await?;
        let items = result.items.unwrap_or_default();
        items
            .iter()
            .map(|item| M::from_item(item).map_err(Into::into))
            .collect()
    }

    /// Batch-gets items by key. Unprocessed keys come back untouched.
    pub async fn batch_get<M: Model>(&self, keys: &[ItemKey]) -> Result<BatchGet<M>> {
        if keys.is_empty() {
            return Ok(BatchGet {
                models: Vec::new(),
                unprocessed_keys: None,
            });
        }

        let mut builder = KeysAndAttributes::builder();
        for key in keys {
            builder = builder.keys(Self::key_attributes::<M>(key)?);
        }
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, count = keys.len(), "batch get");

        let result = self
            .client
            .batch_get_item()
            .request_items(&self.table_name, builder.build()?)
            .send()
            .await?;

        let mut models = Vec::new();
        if let Some(mut responses) = result.responses {
            if let Some(items) = responses.remove(&self.table_name) {
                models.reserve(items.len());
                for item in &items {
                    models.push(M::from_item(item)?);
                }
            }
        }

        Ok(BatchGet {
            models,
            unprocessed_keys: result.unprocessed_keys.filter(|keys| !keys.is_empty()),
        })
    }

    /// Batch-puts full items. Unprocessed write requests come back
    /// untouched; the caller decides whether to resubmit.
    pub async fn batch_put<M: Model>(
        &self,
        models: &[M],
    ) -> Result<Option<HashMap<String, Vec<WriteRequest>>>> {
        if models.is_empty() {
            return Ok(None);
        }

        let mut requests = Vec::with_capacity(models.len());
        for model in models {
            let put = PutRequest::builder().set_item(Some(model.to_item()?)).build()?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }
        debug!(table = %self.table_name, entity_type = M::ENTITY_TYPE, count = requests.len(), "batch put");

        let result = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await?;

        Ok(result.unprocessed_items.filter(|items| !items.is_empty()))
    }
}

/// Builds a `SET` update expression over `#name = :name` placeholders.
fn update_expression(attributes: &[&str]) -> String {
    let assignments: Vec<String> = attributes
        .iter()
        .map(|name| format!("#{name} = :{name}"))
        .collect();
    format!("SET {}", assignments.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_expression_single_attribute() {
        assert_eq!(update_expression(&["name"]), "SET #name = :name");
    }

    #[test]
    fn test_update_expression_multiple_attributes() {
        assert_eq!(
            update_expression(&["name", "email", "age"]),
            "SET #name = :name, #email = :email, #age = :age"
        );
    }
}
