//! Unified index definition and provisioning

use serde_json::{json, Value};
use tracing::{info, warn};

use super::store::DocumentStore;
use crate::error::{EtlError, Result};

/// Settings and mappings of the unified transport index
pub fn index_mapping() -> Value {
    let text_with_keyword = json!({
        "type": "text",
        "analyzer": "transport_analyzer",
        "fields": { "keyword": { "type": "keyword" } }
    });

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0,
            "analysis": {
                "analyzer": {
                    "transport_analyzer": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "asciifolding"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "transport_id": { "type": "keyword" },
                "transport_type": { "type": "keyword" },
                "category": { "type": "keyword" },
                "manufacturer": text_with_keyword.clone(),
                "manufacturer_country": { "type": "keyword" },
                "model": text_with_keyword,
                "model_variant": { "type": "keyword" },
                "year": { "type": "integer" },
                "registration_id": { "type": "keyword" },
                "registration_country": { "type": "keyword" },
                "registration_status": { "type": "keyword" },
                "location": {
                    "properties": {
                        "city": { "type": "keyword" },
                        "state_province": { "type": "keyword" },
                        "country": { "type": "keyword" },
                        "coordinates": { "type": "geo_point" }
                    }
                },
                "dates": {
                    "properties": {
                        "manufactured": { "type": "date" },
                        "registered": { "type": "date" },
                        "last_activity": { "type": "date" },
                        "expires": { "type": "date" }
                    }
                },
                "owner": {
                    "properties": {
                        "type": { "type": "keyword" },
                        "name": {
                            "type": "text",
                            "fields": { "keyword": { "type": "keyword" } }
                        },
                        "country": { "type": "keyword" }
                    }
                },
                "specifications": {
                    "properties": {
                        "engine_type": { "type": "keyword" },
                        "fuel_type": { "type": "keyword" },
                        "capacity": { "type": "integer" },
                        "power": {
                            "properties": {
                                "value": { "type": "float" },
                                "unit": { "type": "keyword" }
                            }
                        }
                    }
                },
                "metadata": {
                    "properties": {
                        "source": { "type": "keyword" },
                        "source_id": { "type": "keyword" },
                        "ingest_date": { "type": "date" },
                        "last_updated": { "type": "date" }
                    }
                },
                "plane_data": { "type": "object" },
                "automobile_data": { "type": "object" },
                "train_data": { "type": "object" }
            }
        }
    })
}

/// Create the unified index, dropping an existing one only when `recreate` is set
pub async fn provision_index(store: &dyn DocumentStore, index: &str, recreate: bool) -> Result<()> {
    if store.index_exists(index).await? {
        if !recreate {
            return Err(EtlError::IndexExists(index.to_string()));
        }
        warn!(index, store = store.name(), "Deleting existing index");
        store.delete_index(index).await?;
    }

    store.create_index(index, &index_mapping()).await?;
    info!(index, store = store.name(), "Created index");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::loader::memory::InMemoryStore;
    use crate::loader::store::IndexAction;

    #[test]
    fn test_mapping_field_types() {
        let mapping = index_mapping();
        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["transport_id"]["type"], "keyword");
        assert_eq!(props["manufacturer"]["fields"]["keyword"]["type"], "keyword");
        assert_eq!(props["location"]["properties"]["coordinates"]["type"], "geo_point");
        assert_eq!(props["dates"]["properties"]["manufactured"]["type"], "date");
        assert_eq!(mapping["settings"]["number_of_replicas"], 0);
    }

    #[tokio::test]
    async fn test_provision_refuses_existing_index() {
        let store = InMemoryStore::new();
        provision_index(&store, "transport-unified", false).await.unwrap();

        let err = provision_index(&store, "transport-unified", false).await.unwrap_err();
        assert!(matches!(err, EtlError::IndexExists(_)));
    }

    #[tokio::test]
    async fn test_recreate_drops_documents() {
        let store = InMemoryStore::new();
        provision_index(&store, "t", false).await.unwrap();
        store
            .bulk_index("t", &[IndexAction::new("a", json!({"transport_type": "plane"}))])
            .await
            .unwrap();

        provision_index(&store, "t", true).await.unwrap();
        assert_eq!(store.count("t").await.unwrap(), 0);
        assert!(store.mapping("t").unwrap().is_some());
    }
}
