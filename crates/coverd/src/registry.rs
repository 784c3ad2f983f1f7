//! Entity registry access.
//!
//! The platform's entity registry is consumed through the [`EntityRegistry`]
//! trait so the setup flow can be tested against a mock. The shipped
//! implementation persists registered entities as pretty-printed JSON below
//! the platform config directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

/// Input mode of a text helper entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperMode {
    Box,
    Text,
}

/// Options accepted when creating a registry entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<HelperMode>,
}

/// A registered entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Full entity id, `<domain>.<object_id>`
    pub entity_id: String,

    pub domain: String,

    /// Platform that created the entity
    pub platform: String,

    /// Identifier unique within the platform
    pub unique_id: String,

    #[serde(default)]
    pub options: EntityOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to access registry store {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Registry store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trait for entity registry operations
///
/// This trait allows for mocking the registry for testing purposes
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Look up an entity by its full entity id
    async fn get(&self, entity_id: &str) -> Result<Option<Entity>, RegistryError>;

    /// Register an entity.
    ///
    /// Registration is idempotent: if the derived entity id is already
    /// registered, the existing entity is returned unchanged.
    async fn create(
        &self,
        domain: &str,
        platform: &str,
        unique_id: &str,
        options: EntityOptions,
    ) -> Result<Entity, RegistryError>;
}

/// File-backed entity registry
///
/// Entities are kept in memory and persisted to
/// `<config_dir>/.storage/entity_registry.json` on every registration.
pub struct StoredRegistry {
    path: PathBuf,
    entities: Mutex<HashMap<String, Entity>>,
}

impl StoredRegistry {
    /// Open the registry store below `config_dir`, creating an empty
    /// registry if no store exists yet.
    pub fn open(config_dir: &Path) -> Result<Self, RegistryError> {
        let path = config_dir.join(".storage").join("entity_registry.json");

        let entities = if path.exists() {
            let contents =
                fs::read_to_string(&path).map_err(|e| RegistryError::Io(path.clone(), e))?;
            serde_json::from_str(&contents)?
        } else {
            debug!("No registry store at {}, starting empty", path.display());
            HashMap::new()
        };

        Ok(Self {
            path,
            entities: Mutex::new(entities),
        })
    }

    fn persist(path: &Path, entities: &HashMap<String, Entity>) -> Result<(), RegistryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::Io(parent.to_path_buf(), e))?;
        }

        let contents = serde_json::to_string_pretty(entities)?;
        fs::write(path, contents).map_err(|e| RegistryError::Io(path.to_path_buf(), e))
    }
}

#[async_trait]
impl EntityRegistry for StoredRegistry {
    async fn get(&self, entity_id: &str) -> Result<Option<Entity>, RegistryError> {
        let entities = self.entities.lock().await;
        Ok(entities.get(entity_id).cloned())
    }

    async fn create(
        &self,
        domain: &str,
        platform: &str,
        unique_id: &str,
        options: EntityOptions,
    ) -> Result<Entity, RegistryError> {
        let object_id = options
            .suggested_object_id
            .clone()
            .unwrap_or_else(|| unique_id.to_string());
        let entity_id = format!("{}.{}", domain, object_id);

        let mut entities = self.entities.lock().await;
        if let Some(existing) = entities.get(&entity_id) {
            debug!("Entity {} already registered", entity_id);
            return Ok(existing.clone());
        }

        let entity = Entity {
            entity_id: entity_id.clone(),
            domain: domain.to_string(),
            platform: platform.to_string(),
            unique_id: unique_id.to_string(),
            options,
        };
        entities.insert(entity_id.clone(), entity.clone());
        Self::persist(&self.path, &entities)?;

        info!("Registered entity: {}", entity_id);
        Ok(entity)
    }
}

/// Mock entity registry for testing
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockRegistry {
    pub entities: Mutex<HashMap<String, Entity>>,
    /// Entity ids passed to `create`, in call order
    pub created: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed an existing entity
    pub async fn add_entity(&self, entity: Entity) {
        let mut entities = self.entities.lock().await;
        entities.insert(entity.entity_id.clone(), entity);
    }
}

#[cfg(test)]
#[async_trait]
impl EntityRegistry for MockRegistry {
    async fn get(&self, entity_id: &str) -> Result<Option<Entity>, RegistryError> {
        let entities = self.entities.lock().await;
        Ok(entities.get(entity_id).cloned())
    }

    async fn create(
        &self,
        domain: &str,
        platform: &str,
        unique_id: &str,
        options: EntityOptions,
    ) -> Result<Entity, RegistryError> {
        let object_id = options
            .suggested_object_id
            .clone()
            .unwrap_or_else(|| unique_id.to_string());
        let entity_id = format!("{}.{}", domain, object_id);

        let entity = Entity {
            entity_id: entity_id.clone(),
            domain: domain.to_string(),
            platform: platform.to_string(),
            unique_id: unique_id.to_string(),
            options,
        };

        let mut entities = self.entities.lock().await;
        entities.insert(entity_id.clone(), entity.clone());
        self.created.lock().await.push(entity_id);

        Ok(entity)
    }
}
