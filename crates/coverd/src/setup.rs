//! Configuration-entry setup flow.
//!
//! Setting up a cover entry is a fixed sequence: derive the cover id, ensure
//! the two text helpers exist, ensure the positioning script is installed,
//! merge the generated entry into the covers document and fire a reload
//! request. Steps run best-effort in order with no rollback; every step is
//! idempotent, so re-running setup after a partial failure is safe.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::CoverEntryConfig;
use crate::cover;
use crate::cover::CoverError;
use crate::registry::{EntityOptions, EntityRegistry, HelperMode, RegistryError};
use crate::reload;
use crate::reload::ReloadSender;
use crate::script;
use crate::DOMAIN;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Cover(#[from] CoverError),

    #[error("Entity registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Cover setup orchestration against a platform config directory.
pub struct CoverManager<R: EntityRegistry> {
    registry: Arc<R>,
    config_dir: PathBuf,
    reload_tx: ReloadSender,
}

impl<R: EntityRegistry> CoverManager<R> {
    pub fn new(registry: Arc<R>, config_dir: PathBuf, reload_tx: ReloadSender) -> Self {
        Self {
            registry,
            config_dir,
            reload_tx,
        }
    }

    /// Set up one cover configuration entry.
    ///
    /// Errors from the registry, the script copy or the document write
    /// surface to the caller; earlier steps are not rolled back.
    pub async fn setup_entry(
        &self,
        entry_id: &str,
        entry: &CoverEntryConfig,
    ) -> Result<(), SetupError> {
        let cover_id = cover::normalize_id(&entry.name);
        info!("[{}] Setting up cover {}", entry_id, cover_id);

        self.ensure_helper(
            &format!("{}_position", cover_id),
            EntityOptions {
                name: Some(format!("{} Position", entry.name)),
                initial_value: Some("0".to_string()),
                min_value: Some(0),
                max_value: Some(100),
                mode: Some(HelperMode::Box),
                ..Default::default()
            },
        )
        .await?;

        self.ensure_helper(
            &format!("{}_direction", cover_id),
            EntityOptions {
                name: Some(format!("{} Direction", entry.name)),
                initial_value: Some("stopped".to_string()),
                mode: Some(HelperMode::Text),
                ..Default::default()
            },
        )
        .await?;

        script::ensure_script(&self.config_dir)?;

        let rendered =
            cover::generate(&cover_id, &entry.name, &entry.switch_entity, entry.travel_time)?;
        let covers_path = self.config_dir.join(cover::COVERS_RELATIVE_PATH);
        cover::apply_entry(&cover_id, rendered, &covers_path)?;

        reload::request_reload(&self.reload_tx, entry_id);

        info!("[{}] Cover {} set up", entry_id, cover_id);
        Ok(())
    }

    /// Unload one cover configuration entry.
    ///
    /// Generated configuration and helpers are left in place so the cover
    /// keeps working from the shared document until it is removed there.
    pub async fn unload_entry(&self, entry_id: &str) -> Result<(), SetupError> {
        debug!("[{}] Unload requested, configuration left in place", entry_id);
        Ok(())
    }

    /// Create a text helper entity unless it already exists.
    async fn ensure_helper(
        &self,
        object_id: &str,
        options: EntityOptions,
    ) -> Result<(), SetupError> {
        let entity_id = format!("input_text.{}", object_id);
        if self.registry.get(&entity_id).await?.is_some() {
            debug!("Helper {} already exists", entity_id);
            return Ok(());
        }

        let options = EntityOptions {
            suggested_object_id: Some(object_id.to_string()),
            ..options
        };
        self.registry
            .create("input_text", DOMAIN, object_id, options)
            .await?;

        info!("Created helper entity {}", entity_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverDocument;
    use crate::registry::{Entity, MockRegistry};

    fn bedroom_entry() -> CoverEntryConfig {
        CoverEntryConfig {
            name: "Bedroom Blind".to_string(),
            switch_entity: "switch.blind_relay".to_string(),
            travel_time: 18.5,
            enabled: true,
        }
    }

    fn manager(
        registry: Arc<MockRegistry>,
        config_dir: PathBuf,
    ) -> (CoverManager<MockRegistry>, reload::ReloadReceiver) {
        let (tx, rx) = reload::reload_channel();
        (CoverManager::new(registry, config_dir, tx), rx)
    }

    #[tokio::test]
    async fn test_setup_creates_helpers_with_options() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        let (manager, _rx) = manager(registry.clone(), dir.path().to_path_buf());

        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();

        let created = registry.created.lock().await;
        assert_eq!(
            *created,
            vec![
                "input_text.bedroom_blind_position".to_string(),
                "input_text.bedroom_blind_direction".to_string(),
            ]
        );

        let entities = registry.entities.lock().await;
        let position = entities.get("input_text.bedroom_blind_position").unwrap();
        assert_eq!(position.platform, DOMAIN);
        assert_eq!(position.options.name.as_deref(), Some("Bedroom Blind Position"));
        assert_eq!(position.options.initial_value.as_deref(), Some("0"));
        assert_eq!(position.options.min_value, Some(0));
        assert_eq!(position.options.max_value, Some(100));
        assert_eq!(position.options.mode, Some(HelperMode::Box));

        let direction = entities.get("input_text.bedroom_blind_direction").unwrap();
        assert_eq!(direction.options.name.as_deref(), Some("Bedroom Blind Direction"));
        assert_eq!(direction.options.initial_value.as_deref(), Some("stopped"));
        assert_eq!(direction.options.mode, Some(HelperMode::Text));
        assert_eq!(direction.options.min_value, None);
    }

    #[tokio::test]
    async fn test_setup_skips_existing_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        registry
            .add_entity(Entity {
                entity_id: "input_text.bedroom_blind_position".to_string(),
                domain: "input_text".to_string(),
                platform: DOMAIN.to_string(),
                unique_id: "bedroom_blind_position".to_string(),
                options: EntityOptions::default(),
            })
            .await;
        let (manager, _rx) = manager(registry.clone(), dir.path().to_path_buf());

        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();

        let created = registry.created.lock().await;
        assert_eq!(
            *created,
            vec!["input_text.bedroom_blind_direction".to_string()],
            "only the missing helper is created"
        );
    }

    #[tokio::test]
    async fn test_setup_writes_document_script_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        let (manager, mut rx) = manager(registry, dir.path().to_path_buf());

        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();

        let document =
            CoverDocument::load(&dir.path().join(cover::COVERS_RELATIVE_PATH)).unwrap();
        assert_eq!(document.len(), 1);
        let rendered = document.get("bedroom_blind").unwrap();
        assert_eq!(rendered.switch_entity, "switch.blind_relay");
        assert_eq!(rendered.travel_time, 18.5);

        assert!(dir.path().join(script::SCRIPT_RELATIVE_PATH).exists());

        let request = rx.try_recv().unwrap();
        assert_eq!(request.entry_id, "bedroom");
    }

    #[tokio::test]
    async fn test_rerunning_setup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        let (manager, mut rx) = manager(registry.clone(), dir.path().to_path_buf());

        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();
        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();

        let created = registry.created.lock().await;
        assert_eq!(created.len(), 2, "helpers are created only on the first run");

        let document =
            CoverDocument::load(&dir.path().join(cover::COVERS_RELATIVE_PATH)).unwrap();
        assert_eq!(document.len(), 1);

        // Both runs fire a reload request
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_travel_time_fails_before_document_write() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        let (manager, mut rx) = manager(registry, dir.path().to_path_buf());

        let mut entry = bedroom_entry();
        entry.travel_time = 0.0;

        let result = manager.setup_entry("bedroom", &entry).await;
        assert!(matches!(
            result,
            Err(SetupError::Cover(CoverError::Validation(_)))
        ));

        assert!(!dir.path().join(cover::COVERS_RELATIVE_PATH).exists());
        assert!(rx.try_recv().is_err(), "no reload on failed setup");
    }

    #[tokio::test]
    async fn test_unload_leaves_configuration_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(MockRegistry::new());
        let (manager, _rx) = manager(registry, dir.path().to_path_buf());

        manager.setup_entry("bedroom", &bedroom_entry()).await.unwrap();
        manager.unload_entry("bedroom").await.unwrap();

        let document =
            CoverDocument::load(&dir.path().join(cover::COVERS_RELATIVE_PATH)).unwrap();
        assert_eq!(document.len(), 1);
    }
}
