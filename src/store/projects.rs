//! Project portfolio store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{cache_snapshot, LoadFlags};
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::local::{keys, LocalStorage};
use crate::models::{NewProject, Project};

/// Owner of the project collection, newest first.
pub struct ProjectsStore {
    gateway: Arc<dyn Gateway>,
    storage: Arc<LocalStorage>,
    projects: RwLock<Vec<Project>>,
    flags: LoadFlags,
}

impl ProjectsStore {
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<LocalStorage>) -> Self {
        Self {
            gateway,
            storage,
            projects: RwLock::new(Vec::new()),
            flags: LoadFlags::new(),
        }
    }

    pub async fn all(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Project> {
        self.projects
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.flags.is_loading()
    }

    /// Replace the collection with the gateway's, ordered by creation time descending.
    pub async fn load(&self) {
        match self.fetch().await {
            Ok(fetched) => {
                *self.projects.write().await = fetched.clone();
                self.flags.mark_loaded();
                info!("Loaded {} projects", fetched.len());
                cache_snapshot(&self.storage, keys::PROJECTS, &fetched).await;
            }
            Err(e) => {
                error!("Error loading projects: {}", e);
                if !self.flags.has_loaded() {
                    if let Some(cached) = self.storage.get_json::<Vec<Project>>(keys::PROJECTS) {
                        warn!("Using {} locally cached projects", cached.len());
                        *self.projects.write().await = cached;
                    }
                }
            }
        }
        self.flags.finish();
    }

    async fn fetch(&self) -> Result<Vec<Project>, AppError> {
        let records = self.gateway.list_projects().await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Project::try_from(record) {
                Ok(project) => Some(project),
                Err(e) => {
                    warn!("Skipping project row: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Insert a project and put it at the front of the collection.
    pub async fn add(&self, new_project: NewProject) -> Result<Project, AppError> {
        let new_project = new_project.sanitized();

        let record = self
            .gateway
            .insert_project(&new_project)
            .await
            .inspect_err(|e| error!("Error adding project: {}", e))?;
        let project = Project::try_from(record)?;

        let snapshot = {
            let mut projects = self.projects.write().await;
            projects.insert(0, project.clone());
            projects.clone()
        };
        cache_snapshot(&self.storage, keys::PROJECTS, &snapshot).await;
        info!("Added project {}", project.id);

        Ok(project)
    }

    /// Write the full record by id, then replace the in-memory entry.
    pub async fn update(&self, project: Project) -> Result<Project, AppError> {
        let project = project.sanitized();

        let record = self
            .gateway
            .update_project(&project.id, &project.fields())
            .await
            .inspect_err(|e| error!("Error updating project {}: {}", project.id, e))?;
        let updated = Project::try_from(record)?;

        let snapshot = {
            let mut projects = self.projects.write().await;
            if let Some(entry) = projects.iter_mut().find(|p| p.id == updated.id) {
                *entry = updated.clone();
            }
            projects.clone()
        };
        cache_snapshot(&self.storage, keys::PROJECTS, &snapshot).await;
        info!("Updated project {}", updated.id);

        Ok(updated)
    }

    /// Remove a project. Removing an unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.gateway
            .delete_project(id)
            .await
            .inspect_err(|e| error!("Error deleting project {}: {}", id, e))?;

        let snapshot = {
            let mut projects = self.projects.write().await;
            projects.retain(|p| p.id != id);
            projects.clone()
        };
        cache_snapshot(&self.storage, keys::PROJECTS, &snapshot).await;
        info!("Deleted project {}", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectCategory;
    use crate::store::test_support::{sqlite_gateway, UnreachableGateway};
    use std::collections::HashSet;

    fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            category: ProjectCategory::SecondOeuvre,
            location: "Nanterre".to_string(),
            year: "2024".to_string(),
            description: "Cloisons et plâtrerie".to_string(),
            image: String::new(),
            details: vec!["Placo".to_string(), " ".to_string(), "Isolation".to_string()],
        }
    }

    async fn loaded_store() -> (ProjectsStore, Arc<dyn Gateway>, tempfile::TempDir) {
        let (gateway, dir) = sqlite_gateway().await;
        let store = ProjectsStore::new(gateway.clone(), Arc::new(LocalStorage::in_memory()));
        store.load().await;
        (store, gateway, dir)
    }

    #[tokio::test]
    async fn test_add_prepends_and_matches_reload_order() {
        let (store, gateway, _dir) = loaded_store().await;

        store.add(new_project("Bureaux")).await.unwrap();
        store.add(new_project("École")).await.unwrap();
        let newest = store.add(new_project("Gymnase")).await.unwrap();

        let in_memory = store.all().await;
        assert_eq!(in_memory[0], newest);
        assert_eq!(newest.details, vec!["Placo", "Isolation"]);

        let ids: HashSet<_> = in_memory.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 3);

        let fresh = ProjectsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        fresh.load().await;
        assert_eq!(fresh.all().await, in_memory);
    }

    #[tokio::test]
    async fn test_update_replaces_entry() {
        let (store, _gateway, _dir) = loaded_store().await;
        let added = store.add(new_project("Bureaux")).await.unwrap();

        let mut changed = added.clone();
        changed.title = "Bureaux rénovés".to_string();
        changed.details = vec![String::new(), "Peinture".to_string()];
        let updated = store.update(changed).await.unwrap();

        assert_eq!(updated.details, vec!["Peinture"]);
        assert_eq!(store.get(&added.id).await, Some(updated));
    }

    #[tokio::test]
    async fn test_update_unknown_id_leaves_collection_unchanged() {
        let (store, _gateway, _dir) = loaded_store().await;
        let added = store.add(new_project("Bureaux")).await.unwrap();
        let before = store.all().await;

        let ghost = Project {
            id: "does-not-exist".to_string(),
            ..added
        };
        let err = store.update(ghost).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(err.is_persistence_failure());
        assert_eq!(store.all().await, before);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_an_error() {
        let (store, _gateway, _dir) = loaded_store().await;
        let keep = store.add(new_project("Garder")).await.unwrap();
        let removed = store.add(new_project("Supprimer")).await.unwrap();

        store.delete(&removed.id).await.unwrap();
        let after_first = store.all().await;
        assert_eq!(after_first, vec![keep]);

        store.delete(&removed.id).await.unwrap();
        assert_eq!(store.all().await, after_first);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_collection_unchanged() {
        let store = ProjectsStore::new(
            Arc::new(UnreachableGateway),
            Arc::new(LocalStorage::in_memory()),
        );
        store.load().await;

        let err = store.add(new_project("Bureaux")).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(store.all().await.is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_unreachable_gateway_falls_back_to_snapshot() {
        let storage = Arc::new(LocalStorage::in_memory());
        let cached = vec![new_project("Cache").into_project("cached-1".to_string())];
        storage.set_json(keys::PROJECTS, &cached).await.unwrap();

        let store = ProjectsStore::new(Arc::new(UnreachableGateway), storage);
        store.load().await;

        assert_eq!(store.all().await, cached);
    }

    #[tokio::test]
    async fn test_successful_load_refreshes_snapshot() {
        let (gateway, _dir) = sqlite_gateway().await;
        let storage = Arc::new(LocalStorage::in_memory());
        let store = ProjectsStore::new(gateway, storage.clone());
        store.load().await;
        let added = store.add(new_project("Bureaux")).await.unwrap();

        let snapshot: Vec<Project> = storage.get_json(keys::PROJECTS).unwrap();
        assert_eq!(snapshot, vec![added]);
    }
}
