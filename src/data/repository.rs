//! Drug model repository
//!
//! A process-wide registry of [`DrugModel`]s. Several models may exist for one
//! drug (e.g. adult and pediatric populations); the model selector picks among
//! them per request.
//!
//! # Example
//!
//! ```rust,ignore
//! use tuberxpert::data::DrugModelRepository;
//!
//! let repository = DrugModelRepository::from_dir(Path::new("drugfiles"))?;
//! for model in repository.models_for_drug("rifampicin") {
//!     println!("Candidate: {}", model.drug_model_id);
//! }
//! ```

use std::path::Path;
use thiserror::Error;

use crate::data::drug_model::DrugModel;

/// Errors that can occur when loading drug models
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse drug model: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A registry of drug models, in insertion order
#[derive(Debug, Clone, Default)]
pub struct DrugModelRepository {
    models: Vec<DrugModel>,
}

impl DrugModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.json` drug model found under `path`
    pub fn from_dir(path: &Path) -> Result<Self, RepositoryError> {
        let mut repository = Self::new();
        repository.load_dir(path)?;
        Ok(repository)
    }

    /// Load drug models from a directory into this repository
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_dir(&mut self, path: &Path) -> Result<(), RepositoryError> {
        if !path.is_dir() {
            return Err(RepositoryError::DirectoryNotFound(path.display().to_string()));
        }

        let entries = std::fs::read_dir(path).map_err(|source| RepositoryError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RepositoryError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let file_path = entry.path();
            if file_path.is_dir() {
                self.load_dir(&file_path)?;
            } else if file_path.extension().is_some_and(|ext| ext == "json") {
                files.push(file_path);
            }
        }
        // Directory order is platform dependent
        files.sort();

        for file_path in files {
            let content =
                std::fs::read_to_string(&file_path).map_err(|source| RepositoryError::Io {
                    path: file_path.display().to_string(),
                    source,
                })?;
            match Self::parse(&content) {
                Ok(model) => {
                    tracing::debug!(
                        drug_model_id = %model.drug_model_id,
                        drug_id = %model.drug_id,
                        "Loaded drug model"
                    );
                    self.add(model);
                }
                Err(e) => {
                    tracing::warn!(file = %file_path.display(), error = %e, "Skipping drug model file");
                }
            }
        }
        Ok(())
    }

    /// Parse a drug model from JSON
    pub fn parse(json: &str) -> Result<DrugModel, RepositoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a model, replacing any model with the same id
    pub fn add(&mut self, model: DrugModel) {
        match self
            .models
            .iter_mut()
            .find(|existing| existing.drug_model_id == model.drug_model_id)
        {
            Some(existing) => *existing = model,
            None => self.models.push(model),
        }
    }

    pub fn with_model(mut self, model: DrugModel) -> Self {
        self.add(model);
        self
    }

    /// Get a model by its id
    pub fn get(&self, drug_model_id: &str) -> Option<&DrugModel> {
        self.models
            .iter()
            .find(|model| model.drug_model_id == drug_model_id)
    }

    /// All models registered for `drug_id`
    pub fn models_for_drug(&self, drug_id: &str) -> Vec<&DrugModel> {
        self.models
            .iter()
            .filter(|model| model.drug_id == drug_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
