use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    /// No dataset of the requested type is attached.
    #[error("dataset is not available for this neighbor")]
    NotAvailable,
}

/// Type-keyed attachment store for routing-extension state.
///
/// Holds at most one dataset per concrete type. Unrelated routing
/// strategies attach their own types without this crate knowing their
/// shape; ownership transfers in on `put` and ends with the registry.
#[derive(Default)]
pub struct DatasetRegistry {
    datasets: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `dataset` keyed by its type, dropping any prior dataset of
    /// the same type.
    pub fn put<T: Any + Send + Sync>(&mut self, dataset: T) {
        self.datasets.insert(TypeId::of::<T>(), Box::new(dataset));
    }

    /// Looks up the dataset of type `T`. The downcast doubles as a guard:
    /// a tag/type mismatch yields the same error as absence.
    pub fn get<T: Any>(&self) -> Result<&T, DatasetError> {
        self.datasets
            .get(&TypeId::of::<T>())
            .and_then(|dataset| dataset.downcast_ref::<T>())
            .ok_or(DatasetError::NotAvailable)
    }

    pub fn get_mut<T: Any>(&mut self) -> Result<&mut T, DatasetError> {
        self.datasets
            .get_mut(&TypeId::of::<T>())
            .and_then(|dataset| dataset.downcast_mut::<T>())
            .ok_or(DatasetError::NotAvailable)
    }

    /// Erases the dataset of type `T`; no-op when absent.
    pub fn remove<T: Any>(&mut self) {
        self.datasets.remove(&TypeId::of::<T>());
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("len", &self.datasets.len())
            .finish()
    }
}
