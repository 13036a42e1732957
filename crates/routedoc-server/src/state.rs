//! In-memory pet store shared by the demo handlers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "species": "dog" }))]
pub struct Pet {
    #[schema(example = "dog")]
    pub species: String,
}

impl Pet {
    #[must_use]
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
        }
    }
}

/// Cheaply cloneable handle to the store. Pet ids are list indices.
#[derive(Debug, Clone)]
pub struct PetStore {
    pets: Arc<RwLock<Vec<Pet>>>,
}

impl Default for PetStore {
    /// A store holding a dog and a cat.
    fn default() -> Self {
        Self::new(vec![Pet::new("dog"), Pet::new("cat")])
    }
}

impl PetStore {
    #[must_use]
    pub fn new(pets: Vec<Pet>) -> Self {
        Self {
            pets: Arc::new(RwLock::new(pets)),
        }
    }

    pub async fn list(&self) -> Vec<Pet> {
        self.pets.read().await.clone()
    }

    pub async fn get(&self, id: usize) -> Option<Pet> {
        self.pets.read().await.get(id).cloned()
    }

    /// Stores a pet and returns its id.
    pub async fn add(&self, pet: Pet) -> usize {
        let mut pets = self.pets.write().await;
        pets.push(pet);
        pets.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_store_has_dog_and_cat() {
        let store = PetStore::default();
        assert_eq!(store.list().await, vec![Pet::new("dog"), Pet::new("cat")]);
    }

    #[tokio::test]
    async fn test_add_returns_index() {
        let store = PetStore::default();
        let id = store.add(Pet::new("fish")).await;
        assert_eq!(id, 2);
        assert_eq!(store.get(id).await, Some(Pet::new("fish")));
        assert_eq!(store.get(10).await, None);
    }
}
