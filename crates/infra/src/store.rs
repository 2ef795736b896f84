use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thingmesh_core::{DomainError, DomainResult};

/// Owner-isolated key/value store for in-memory services.
///
/// Every mutation is a single map operation, so a poisoned lock still guards a
/// consistent map and is used as is.
#[derive(Debug)]
pub struct OwnerStore<K, V> {
    inner: RwLock<HashMap<(String, K), V>>,
}

impl<K, V> OwnerStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<(String, K), V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(String, K), V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Default for OwnerStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OwnerStore<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn get(&self, owner: &str, key: &K) -> Option<V> {
        self.read().get(&(owner.to_string(), key.clone())).cloned()
    }

    pub fn upsert(&self, owner: &str, key: K, value: V) {
        self.write().insert((owner.to_string(), key), value);
    }

    /// Apply `f` to an existing record; `false` when there is none.
    pub fn update(&self, owner: &str, key: &K, f: impl FnOnce(&mut V)) -> bool {
        match self.write().get_mut(&(owner.to_string(), key.clone())) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Insert `entries` under one write guard. Fails with `Conflict`, inserting
    /// nothing, when `clash(new, other)` holds against any stored record or an
    /// earlier entry of the same batch.
    pub fn insert_all_unless(
        &self,
        owner: &str,
        entries: Vec<(K, V)>,
        clash: impl Fn(&V, &V) -> bool,
    ) -> DomainResult<()> {
        let mut map = self.write();
        for (i, (_, new)) in entries.iter().enumerate() {
            let taken = map.values().any(|existing| clash(new, existing))
                || entries[..i].iter().any(|(_, prev)| clash(new, prev));
            if taken {
                return Err(DomainError::conflict());
            }
        }
        for (key, value) in entries {
            map.insert((owner.to_string(), key), value);
        }
        Ok(())
    }

    pub fn insert_unless(
        &self,
        owner: &str,
        key: K,
        value: V,
        clash: impl Fn(&V) -> bool,
    ) -> DomainResult<()> {
        self.insert_all_unless(owner, vec![(key, value)], |_, existing| clash(existing))
    }

    /// Apply `f` to an existing record under one write guard unless `clash`
    /// holds for some other record.
    pub fn update_unless(
        &self,
        owner: &str,
        key: &K,
        clash: impl Fn(&V) -> bool,
        f: impl FnOnce(&mut V),
    ) -> DomainResult<()> {
        let mut map = self.write();
        let target = (owner.to_string(), key.clone());
        if !map.contains_key(&target) {
            return Err(DomainError::not_found());
        }
        if map.iter().any(|(k, v)| *k != target && clash(v)) {
            return Err(DomainError::conflict());
        }
        if let Some(value) = map.get_mut(&target) {
            f(value);
        }
        Ok(())
    }

    pub fn remove(&self, owner: &str, key: &K) -> Option<V> {
        self.write().remove(&(owner.to_string(), key.clone()))
    }

    pub fn list(&self, owner: &str) -> Vec<V> {
        self.read()
            .iter()
            .filter(|((o, _), _)| o == owner)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// First record of any owner satisfying `pred`, with its owner.
    pub fn find(&self, pred: impl Fn(&V) -> bool) -> Option<(String, V)> {
        self.read()
            .iter()
            .find(|(_, v)| pred(*v))
            .map(|((o, _), v)| (o.clone(), v.clone()))
    }
}
