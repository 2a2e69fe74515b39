use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Clone-out helpers for `DashMap`.
///
/// Every helper returns owned data, so no shard guard outlives the call.
/// Mute, permission and session maps are read from tasks that go on to
/// await or to call back into other maps.
pub trait DashMapExt<K, V> {
    /// Clone the value for `key`.
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Clone every value.
    fn values_cloned(&self) -> Vec<V>
    where
        V: Clone;

    /// Keys whose value matches `pred`.
    fn keys_where(&self, pred: impl Fn(&V) -> bool) -> Vec<K>
    where
        K: Clone;

    /// Clone the first value matching `pred`. Map order is unspecified.
    fn find_cloned(&self, pred: impl Fn(&V) -> bool) -> Option<V>
    where
        V: Clone;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|r| r.value().clone())
    }

    fn values_cloned(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|e| e.value().clone()).collect()
    }

    fn keys_where(&self, pred: impl Fn(&V) -> bool) -> Vec<K>
    where
        K: Clone,
    {
        self.iter()
            .filter(|e| pred(e.value()))
            .map(|e| e.key().clone())
            .collect()
    }

    fn find_cloned(&self, pred: impl Fn(&V) -> bool) -> Option<V>
    where
        V: Clone,
    {
        self.iter()
            .find(|e| pred(e.value()))
            .map(|e| e.value().clone())
    }
}
