/// Single-slot memo: caches the value derived from the last key and
/// recomputes only when the key changes.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { slot: None, computations: 0 }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        if !matches!(&self.slot, Some((cached, _)) if *cached == key) {
            self.slot = None;
        }
        if self.slot.is_none() {
            self.computations += 1;
            log::trace!("memo derivation #{}", self.computations);
        }
        &self.slot.get_or_insert_with(|| (key, compute())).1
    }

    /// How many times the derivation has run.
    #[cfg(test)]
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
