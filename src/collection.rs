use crate::store::Entity;

/// Stamp handed out when a refresh starts. Only the newest token may
/// replace the collection's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

/// Owned in-memory copy of one table.
///
/// Every local change and every new refresh bumps the generation, so a refresh
/// that started before either is discarded when it completes.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    generation: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.generation += 1;
        RefreshToken(self.generation)
    }

    /// Replace the contents with a completed fetch. Returns false, leaving the
    /// collection untouched, if the token is stale.
    pub fn finish_refresh(&mut self, token: RefreshToken, items: Vec<T>) -> bool {
        if token.0 != self.generation {
            tracing::debug!(
                table = T::TABLE,
                token = token.0,
                current = self.generation,
                "discarding stale refresh"
            );
            return false;
        }
        self.items = items;
        true
    }

    pub fn prepend(&mut self, item: T) {
        self.generation += 1;
        self.items.insert(0, item);
    }

    pub fn prepend_all(&mut self, items: Vec<T>) {
        self.generation += 1;
        self.items.splice(0..0, items);
    }

    /// Swap in the stored version of a row. Returns false if the id is absent.
    pub fn replace(&mut self, item: T) -> bool {
        self.generation += 1;
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.generation += 1;
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }
}
