use crate::session::{SessionStore, SessionStoreError, StoredSession};

#[derive(Default)]
pub struct InMemorySessionStore {
    session: parking_lot::RwLock<Option<StoredSession>>,
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        Ok(self.session.read().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        *self.session.write() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        self.session.write().take();
        Ok(())
    }
}
