use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::quiz::session::Session;
use crate::quiz::{Question, UserId};

/// Registry of in-flight quizzes, one slot per user.
///
/// `start` and `end` are atomic on the map; everything that reads or mutates
/// one user's `Session` goes through that entry's mutex, so same-user events
/// are processed strictly one at a time while different users never wait on
/// each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Creates a fresh session, silently dropping any quiz already in flight
    /// for this user. The caller shuffles the questions first; the store
    /// keeps whatever order it is given.
    pub fn start(&self, user_id: UserId, questions: Vec<Question>) -> Arc<Mutex<Session>> {
        let session = Arc::new(Mutex::new(Session::new(user_id, questions)));
        self.sessions.insert(user_id, session.clone());
        session
    }

    /// Removes and returns the session. A second call for the same user is a
    /// no-op returning `None`.
    pub fn end(&self, user_id: UserId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.remove(&user_id).map(|(_, session)| session)
    }

    /// Removes the slot only while it still holds `session`. A transition
    /// that finishes on an already-replaced session must not tear down the
    /// replacement, so completion paths end the session they actually hold.
    pub fn end_if(&self, user_id: UserId, session: &Arc<Mutex<Session>>) -> bool {
        self.sessions
            .remove_if(&user_id, |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
