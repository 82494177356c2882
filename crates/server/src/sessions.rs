//! In-process session store.
//!
//! A login mints an opaque UUID token, stored in a cookie on the client
//! and mapped to the authenticated identity here. Sessions live until an
//! explicit logout or process restart; there is no expiry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mestieri_session";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    User,
    Provider,
}

/// The authenticated identity threaded through handlers as a request
/// extension, never read from ambient state.
#[derive(Clone, Debug)]
pub struct SessionIdentity {
    pub kind: AccountKind,
    pub account_id: i64,
    pub display_name: String,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionIdentity>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity: SessionIdentity) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions.write().await.insert(token, identity);
        token
    }

    pub async fn get(&self, token: Uuid) -> Option<SessionIdentity> {
        self.sessions.read().await.get(&token).cloned()
    }

    pub async fn remove(&self, token: Uuid) {
        self.sessions.write().await.remove(&token);
    }
}
