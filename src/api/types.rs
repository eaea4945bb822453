//! Shared types for the HTTP layer: request context and session store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::classifier::HeartDiseaseModel;
use crate::models::Role;
use crate::plans::PlanGenerator;

/// Sessions expire after 8 hours without an explicit logout.
const SESSION_TTL_SECS: u64 = 8 * 3600;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Connection>>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub model: Arc<HeartDiseaseModel>,
    pub plans: PlanGenerator,
}

impl ApiContext {
    pub fn new(conn: Connection, plans: PlanGenerator) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            model: Arc::new(HeartDiseaseModel::new()),
            plans,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session store
// ═══════════════════════════════════════════════════════════

/// The authenticated identity bound to one session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub username: String,
    pub role: Role,
}

/// Resolved session for the current request, injected into request
/// extensions by the session middleware. `None` means anonymous.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionIdentity>);

struct SessionEntry {
    identity: SessionIdentity,
    expires_at: Instant,
}

/// In-memory session store keyed by opaque token, with TTL expiry.
///
/// Anonymous → (start) → Authenticated{role} → (end | expiry) → Anonymous.
pub struct SessionStore {
    entries: HashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(SESSION_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Bind an authenticated identity to a fresh token.
    pub fn start(&mut self, username: String, role: Role) -> String {
        // Periodic cleanup when the store grows large
        if self.entries.len() > 1000 {
            self.cleanup();
        }

        let token = generate_token();
        self.entries.insert(
            token.clone(),
            SessionEntry {
                identity: SessionIdentity { username, role },
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// The identity bound to a token, if the session is still live.
    /// Expired entries are removed on access.
    pub fn current(&mut self, token: &str) -> Option<SessionIdentity> {
        let entry = self.entries.get(token)?;
        if Instant::now() >= entry.expires_at {
            self.entries.remove(token);
            return None;
        }
        Some(entry.identity.clone())
    }

    /// Clear the identity bound to a token.
    pub fn end(&mut self, token: &str) {
        self.entries.remove(token);
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a random session token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
