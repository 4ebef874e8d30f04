//! Per-session personas.
//!
//! Each session gets its own [`Persona`] behind an async mutex, so turns of
//! one session run one at a time while different sessions proceed in
//! parallel. When the store is full, the least recently used idle session
//! makes room for a new one.

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::personality::Persona;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Session used when a caller does not name one
pub const DEFAULT_SESSION: &str = "default";

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct Session {
    persona: Arc<Mutex<Persona>>,
    /// Logical clock value of the last lookup
    last_used: AtomicU64,
}

impl Session {
    /// No handle is out, so no turn is running
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.persona) == 1
    }
}

pub struct SessionStore {
    config: Arc<Config>,
    personas: DashMap<String, Session>,
    max_sessions: usize,
    seed: Option<u64>,
    created: AtomicU64,
    clock: AtomicU64,
    // Serialises admission so the cap check and the insert are one step
    admission: std::sync::Mutex<()>,
}

impl SessionStore {
    pub fn new(config: Arc<Config>, max_sessions: usize) -> Self {
        Self {
            config,
            personas: DashMap::new(),
            max_sessions,
            seed: None,
            created: AtomicU64::new(0),
            clock: AtomicU64::new(0),
            admission: std::sync::Mutex::new(()),
        }
    }

    /// Seed personas deterministically (one derived seed per new session)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Fetch the persona for `id`, creating it on first use.
    ///
    /// At the cap, the least recently used idle session is evicted. Fails
    /// with [`BotError::SessionLimit`] only when every session is mid-turn.
    pub fn get_or_create(&self, id: &str) -> Result<Arc<Mutex<Persona>>> {
        if let Some(persona) = self.lookup(id) {
            return Ok(persona);
        }

        let _admission = self
            .admission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(persona) = self.lookup(id) {
            return Ok(persona);
        }
        if self.personas.len() >= self.max_sessions && !self.evict_idlest() {
            return Err(BotError::SessionLimit(self.max_sessions));
        }

        let persona = Arc::new(Mutex::new(self.new_persona()));
        self.personas.insert(
            id.to_string(),
            Session {
                persona: Arc::clone(&persona),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        info!(session = id, sessions = self.personas.len(), "new session");
        Ok(persona)
    }

    fn lookup(&self, id: &str) -> Option<Arc<Mutex<Persona>>> {
        let session = self.personas.get(id)?;
        session.last_used.store(self.tick(), Ordering::SeqCst);
        Some(Arc::clone(&session.persona))
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    fn evict_idlest(&self) -> bool {
        let victim = self
            .personas
            .iter()
            .filter(|entry| entry.value().is_idle())
            .min_by_key(|entry| entry.value().last_used.load(Ordering::SeqCst))
            .map(|entry| entry.key().clone());

        let Some(id) = victim else {
            return false;
        };
        // A lookup may have picked it up since the scan
        let evicted = self
            .personas
            .remove_if(&id, |_, session| session.is_idle())
            .is_some();
        if evicted {
            debug!(session = %id, "evicted least recently used session");
        }
        evicted
    }

    fn new_persona(&self) -> Persona {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        match self.seed {
            Some(seed) => Persona::with_seed(Arc::clone(&self.config), seed.wrapping_add(n)),
            None => Persona::new(Arc::clone(&self.config)),
        }
    }

    /// Forget a session; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        self.personas.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personas.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
