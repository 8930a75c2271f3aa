//! Voter and candidate registry for VoteChain

use crate::error::VoteChainError;
use rand::Rng;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::Mutex;

/// Credential tokens are six characters drawn from this set.
const TOKEN_LEN: usize = 6;
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Bounded retry for collision-checked token issuance. Exhaustion at this
/// depth means the token space is effectively full.
const MAX_TOKEN_ATTEMPTS: usize = 64;

/// Abstraction over the credential/candidate store consumed by the voting
/// coordinator. A credential is a capability: valid exactly once.
pub trait CredentialStore: Send + Sync {
    /// True iff a record exists for `token` and it is not yet consumed.
    fn is_credential_valid(&self, token: &str) -> Result<bool, VoteChainError>;
    /// Set the consumed flag for an existing token. Idempotent: re-running
    /// on an already-consumed token is a no-op.
    fn consume_credential(&self, token: &str) -> Result<(), VoteChainError>;
    /// Read-only candidate listing, ordered by registration.
    fn list_candidates(&self) -> Result<Vec<String>, VoteChainError>;
}

pub struct VoterRegistry {
    conn: Mutex<Connection>,
}

impl VoterRegistry {
    pub fn open(path: &str) -> Result<Self, VoteChainError> {
        let conn = Connection::open(path)
            .map_err(|e| VoteChainError::DatabaseError(format!("Failed to open database: {}", e)))?;
        Self::init_schema(conn)
    }

    /// Ephemeral registry, useful for tests and fallback operation.
    pub fn open_in_memory() -> Result<Self, VoteChainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            VoteChainError::DatabaseError(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::init_schema(conn)
    }

    fn init_schema(conn: Connection) -> Result<Self, VoteChainError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS voters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                voter_name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                address TEXT NOT NULL,
                token TEXT NOT NULL UNIQUE,
                token_used INTEGER DEFAULT 0
            )",
            [],
        )
        .map_err(|e| {
            VoteChainError::DatabaseError(format!("Failed to create voters table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS candidates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                candidate_name TEXT NOT NULL UNIQUE
            )",
            [],
        )
        .map_err(|e| {
            VoteChainError::DatabaseError(format!("Failed to create candidates table: {}", e))
        })?;

        Ok(VoterRegistry {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, VoteChainError> {
        self.conn
            .lock()
            .map_err(|_| VoteChainError::DatabaseError("Mutex poisoned".to_string()))
    }

    /// Register a voter and issue a fresh single-use credential token.
    /// A `(name, date_of_birth)` pair may register only once.
    pub fn register_voter(
        &self,
        name: &str,
        date_of_birth: &str,
        address: &str,
    ) -> Result<String, VoteChainError> {
        let conn = self.lock()?;

        let already: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM voters WHERE voter_name = ?1 AND date_of_birth = ?2",
                params![name, date_of_birth],
                |row| row.get(0),
            )
            .map_err(|e| {
                VoteChainError::DatabaseError(format!("Failed to query voters: {}", e))
            })?;
        if already > 0 {
            return Err(VoteChainError::DuplicateVoter);
        }

        let mut rng = rand::thread_rng();
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token(&mut rng);
            let collision: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM voters WHERE token = ?1",
                    params![token],
                    |row| row.get(0),
                )
                .map_err(|e| {
                    VoteChainError::DatabaseError(format!("Failed to query tokens: {}", e))
                })?;
            if collision > 0 {
                continue;
            }

            conn.execute(
                "INSERT INTO voters (voter_name, date_of_birth, address, token)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, date_of_birth, address, token],
            )
            .map_err(|e| {
                VoteChainError::DatabaseError(format!("Failed to insert voter: {}", e))
            })?;
            return Ok(token);
        }

        Err(VoteChainError::TokenSpaceExhausted)
    }

    pub fn is_voter_registered(
        &self,
        name: &str,
        date_of_birth: &str,
    ) -> Result<bool, VoteChainError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM voters WHERE voter_name = ?1 AND date_of_birth = ?2",
                params![name, date_of_birth],
                |row| row.get(0),
            )
            .map_err(|e| VoteChainError::DatabaseError(format!("Failed to query voters: {}", e)))?;
        Ok(count > 0)
    }

    pub fn add_candidate(&self, name: &str) -> Result<(), VoteChainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO candidates (candidate_name) VALUES (?1)",
            params![name],
        )
        .map_err(|e| VoteChainError::DatabaseError(format!("Failed to insert candidate: {}", e)))?;
        Ok(())
    }
}

impl CredentialStore for VoterRegistry {
    fn is_credential_valid(&self, token: &str) -> Result<bool, VoteChainError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM voters WHERE token = ?1 AND token_used = 0",
                params![token],
                |row| row.get(0),
            )
            .map_err(|e| VoteChainError::DatabaseError(format!("Failed to query token: {}", e)))?;
        Ok(count > 0)
    }

    fn consume_credential(&self, token: &str) -> Result<(), VoteChainError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE voters SET token_used = 1 WHERE token = ?1",
            params![token],
        )
        .map_err(|e| VoteChainError::DatabaseError(format!("Failed to consume token: {}", e)))?;
        Ok(())
    }

    fn list_candidates(&self) -> Result<Vec<String>, VoteChainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT candidate_name FROM candidates ORDER BY id ASC")
            .map_err(|e| VoteChainError::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| {
                VoteChainError::DatabaseError(format!("Failed to query candidates: {}", e))
            })?;

        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row.map_err(|e| {
                VoteChainError::DatabaseError(format!("Failed to read candidate row: {}", e))
            })?);
        }
        Ok(candidates)
    }
}

fn generate_token(rng: &mut impl Rng) -> String {
    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect()
}

/// Simple in-memory credential store useful for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryRegistry {
    tokens: Mutex<HashMap<String, bool>>,
    candidates: Mutex<Vec<String>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-issue a token as unused.
    pub fn issue_token(&self, token: &str) {
        self.tokens
            .lock()
            .expect("token map lock poisoned")
            .insert(token.to_string(), false);
    }

    pub fn add_candidate(&self, name: &str) {
        let mut candidates = self.candidates.lock().expect("candidate list lock poisoned");
        if !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }
}

impl CredentialStore for InMemoryRegistry {
    fn is_credential_valid(&self, token: &str) -> Result<bool, VoteChainError> {
        let tokens = self.tokens.lock().expect("token map lock poisoned");
        Ok(matches!(tokens.get(token), Some(&false)))
    }

    fn consume_credential(&self, token: &str) -> Result<(), VoteChainError> {
        let mut tokens = self.tokens.lock().expect("token map lock poisoned");
        if let Some(used) = tokens.get_mut(token) {
            *used = true;
        }
        Ok(())
    }

    fn list_candidates(&self) -> Result<Vec<String>, VoteChainError> {
        Ok(self
            .candidates
            .lock()
            .expect("candidate list lock poisoned")
            .clone())
    }
}
