//! Message pools: canned utterances keyed by phase name.
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

const DEBATE_MESSAGES_RON: &str = include_str!("../../arena_data/debate/messages.ron");

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no messages registered for fallback phase '{0}'")]
    MissingFallback(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A set of phase-keyed message pools.
#[derive(Debug, Clone, Default)]
pub struct MessagePools {
    pools: FxHashMap<String, Vec<String>>,
}

impl MessagePools {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in debate pools, four messages per phase.
    pub fn debate() -> Result<MessagePools, PoolError> {
        Self::parse_ron(DEBATE_MESSAGES_RON)
    }

    pub fn load_from_ron(path: &Path) -> Result<MessagePools, PoolError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<MessagePools, PoolError> {
        let pools: FxHashMap<String, Vec<String>> = ron::from_str(input)?;
        Ok(MessagePools { pools })
    }

    pub fn insert(&mut self, phase_name: &str, messages: Vec<String>) {
        self.pools.insert(phase_name.to_string(), messages);
    }

    /// Merge another pool set into this one. Pools from `other` replace
    /// pools in `self` registered under the same phase name.
    pub fn merge(&mut self, other: MessagePools) {
        for (name, messages) in other.pools {
            self.pools.insert(name, messages);
        }
    }

    /// Messages registered for a phase. Empty pools count as unregistered.
    pub fn get(&self, phase_name: &str) -> Option<&[String]> {
        self.pools
            .get(phase_name)
            .map(Vec::as_slice)
            .filter(|pool| !pool.is_empty())
    }

    pub fn phase_names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Fails unless `fallback` names a non-empty pool.
    pub fn ensure_fallback(&self, fallback: &str) -> Result<(), PoolError> {
        match self.get(fallback) {
            Some(_) => Ok(()),
            None => Err(PoolError::MissingFallback(fallback.to_string())),
        }
    }

    /// Pick one message for `phase_name`, falling back to the `fallback`
    /// phase's pool when that phase has nothing registered.
    ///
    /// Returns `None` only if the fallback pool is missing too.
    pub fn choose<'a, R: Rng + ?Sized>(
        &'a self,
        phase_name: &str,
        fallback: &str,
        rng: &mut R,
    ) -> Option<&'a str> {
        let pool = match self.get(phase_name) {
            Some(pool) => pool,
            None => {
                tracing::warn!(phase = phase_name, fallback, "no message pool for phase, using fallback");
                self.get(fallback)?
            }
        };
        pool.choose(rng).map(String::as_str)
    }
}
