use std::{num::NonZeroUsize, sync::Mutex};

use lru::LruCache;
use regex::Regex;

use mdui_slo::{errors, Result};

const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(v) => v,
    None => unreachable!(),
};

/// Regexp matches service identities against registered service patterns,
/// keeping the most recently used compiled patterns around.
pub struct Regexp {
    lru: Mutex<LruCache<String, Regex>>,
}

impl std::fmt::Debug for Regexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regexp").finish()
    }
}

impl Regexp {
    pub fn new(cache_size: usize) -> Self {
        Self {
            lru: Mutex::new(LruCache::new(
                NonZeroUsize::new(cache_size).unwrap_or(DEFAULT_CACHE_SIZE),
            )),
        }
    }

    /// Compiles `pattern` so that it has to match the whole input.
    pub fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| errors::bad_request(&err))
    }

    pub fn matches(&self, pattern: &str, needle: &str) -> Result<bool> {
        {
            let mut rlru = self.lru.lock().map_err(errors::any)?;
            if let Some(reg) = rlru.get(pattern) {
                return Ok(reg.is_match(needle));
            }
        };

        let reg = Self::compile(pattern)?;
        let matched = reg.is_match(needle);
        {
            let mut wlru = self.lru.lock().map_err(errors::any)?;
            wlru.put(pattern.to_owned(), reg);
        };
        Ok(matched)
    }
}
