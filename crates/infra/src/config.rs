//! Fetch limits, read from the environment.

use anyhow::{bail, Context};

/// Caps applied when loading pool data.
///
/// `None` means unlimited. `request_fetch_limit` bounds how many pending
/// requests one dispatch pass takes on; the rest wait for the next pass.
/// `item_fetch_limit` only bounds the inventory snapshot returned to readers.
/// A dispatch pass always sees every item of its pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    pub item_fetch_limit: Option<usize>,
    pub request_fetch_limit: Option<usize>,
}

impl DispatchConfig {
    pub const ITEM_FETCH_LIMIT_VAR: &'static str = "RELIEF_ITEM_FETCH_LIMIT";
    pub const REQUEST_FETCH_LIMIT_VAR: &'static str = "RELIEF_REQUEST_FETCH_LIMIT";

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests, layered config).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self {
            item_fetch_limit: parse_limit(Self::ITEM_FETCH_LIMIT_VAR, lookup(Self::ITEM_FETCH_LIMIT_VAR))?,
            request_fetch_limit: parse_limit(
                Self::REQUEST_FETCH_LIMIT_VAR,
                lookup(Self::REQUEST_FETCH_LIMIT_VAR),
            )?,
        };
        tracing::debug!(?config, "dispatch configuration loaded");
        Ok(config)
    }
}

fn parse_limit(name: &str, raw: Option<String>) -> anyhow::Result<Option<usize>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let limit: usize = raw
        .parse()
        .with_context(|| format!("{name} must be a positive integer, got {raw:?}"))?;
    if limit == 0 {
        bail!("{name} must be a positive integer, got 0");
    }
    Ok(Some(limit))
}
