//! Market registry
//!
//! Owns every market's [`MarketEngine`] behind its own mutex. Work on one
//! market is serialized by that lock; different markets never contend.
//! The map guard is always released before a market lock is taken.

use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;
use types::errors::{EngineError, EngineResult};
use types::ids::{AccountId, MarketId};
use types::market::{Market, Outcome};
use types::numeric::{Price, Quantity};
use types::position::PositionEntry;
use types::trade::Trade;

use crate::book::RestingOrder;
use crate::config::EngineConfig;
use crate::engine::{MarketEngine, OrderRequest, SubmitResult};
use crate::settlement::{SettlementEngine, SettlementReport};

pub const MAX_QUESTION_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_SLUG_LEN: usize = 160;

/// Parameters of a market to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarket {
    pub question: String,
    pub description: Option<String>,
    pub initial_yes_price: Price,
    pub slug: Option<String>,
}

impl NewMarket {
    pub fn new(question: impl Into<String>, initial_yes_price: Price) -> Self {
        Self {
            question: question.into(),
            description: None,
            initial_yes_price,
            slug: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

type SharedEngine = Arc<Mutex<MarketEngine>>;

/// All markets of the process
pub struct MarketRegistry {
    config: EngineConfig,
    markets: DashMap<MarketId, SharedEngine>,
    slugs: DashMap<String, MarketId>,
}

impl Default for MarketRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MarketRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            markets: DashMap::new(),
            slugs: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create an OPEN market with empty books
    pub fn create_market(&self, new: NewMarket) -> EngineResult<Market> {
        let question = new.question.trim();
        if question.is_empty() {
            return Err(EngineError::invalid("Question must not be empty."));
        }
        if question.chars().count() > MAX_QUESTION_LEN {
            return Err(EngineError::invalid(format!(
                "Question must be at most {} characters.",
                MAX_QUESTION_LEN
            )));
        }
        let description = new.description.filter(|d| !d.trim().is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(EngineError::invalid(format!(
                "Description must be at most {} characters.",
                MAX_DESCRIPTION_LEN
            )));
        }
        if !new.initial_yes_price.is_valid_initial_price() {
            return Err(EngineError::invalid("Yes price must be between 1 and 99."));
        }

        let id = MarketId::new();
        let slug = match new.slug {
            Some(slug) => self.claim_slug(slug, id)?,
            None => self.claim_derived_slug(question, id),
        };

        let market = Market::new(
            id,
            slug,
            question.to_string(),
            description,
            new.initial_yes_price,
            now_nanos(),
        );
        self.markets.insert(
            id,
            Arc::new(Mutex::new(MarketEngine::new(market.clone(), self.config))),
        );

        info!(
            market_id = %market.id,
            slug = %market.slug,
            yes_price = %market.yes_price,
            "market created"
        );
        Ok(market)
    }

    pub fn get_market(&self, id: &MarketId) -> EngineResult<Market> {
        self.with_market(id, |engine| Ok(engine.market().clone()))
    }

    pub fn find_by_slug(&self, slug: &str) -> EngineResult<Market> {
        let id = self
            .slugs
            .get(slug)
            .map(|entry| *entry.value())
            .ok_or_else(|| EngineError::market_not_found(slug))?;
        self.get_market(&id)
    }

    /// Every market, newest first
    pub fn list_markets(&self) -> Vec<Market> {
        let engines: Vec<SharedEngine> = self.markets.iter().map(|entry| entry.value().clone()).collect();
        let mut markets: Vec<Market> = engines
            .iter()
            .map(|engine| engine.lock().market().clone())
            .collect();
        markets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        markets
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Run `f` with exclusive access to one market
    pub fn with_market<R>(
        &self,
        id: &MarketId,
        f: impl FnOnce(&mut MarketEngine) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let engine = self
            .markets
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::market_not_found(id))?;
        let mut guard = engine.lock();
        f(&mut *guard)
    }

    pub fn submit_order(&self, id: &MarketId, request: OrderRequest) -> EngineResult<SubmitResult> {
        self.with_market(id, |engine| engine.submit(request, now_nanos()))
    }

    pub fn issue_complete_set(
        &self,
        id: &MarketId,
        account_id: AccountId,
        quantity: Quantity,
    ) -> EngineResult<Vec<PositionEntry>> {
        self.with_market(id, |engine| {
            engine.issue_complete_set(account_id, quantity, now_nanos())
        })
    }

    pub fn resolve(&self, id: &MarketId, outcome: Outcome) -> EngineResult<SettlementReport> {
        self.with_market(id, |engine| {
            SettlementEngine::resolve(engine, outcome, now_nanos())
        })
    }

    pub fn positions(&self, id: &MarketId, account_id: &AccountId) -> EngineResult<Vec<PositionEntry>> {
        self.with_market(id, |engine| Ok(engine.positions(account_id)))
    }

    pub fn order_book(&self, id: &MarketId) -> EngineResult<Vec<RestingOrder>> {
        self.with_market(id, |engine| Ok(engine.order_book()))
    }

    pub fn trades(&self, id: &MarketId) -> EngineResult<Vec<Trade>> {
        self.with_market(id, |engine| Ok(engine.trades().to_vec()))
    }

    fn claim_slug(&self, slug: String, id: MarketId) -> EngineResult<String> {
        if !is_valid_slug(&slug) {
            return Err(EngineError::invalid(
                "Slug must be lowercase letters and digits separated by single hyphens.",
            ));
        }
        match self.slugs.entry(slug) {
            Entry::Occupied(_) => Err(EngineError::Conflict("Slug already in use.".to_string())),
            Entry::Vacant(vacant) => {
                let slug = vacant.key().clone();
                vacant.insert(id);
                Ok(slug)
            }
        }
    }

    /// Derive a slug from the question, suffixing `-1`, `-2`, … until free
    fn claim_derived_slug(&self, question: &str, id: MarketId) -> String {
        let base = slugify(question);
        let mut suffix = 0u64;
        loop {
            let candidate = if suffix == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, suffix)
            };
            if let Entry::Vacant(vacant) = self.slugs.entry(candidate) {
                let slug = vacant.key().clone();
                vacant.insert(id);
                return slug;
            }
            suffix += 1;
        }
    }
}

/// Lowercase, collapse every run of other characters into one `-`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    // Leave room for de-duplication suffixes
    slug.truncate(MAX_SLUG_LEN - 10);
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "market".to_string()
    } else {
        slug.to_string()
    }
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`, at most [`MAX_SLUG_LEN`] bytes
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}
