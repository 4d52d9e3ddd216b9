use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{Listing, QuoteMap};
use crate::fetcher::{SymbolFetcher, SymbolOutcome};

/// Fans a list of listings out to one task each and collects the outcomes.
///
/// A batch never fails as a whole: a listing whose task panics or is
/// cancelled comes back all-null.
#[derive(Clone)]
pub struct BatchOrchestrator {
    fetcher: Arc<SymbolFetcher>,
}

impl BatchOrchestrator {
    pub fn new(fetcher: Arc<SymbolFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Arc<SymbolFetcher> {
        &self.fetcher
    }

    /// One outcome per input listing, in input order. Duplicates are fetched
    /// as given.
    pub async fn fetch_outcomes(&self, listings: &[Listing]) -> Vec<SymbolOutcome> {
        let handles = listings.iter().cloned().map(|listing| {
            let fetcher = Arc::clone(&self.fetcher);
            tokio::spawn(async move { fetcher.fetch(&listing).await })
        });

        join_all(handles)
            .await
            .into_iter()
            .zip(listings)
            .map(|(joined, listing)| match joined {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::error!(%listing, %error, "fetch task failed");
                    SymbolOutcome::failed(listing.clone(), error.to_string())
                }
            })
            .collect()
    }

    /// Quote map keyed by ticker with an entry for every input listing.
    ///
    /// The same ticker on two exchanges shares one key; the later listing in
    /// the input wins.
    pub async fn fetch_batch(&self, listings: &[Listing]) -> QuoteMap {
        let outcomes = self.fetch_outcomes(listings).await;
        let summary = BatchSummary::from_outcomes(&outcomes);
        tracing::info!(
            requested = summary.requested,
            priced = summary.priced,
            unpriced = summary.unpriced,
            "batch fetch complete"
        );

        outcomes
            .into_iter()
            .map(SymbolOutcome::into_quote_result)
            .map(|result| (result.symbol.clone(), result))
            .collect()
    }
}

/// Price coverage of one batch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requested: usize,
    pub priced: usize,
    pub unpriced: usize,
    pub with_fundamentals: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[SymbolOutcome]) -> Self {
        let priced = outcomes.iter().filter(|outcome| outcome.price.is_ok()).count();
        Self {
            requested: outcomes.len(),
            priced,
            unpriced: outcomes.len() - priced,
            with_fundamentals: outcomes
                .iter()
                .filter(|outcome| !outcome.fundamentals.is_unavailable())
                .count(),
        }
    }
}
