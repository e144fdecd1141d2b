//! Shared "refresh" logic used by the CLI front-end.
//!
//! One refresh is:
//! stock prices (optional) -> macro start date -> every panel row, in parallel
//!
//! The result is a plain `Dashboard` value; rendering lives in `report`.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Settings;
use crate::data::{CachedSource, FredClient, SeriesSource, WorldBankClient, YahooClient};
use crate::domain::{IndicatorSpec, MACRO_PANEL, Period, Provider, RangeResolution, Transform};
use crate::error::{AppError, ResolveError};
use crate::report::{StockPerformance, compute_performance};
use crate::resolve::Resolver;

pub type SharedSource = Arc<dyn SeriesSource>;

/// What a refresh should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Ticker for the stock block; `None` skips it.
    pub ticker: Option<String>,
    pub period: Period,
    /// Macro range start; defaults to the first price date of the stock block.
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

/// All computed outputs of one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Local>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stock: Option<StockPerformance>,
    pub rows: Vec<IndicatorRow>,
}

impl Dashboard {
    pub fn failed_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorRow {
    pub spec: IndicatorSpec,
    pub outcome: RowOutcome,
}

/// A row either resolved (each half possibly `NotFound`) or its fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Resolved(RangeResolution),
    Failed { error: String },
}

/// One resolver per provider.
pub struct Pipeline {
    fred: Resolver<SharedSource>,
    world_bank: Resolver<SharedSource>,
    prices: Resolver<SharedSource>,
}

impl Pipeline {
    pub fn new(fred: SharedSource, world_bank: SharedSource, prices: SharedSource) -> Self {
        Self {
            fred: Resolver::new(fred),
            world_bank: Resolver::new(world_bank),
            prices: Resolver::new(prices),
        }
    }

    /// Network-backed pipeline, each source behind the configured cache.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(
            source_for(Provider::Fred, settings)?,
            source_for(Provider::WorldBank, settings)?,
            source_for(Provider::Yahoo, settings)?,
        ))
    }

    pub fn resolver(&self, provider: Provider) -> &Resolver<SharedSource> {
        match provider {
            Provider::Fred => &self.fred,
            Provider::WorldBank => &self.world_bank,
            Provider::Yahoo => &self.prices,
        }
    }

    /// Resolve one panel row over `[start, end]`, scaled for display.
    pub fn resolve_indicator(
        &self,
        spec: &IndicatorSpec,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeResolution, ResolveError> {
        let resolver = self.resolver(spec.provider);
        let range = match spec.transform {
            Transform::Level => resolver.resolve_range(spec.series_id, start, end, spec.window())?,
            Transform::YearOverYear => resolver.year_over_year_range(spec.series_id, start, end)?,
        };
        if spec.divisor == 1.0 {
            Ok(range)
        } else {
            Ok(range.map_value(|v| v / spec.divisor))
        }
    }

    /// Price summary for `ticker` over `period` ending at `end`.
    pub fn stock_performance(
        &self,
        ticker: &str,
        period: Period,
        end: NaiveDate,
    ) -> Result<StockPerformance, ResolveError> {
        let start = period.start_date(end)?;
        let series = self.prices.source().fetch(ticker, start, end)?;
        compute_performance(&series, period).ok_or_else(|| {
            ResolveError::invalid(format!("no price data for '{ticker}' over {}", period.label()))
        })
    }

    /// Resolve the whole panel; rows are computed in parallel and returned in panel order.
    pub fn macro_rows(&self, panel: &[IndicatorSpec], start: NaiveDate, end: NaiveDate) -> Vec<IndicatorRow> {
        panel
            .par_iter()
            .map(|spec| {
                let outcome = match self.resolve_indicator(spec, start, end) {
                    Ok(range) => RowOutcome::Resolved(range),
                    Err(err) => {
                        tracing::warn!(key = spec.key, series_id = spec.series_id, error = %err, "indicator failed");
                        RowOutcome::Failed { error: err.to_string() }
                    }
                };
                IndicatorRow { spec: *spec, outcome }
            })
            .collect()
    }

    pub fn refresh(&self, request: &RefreshRequest) -> Result<Dashboard, ResolveError> {
        self.refresh_panel(request, MACRO_PANEL)
    }

    /// `refresh` over a caller-chosen panel.
    pub fn refresh_panel(&self, request: &RefreshRequest, panel: &[IndicatorSpec]) -> Result<Dashboard, ResolveError> {
        let started = Instant::now();

        let stock = match request.ticker.as_deref() {
            Some(ticker) => Some(self.stock_performance(ticker, request.period, request.end)?),
            None => None,
        };

        let start_date = request
            .start
            .or_else(|| stock.as_ref().map(|s| s.first_date))
            .ok_or_else(|| ResolveError::invalid("macro start date is required when no ticker is given"))?;

        let rows = self.macro_rows(panel, start_date, request.end);

        tracing::info!(
            %start_date,
            end_date = %request.end,
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh complete"
        );

        Ok(Dashboard {
            generated_at: Local::now(),
            start_date,
            end_date: request.end,
            stock,
            rows,
        })
    }
}

/// Network source for `provider`, wrapped in the configured cache.
pub fn source_for(provider: Provider, settings: &Settings) -> Result<SharedSource, AppError> {
    let ttl = settings.cache_ttl;
    let source: SharedSource = match provider {
        Provider::Fred => Arc::new(CachedSource::new(FredClient::from_settings(settings)?, ttl)),
        Provider::WorldBank => Arc::new(CachedSource::new(WorldBankClient::from_settings(settings)?, ttl)),
        Provider::Yahoo => Arc::new(CachedSource::new(YahooClient::from_settings(settings)?, ttl)),
    };
    Ok(source)
}
