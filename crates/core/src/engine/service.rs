//! Settlement engine service.
//!
//! This service contains pure business logic with no database dependencies.
//! Callers re-run it whenever the underlying expense or split records change.

use tally_shared::EngineConfig;
use tracing::{debug, warn};

use super::report::{ExpenseBreakdown, GroupReport, GroupSummary};
use crate::balance::{BalanceAggregator, BalanceSheet, Tolerance};
use crate::error::EngineError;
use crate::group::{Expense, ExpenseRecord, Roster};
use crate::settlement::{Settlement, SettlementResolver};
use crate::split::{Allocation, SplitCalculator};

/// Settlement engine.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    config: EngineConfig,
    aggregator: BalanceAggregator,
    resolver: SettlementResolver,
}

impl SettlementEngine {
    /// Creates an engine from configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let aggregator = BalanceAggregator::from_config(&config);
        let resolver = SettlementResolver::new(Tolerance::from_config(&config.settlement));
        Self {
            config,
            aggregator,
            resolver,
        }
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Splits one expense record.
    pub fn allocate(&self, record: &ExpenseRecord) -> Result<Allocation, EngineError> {
        SplitCalculator::allocate_record(record)
            .inspect_err(|err| Self::log_rejection("allocate", err))
    }

    /// Computes net balances for a group.
    pub fn balances(
        &self,
        roster: &Roster,
        records: &[ExpenseRecord],
    ) -> Result<BalanceSheet, EngineError> {
        self.compute_balances(roster, records)
            .map(|(sheet, _)| sheet)
            .inspect_err(|err| Self::log_rejection("balances", err))
    }

    /// Resolves balances into payments.
    pub fn settle(&self, balances: &BalanceSheet) -> Result<Vec<Settlement>, EngineError> {
        self.resolver
            .resolve(balances)
            .inspect_err(|err| Self::log_rejection("settle", err))
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// Any error from splitting, aggregation, or settlement. Nothing partial is
    /// returned.
    pub fn run(&self, roster: &Roster, records: &[ExpenseRecord]) -> Result<GroupReport, EngineError> {
        debug!(
            expenses = records.len(),
            members = roster.len(),
            "running settlement pipeline"
        );

        let report = self.build_report(roster, records);
        match &report {
            Ok(report) => debug!(
                balances = report.balances.len(),
                settlements = report.settlements.len(),
                "settlement pipeline finished"
            ),
            Err(err) => Self::log_rejection("run", err),
        }
        report
    }

    fn build_report(
        &self,
        roster: &Roster,
        records: &[ExpenseRecord],
    ) -> Result<GroupReport, EngineError> {
        let (balances, allocations) = self.compute_balances(roster, records)?;
        let settlements = self.resolver.resolve(&balances)?;

        let entries = Self::entries(records, &allocations);
        let summary = GroupSummary::from_entries(&entries)?;
        let breakdowns = records
            .iter()
            .zip(&allocations)
            .map(|(record, allocation)| ExpenseBreakdown::new(record, allocation))
            .collect();

        Ok(GroupReport {
            balances,
            settlements,
            summary,
            breakdowns,
        })
    }

    fn compute_balances(
        &self,
        roster: &Roster,
        records: &[ExpenseRecord],
    ) -> Result<(BalanceSheet, Vec<Allocation>), EngineError> {
        let allocations = records
            .iter()
            .map(|record| {
                record.check_members(roster)?;
                SplitCalculator::allocate_record(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = Self::entries(records, &allocations);
        let sheet = self.aggregator.aggregate(roster, &entries)?;
        Ok((sheet, allocations))
    }

    fn entries<'a>(
        records: &'a [ExpenseRecord],
        allocations: &'a [Allocation],
    ) -> Vec<(&'a Expense, &'a Allocation)> {
        records
            .iter()
            .zip(allocations)
            .map(|(record, allocation)| (&record.expense, allocation))
            .collect()
    }

    fn log_rejection(stage: &str, err: &EngineError) {
        warn!(stage, code = err.error_code(), error = %err, "settlement input rejected");
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
