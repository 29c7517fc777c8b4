use tracing::info;

use ktima_parser::RawTable;

use crate::aggregate::{aggregate, AggregateRow, AggregateTable};
use crate::calculator::derive_rows;
use crate::config::{AgeBuckets, Granularity, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::filters::FilterSet;
use crate::normalize::normalize_dates;
use crate::period::assign_periods;
use crate::validation::resolve;

/// Everything one pipeline run produces: the aggregate table plus the
/// bookkeeping a shell needs to explain what happened to the input.
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub granularity: Granularity,
    pub age: AgeBuckets,
    pub table: AggregateTable,
    /// Rows discarded because their sale date would not parse.
    pub dropped_dates: usize,
    /// Rows excluded by the active filters.
    pub filtered_out: usize,
    /// Rows that made it into the aggregation.
    pub aggregated: usize,
}

impl TrendReport {
    pub fn age_labels(&self) -> Vec<String> {
        self.table
            .age_classes
            .iter()
            .map(|class| class.label(&self.age))
            .collect()
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.table.rows
    }
}

/// Run the full pipeline over an already-loaded record set. Stateless:
/// every call recomputes from the raw table, and the table itself is
/// never mutated.
///
/// Stage order: resolve columns -> normalize dates (drop nulls) ->
/// derived fields -> period keys -> filters -> aggregate. The empty
/// checks short-circuit with `NoData` before aggregation so a
/// zero-row table is never presented as a result.
pub fn run(table: &RawTable, config: &PipelineConfig) -> Result<TrendReport> {
    config.validate()?;

    if table.is_empty() {
        return Err(PipelineError::NoData(
            "the selected sources contain no rows".to_string(),
        ));
    }

    let columns = resolve(table, &config.columns)?;

    let dates = normalize_dates(table, columns.date);
    let derived = derive_rows(table, &columns, config, &dates);
    let dropped_dates = table.height() - derived.len();
    if derived.is_empty() {
        return Err(PipelineError::NoData(
            "no row has a parseable sale date".to_string(),
        ));
    }

    let keyed = assign_periods(&derived, config.granularity);

    let filter_set = FilterSet::resolve(&config.filters, &columns);
    let kept = filter_set.apply(&keyed);
    let filtered_out = keyed.len() - kept.len();
    if kept.is_empty() {
        return Err(PipelineError::NoData(
            "every row was excluded by the active filters".to_string(),
        ));
    }

    let aggregated = aggregate(&kept);
    info!(
        periods = aggregated.rows.len(),
        records = kept.len(),
        dropped_dates,
        filtered_out,
        "aggregation complete"
    );

    Ok(TrendReport {
        granularity: config.granularity,
        age: config.age,
        table: aggregated,
        dropped_dates,
        filtered_out,
        aggregated: kept.len(),
    })
}
