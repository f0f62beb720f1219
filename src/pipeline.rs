use log::{debug, info, warn};

use super::aggregate::{collapse_counties, global_totals, rates, state_totals, EntityTotals, RateRecord};
use super::context::Metric;
use super::delta::daily_deltas;
use super::error::Error;
use super::fetch::{DataSource, Dataset};
use super::join::{attach_population, outer_join, JoinedRecord, PopulationLookup};
use super::loaders::{
	load_population_lookup, load_vaccinations, load_wide_table,
	GLOBAL_ID_COLUMNS, US_CASES_ID_COLUMNS, US_DEATHS_ID_COLUMNS,
};
use super::progress::ProgressSink;
use super::regression::LinearFit;
use super::report::Report;
use super::reshape::{embedded_population, to_long, Scope};
use super::vaccination::{max_by_state, merge_with_deaths, regression_input, StateAliases};


/// Tidy, joined global records with population from the lookup table.
pub fn global_records<D: DataSource + ?Sized, S: ProgressSink + ?Sized>(
		source: &D,
		progress: &mut S,
) -> Result<Vec<JoinedRecord>, Error> {
	let cases = load_wide_table(progress, Dataset::GlobalCases, GLOBAL_ID_COLUMNS, source.open(Dataset::GlobalCases)?)?;
	let deaths = load_wide_table(progress, Dataset::GlobalDeaths, GLOBAL_ID_COLUMNS, source.open(Dataset::GlobalDeaths)?)?;
	let lookup = load_population_lookup(progress, source.open(Dataset::Lookup)?)?;

	let cases = to_long(Scope::Global, &cases);
	let deaths = to_long(Scope::Global, &deaths);
	debug!("global long form: {} case rows, {} death rows", cases.len(), deaths.len());

	let lookup = PopulationLookup::from_rows(&lookup);
	debug!("joining against {} population keys", lookup.len());
	Ok(attach_population(outer_join(&cases, &deaths), |e| lookup.get(e)))
}

/// Tidy, joined US county records with the population embedded in the
/// deaths table.
pub fn us_records<D: DataSource + ?Sized, S: ProgressSink + ?Sized>(
		source: &D,
		progress: &mut S,
) -> Result<Vec<JoinedRecord>, Error> {
	let cases = load_wide_table(progress, Dataset::UsCases, US_CASES_ID_COLUMNS, source.open(Dataset::UsCases)?)?;
	let deaths = load_wide_table(progress, Dataset::UsDeaths, US_DEATHS_ID_COLUMNS, source.open(Dataset::UsDeaths)?)?;

	let population = embedded_population(Scope::Us, &deaths);
	let cases = to_long(Scope::Us, &cases);
	let deaths = to_long(Scope::Us, &deaths);
	debug!("US long form: {} case rows, {} death rows", cases.len(), deaths.len());

	Ok(attach_population(outer_join(&cases, &deaths), |e| population.get(e).copied()))
}


fn rates_for(scope: &str, totals: &[EntityTotals], metric: Metric) -> Vec<RateRecord> {
	let result = rates(totals, metric);
	debug!("{} {} per hundred: {} of {} entities", scope, metric, result.len(), totals.len());
	result
}


/// Runs every stage in order and assembles the report. Only a failed
/// regression fit is tolerated; any other error aborts the run.
pub fn run<D: DataSource + ?Sized, S: ProgressSink + ?Sized, F: LinearFit + ?Sized>(
		source: &D,
		aliases: &StateAliases,
		fit: &F,
		progress: &mut S,
) -> Result<Report, Error> {
	info!("loading global time series ...");
	let global = global_records(source, progress)?;
	info!("aggregating {} global rows ...", global.len());
	let totals = global_totals(&global);
	drop(global);
	let global_cases = rates_for("global", &totals, Metric::Cases);
	let global_deaths = rates_for("global", &totals, Metric::Deaths);

	info!("loading US time series ...");
	let us = us_records(source, progress)?;
	info!("collapsing {} US county rows into states ...", us.len());
	let states = collapse_counties(&us);
	drop(us);
	let totals = state_totals(&states);
	let us_cases = rates_for("US", &totals, Metric::Cases);
	let us_deaths = rates_for("US", &totals, Metric::Deaths);

	info!("deriving daily deltas ...");
	let us_daily = daily_deltas(&states);

	info!("merging vaccination data ({} state aliases) ...", aliases.len());
	let vacc = load_vaccinations(progress, source.open(Dataset::UsVaccinations)?)?;
	let vacc = max_by_state(&vacc, aliases);
	let vaccination_deaths = merge_with_deaths(&us_deaths, &vacc);

	let (x, y) = regression_input(&vaccination_deaths);
	info!("fitting deaths per hundred against vaccination over {} states ...", x.len());
	let regression = match fit.fit(&x, &y) {
		Ok(summary) => Some(summary),
		Err(e) => {
			warn!("no regression: {}", e);
			None
		},
	};

	Ok(Report{
		global_cases,
		global_deaths,
		us_cases,
		us_deaths,
		us_daily,
		vaccination_deaths,
		regression,
	})
}
