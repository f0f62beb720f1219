use std::collections::{BTreeMap, HashMap};

use num_traits::Float;

use smartstring::alias::{String as SmartString};

use serde::Serialize;

use log::debug;

use super::aggregate::RateRecord;
use super::loaders::VaccinationRow;


/// Maps alternative location labels onto the canonical state name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAliases {
	inner: HashMap<SmartString, SmartString>,
}

impl StateAliases {
	pub fn new<'x, I: IntoIterator<Item = (&'x str, &'x str)>>(pairs: I) -> Self {
		Self{
			inner: pairs.into_iter().map(|(alias, canonical)| (alias.into(), canonical.into())).collect(),
		}
	}

	pub fn canonical<'x>(&'x self, name: &'x str) -> &'x str {
		match self.inner.get(name) {
			Some(v) => v.as_str(),
			None => name,
		}
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}
}

impl Default for StateAliases {
	fn default() -> Self {
		Self::new(vec![("New York State", "New York")])
	}
}


fn max_ignoring_missing<F: Float>(acc: Option<F>, v: Option<F>) -> Option<F> {
	match (acc, v.filter(|v| !v.is_nan())) {
		(Some(a), Some(b)) => Some(a.max(b)),
		(a, b) => a.or(b),
	}
}


/// Best vaccination coverage reached by one state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VaccinationMax {
	pub people_fully_vaccinated_per_hundred: Option<f64>,
	pub total_vaccinations_per_hundred: Option<f64>,
	pub people_vaccinated_per_hundred: Option<f64>,
	pub distributed_per_hundred: Option<f64>,
	pub total_boosters_per_hundred: Option<f64>,
}

impl VaccinationMax {
	fn submit(&mut self, row: &VaccinationRow) {
		self.people_fully_vaccinated_per_hundred = max_ignoring_missing(self.people_fully_vaccinated_per_hundred, row.people_fully_vaccinated_per_hundred);
		self.total_vaccinations_per_hundred = max_ignoring_missing(self.total_vaccinations_per_hundred, row.total_vaccinations_per_hundred);
		self.people_vaccinated_per_hundred = max_ignoring_missing(self.people_vaccinated_per_hundred, row.people_vaccinated_per_hundred);
		self.distributed_per_hundred = max_ignoring_missing(self.distributed_per_hundred, row.distributed_per_hundred);
		self.total_boosters_per_hundred = max_ignoring_missing(self.total_boosters_per_hundred, row.total_boosters_per_hundred);
	}
}


/// One row per canonical state name, each rate field reduced separately.
pub fn max_by_state(rows: &[VaccinationRow], aliases: &StateAliases) -> BTreeMap<SmartString, VaccinationMax> {
	let mut result: BTreeMap<SmartString, VaccinationMax> = BTreeMap::new();
	for row in rows.iter() {
		let state = aliases.canonical(row.location.as_str());
		result.entry(state.into()).or_insert_with(VaccinationMax::default).submit(row);
	}
	result
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaccinationDeathRecord {
	pub state: SmartString,
	pub population: u64,
	pub deaths: u64,
	pub deaths_per_hundred: f64,
	pub people_fully_vaccinated_per_hundred: Option<f64>,
	pub total_vaccinations_per_hundred: Option<f64>,
	pub people_vaccinated_per_hundred: Option<f64>,
	pub distributed_per_hundred: Option<f64>,
	pub total_boosters_per_hundred: Option<f64>,
}


/// Full outer join of vaccination maxima onto the state death rates on
/// state name. Rows without a positive population (including every state
/// that only appears in the vaccination data) are dropped.
pub fn merge_with_deaths(
		deaths: &[RateRecord],
		vaccination: &BTreeMap<SmartString, VaccinationMax>,
) -> Vec<VaccinationDeathRecord> {
	let mut joined: BTreeMap<&str, (Option<&RateRecord>, Option<&VaccinationMax>)> = BTreeMap::new();
	for rec in deaths.iter() {
		joined.entry(rec.entity.as_str()).or_insert((None, None)).0.get_or_insert(rec);
	}
	for (state, v) in vaccination.iter() {
		joined.entry(state.as_str()).or_insert((None, None)).1 = Some(v);
	}

	let mut unmatched = Vec::new();
	let mut result = Vec::new();
	for (state, (death, vacc)) in joined.into_iter() {
		let death = match death {
			Some(d) if d.population > 0 => d,
			_ => {
				unmatched.push(state);
				continue
			},
		};
		let vacc = vacc.cloned().unwrap_or_default();
		result.push(VaccinationDeathRecord{
			state: state.into(),
			population: death.population,
			deaths: death.raw_count,
			deaths_per_hundred: death.rate_per_hundred,
			people_fully_vaccinated_per_hundred: vacc.people_fully_vaccinated_per_hundred,
			total_vaccinations_per_hundred: vacc.total_vaccinations_per_hundred,
			people_vaccinated_per_hundred: vacc.people_vaccinated_per_hundred,
			distributed_per_hundred: vacc.distributed_per_hundred,
			total_boosters_per_hundred: vacc.total_boosters_per_hundred,
		});
	}
	debug!("vaccination merge: {} rows, dropped without population: {:?}", result.len(), unmatched);
	result
}

/// (fully vaccinated per hundred, deaths per hundred) for every state that
/// has the predictor.
pub fn regression_input(merged: &[VaccinationDeathRecord]) -> (Vec<f64>, Vec<f64>) {
	merged.iter()
		.filter_map(|r| Some((r.people_fully_vaccinated_per_hundred?, r.deaths_per_hundred)))
		.unzip()
}


#[cfg(test)]
mod tests {
	use super::*;

	use chrono::NaiveDate;

	fn row(location: &str, day: u32, fully: Option<f64>, boosters: Option<f64>) -> VaccinationRow {
		VaccinationRow{
			date: NaiveDate::from_ymd(2021, 12, day),
			location: location.into(),
			people_fully_vaccinated_per_hundred: fully,
			total_vaccinations_per_hundred: None,
			people_vaccinated_per_hundred: None,
			distributed_per_hundred: None,
			total_boosters_per_hundred: boosters,
		}
	}

	fn death_rate(state: &str, population: u64, deaths: u64) -> RateRecord {
		RateRecord{
			entity: state.into(),
			population,
			raw_count: deaths,
			rate_per_hundred: deaths as f64 / population as f64 * 100.0,
		}
	}

	#[test]
	fn alias_is_merged_with_canonical_name() {
		let rows = vec![
			row("New York State", 1, Some(60.0), None),
			row("New York", 2, Some(70.5), Some(10.0)),
		];
		let max = max_by_state(&rows, &StateAliases::default());
		assert_eq!(max.len(), 1);
		let ny = max.get("New York").unwrap();
		assert_eq!(ny.people_fully_vaccinated_per_hundred, Some(70.5));
		assert_eq!(ny.total_boosters_per_hundred, Some(10.0));
	}

	#[test]
	fn max_ignores_missing_values() {
		let rows = vec![
			row("Ohio", 1, Some(40.0), None),
			row("Ohio", 2, None, None),
			row("Ohio", 3, Some(f64::NAN), None),
		];
		let max = max_by_state(&rows, &StateAliases::default());
		let ohio = max.get("Ohio").unwrap();
		assert_eq!(ohio.people_fully_vaccinated_per_hundred, Some(40.0));
		assert_eq!(ohio.total_boosters_per_hundred, None);
	}

	#[test]
	fn merge_drops_rows_without_population() {
		let deaths = vec![
			death_rate("Ohio", 1000, 3),
			death_rate("Guam", 200, 1),
		];
		let vacc = max_by_state(&[
			row("Ohio", 1, Some(55.0), None),
			row("Bureau of Prisons", 1, Some(80.0), None),
		], &StateAliases::default());
		let merged = merge_with_deaths(&deaths, &vacc);
		let states: Vec<_> = merged.iter().map(|r| r.state.as_str()).collect();
		assert_eq!(states, vec!["Guam", "Ohio"]);
		assert_eq!(merged[0].people_fully_vaccinated_per_hundred, None);
	}

	#[test]
	fn regression_input_excludes_missing_predictor() {
		let deaths = vec![
			death_rate("Ohio", 1000, 3),
			death_rate("Guam", 200, 1),
			death_rate("Utah", 500, 1),
		];
		let vacc = max_by_state(&[
			row("Ohio", 1, Some(55.0), None),
			row("Utah", 1, Some(65.0), None),
		], &StateAliases::default());
		let (x, y) = regression_input(&merge_with_deaths(&deaths, &vacc));
		assert_eq!(x, vec![55.0, 65.0]);
		assert_eq!(y, vec![deaths[0].rate_per_hundred, deaths[2].rate_per_hundred]);
	}
}
