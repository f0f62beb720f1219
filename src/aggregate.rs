use std::collections::BTreeMap;

use chrono::NaiveDate;

use smartstring::alias::{String as SmartString};

use serde::Serialize;

use super::context::{GeoEntity, Metric};
use super::join::JoinedRecord;


fn max_opt(acc: Option<u64>, v: Option<u64>) -> Option<u64> {
	match (acc, v) {
		(Some(a), Some(b)) => Some(a.max(b)),
		(a, b) => a.or(b),
	}
}

fn sum_opt(acc: Option<u64>, v: Option<u64>) -> Option<u64> {
	match (acc, v) {
		(Some(a), Some(b)) => Some(a + b),
		(a, b) => a.or(b),
	}
}


/// Latest cumulative totals of one aggregated entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTotals {
	pub label: SmartString,
	pub population: u64,
	pub cases: Option<u64>,
	pub deaths: Option<u64>,
}

impl EntityTotals {
	pub fn count(&self, metric: Metric) -> Option<u64> {
		match metric {
			Metric::Cases => self.cases,
			Metric::Deaths => self.deaths,
		}
	}
}


/// Max per (country, population) group: collapses dates down to the latest
/// cumulative value while keeping rows with distinct populations apart.
pub fn global_pass_one(records: &[JoinedRecord]) -> BTreeMap<(SmartString, u64), EntityTotals> {
	let mut groups: BTreeMap<(SmartString, u64), EntityTotals> = BTreeMap::new();
	for rec in records.iter() {
		let population = rec.population.unwrap_or(0);
		let key = (rec.entity.country.clone(), population);
		let entry = groups.entry(key).or_insert_with(|| EntityTotals{
			label: rec.entity.country.clone(),
			population,
			cases: None,
			deaths: None,
		});
		entry.cases = max_opt(entry.cases, rec.cases);
		entry.deaths = max_opt(entry.deaths, rec.deaths);
		entry.population = entry.population.max(population);
	}
	groups
}

/// Sums the population groups of each country, then drops countries
/// without a positive population. Groups without population (e.g. a
/// "Repatriated Travellers" row) contribute neither counts nor population.
pub fn global_pass_two(groups: &BTreeMap<(SmartString, u64), EntityTotals>) -> Vec<EntityTotals> {
	let mut countries: BTreeMap<&SmartString, EntityTotals> = BTreeMap::new();
	for ((country, population), group) in groups.iter() {
		if *population == 0 {
			continue
		}
		let entry = countries.entry(country).or_insert_with(|| EntityTotals{
			label: country.clone(),
			population: 0,
			cases: None,
			deaths: None,
		});
		entry.population += group.population;
		entry.cases = sum_opt(entry.cases, group.cases);
		entry.deaths = sum_opt(entry.deaths, group.deaths);
	}
	countries.into_iter()
		.map(|(_, totals)| totals)
		.filter(|totals| totals.population > 0)
		.collect()
}

/// Per-country totals. Two passes are required: a single group-by-country
/// would double count countries listing both an aggregate row and
/// province rows under the same population.
pub fn global_totals(records: &[JoinedRecord]) -> Vec<EntityTotals> {
	global_pass_two(&global_pass_one(records))
}


/// Sums county rows into one row per (state, date). Counts and population
/// are summed over the counties that report them.
pub fn collapse_counties(records: &[JoinedRecord]) -> Vec<JoinedRecord> {
	let mut states: BTreeMap<(GeoEntity, NaiveDate), JoinedRecord> = BTreeMap::new();
	for rec in records.iter() {
		let entity = rec.entity.state_level();
		let entry = states.entry((entity.clone(), rec.date)).or_insert_with(|| JoinedRecord{
			combined_key: entity.combined_key(),
			entity,
			date: rec.date,
			cases: None,
			deaths: None,
			population: None,
		});
		entry.cases = sum_opt(entry.cases, rec.cases);
		entry.deaths = sum_opt(entry.deaths, rec.deaths);
		entry.population = sum_opt(entry.population, rec.population);
	}
	states.into_iter().map(|(_, rec)| rec).collect()
}

/// Latest totals per (state, population) for state-level records.
pub fn state_totals(records: &[JoinedRecord]) -> Vec<EntityTotals> {
	let mut groups: BTreeMap<(SmartString, u64), EntityTotals> = BTreeMap::new();
	for rec in records.iter() {
		let population = rec.population.unwrap_or(0);
		let label: SmartString = rec.entity.label().into();
		let entry = groups.entry((label.clone(), population)).or_insert_with(|| EntityTotals{
			label,
			population,
			cases: None,
			deaths: None,
		});
		entry.cases = max_opt(entry.cases, rec.cases);
		entry.deaths = max_opt(entry.deaths, rec.deaths);
	}
	groups.into_iter()
		.map(|(_, totals)| totals)
		.filter(|totals| totals.population > 0)
		.collect()
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRecord {
	pub entity: SmartString,
	pub population: u64,
	pub raw_count: u64,
	pub rate_per_hundred: f64,
}

pub fn per_hundred(count: u64, population: u64) -> f64 {
	count as f64 / population as f64 * 100.0
}

/// Per-hundred rates of one metric, highest first. Entities without a
/// count for the metric or without population are left out.
pub fn rates(totals: &[EntityTotals], metric: Metric) -> Vec<RateRecord> {
	let mut result: Vec<RateRecord> = totals.iter()
		.filter(|t| t.population > 0)
		.filter_map(|t| {
			let raw_count = t.count(metric)?;
			Some(RateRecord{
				entity: t.label.clone(),
				population: t.population,
				raw_count,
				rate_per_hundred: per_hundred(raw_count, t.population),
			})
		})
		.collect();
	// stable, so ties keep input order
	result.sort_by(|a, b| b.rate_per_hundred.partial_cmp(&a.rate_per_hundred).unwrap_or(std::cmp::Ordering::Equal));
	result
}
