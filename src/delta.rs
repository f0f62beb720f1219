use std::collections::BTreeMap;

use chrono::NaiveDate;

use smartstring::alias::{String as SmartString};

use serde::Serialize;

use log::debug;

use super::context::GeoEntity;
use super::join::JoinedRecord;


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDeltaRecord {
	pub entity: SmartString,
	pub date: NaiveDate,
	pub cases: u64,
	pub deaths: u64,
	pub population: u64,
	pub new_cases: u64,
	pub new_deaths: u64,
}


fn delta(curr: Option<u64>, prev: Option<u64>) -> Option<i64> {
	Some(curr? as i64 - prev? as i64)
}

/// Day-over-day differences of the cumulative counts, per entity.
///
/// The first date of every entity has no delta and is dropped. A row is
/// also dropped when either delta is negative or undefined, or when the
/// entity has no positive population. Nothing is clamped to zero.
pub fn daily_deltas(records: &[JoinedRecord]) -> Vec<DailyDeltaRecord> {
	let mut by_entity: BTreeMap<&GeoEntity, Vec<&JoinedRecord>> = BTreeMap::new();
	for rec in records.iter() {
		by_entity.entry(&rec.entity).or_insert_with(Vec::new).push(rec);
	}

	let mut result = Vec::new();
	let mut negative = 0usize;
	for (entity, mut series) in by_entity.into_iter() {
		series.sort_by_key(|r| r.date);
		for pair in series.windows(2) {
			let (prev, curr) = (pair[0], pair[1]);
			let (new_cases, new_deaths) = match (delta(curr.cases, prev.cases), delta(curr.deaths, prev.deaths)) {
				(Some(c), Some(d)) => (c, d),
				_ => continue,
			};
			if new_cases < 0 || new_deaths < 0 {
				negative += 1;
				continue
			}
			let population = curr.population.unwrap_or(0);
			if population == 0 {
				continue
			}
			result.push(DailyDeltaRecord{
				entity: entity.label().into(),
				date: curr.date,
				// both are Some, otherwise the delta would be undefined
				cases: curr.cases.unwrap_or(0),
				deaths: curr.deaths.unwrap_or(0),
				population,
				new_cases: new_cases as u64,
				new_deaths: new_deaths as u64,
			});
		}
	}
	debug!("daily deltas: {} rows kept, {} dropped as negative", result.len(), negative);
	result
}
