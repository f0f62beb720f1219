use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use smartstring::alias::{String as SmartString};

use log::debug;

use super::context::GeoEntity;
use super::loaders::LookupRow;
use super::reshape::TimeSeriesRecord;


/// Cases and deaths for one (entity, date), with population attached.
///
/// `None` marks a value that was absent from its source table (one side
/// of the outer join) or an entity missing from the population lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
	pub entity: GeoEntity,
	pub date: NaiveDate,
	pub cases: Option<u64>,
	pub deaths: Option<u64>,
	pub population: Option<u64>,
	pub combined_key: String,
}

impl JoinedRecord {
	pub fn has_population(&self) -> bool {
		self.population.unwrap_or(0) > 0
	}
}


/// Population keyed by `(province?, country)`. When the source table
/// lists a key more than once the first row wins.
#[derive(Debug, Clone, Default)]
pub struct PopulationLookup {
	inner: HashMap<(Option<SmartString>, SmartString), Option<u64>>,
}

impl PopulationLookup {
	pub fn from_rows(rows: &[LookupRow]) -> Self {
		let mut inner = HashMap::new();
		let mut ambiguous = 0usize;
		for row in rows.iter() {
			let key = GeoEntity::global(&row.province, &row.country).lookup_key();
			if inner.contains_key(&key) {
				ambiguous += 1;
				continue
			}
			inner.insert(key, row.population);
		}
		debug!("population lookup: {} keys, {} duplicate rows ignored", inner.len(), ambiguous);
		Self{inner}
	}

	pub fn get(&self, entity: &GeoEntity) -> Option<u64> {
		self.inner.get(&entity.lookup_key()).copied().flatten()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}
}


/// Full outer join of the two metrics on (entity, date). Output is ordered
/// by entity, then date.
pub fn outer_join(cases: &[TimeSeriesRecord], deaths: &[TimeSeriesRecord]) -> Vec<JoinedRecord> {
	let mut merged: BTreeMap<(&GeoEntity, NaiveDate), (Option<u64>, Option<u64>)> = BTreeMap::new();
	for rec in cases.iter() {
		merged.entry((&rec.entity, rec.date)).or_insert((None, None)).0 = Some(rec.value);
	}
	for rec in deaths.iter() {
		merged.entry((&rec.entity, rec.date)).or_insert((None, None)).1 = Some(rec.value);
	}
	merged.into_iter().map(|((entity, date), (cases, deaths))| {
		JoinedRecord{
			entity: entity.clone(),
			date,
			cases,
			deaths,
			population: None,
			combined_key: entity.combined_key(),
		}
	}).collect()
}

/// Left join of population onto joined records. Entities without a match
/// keep a null population.
pub fn attach_population<F: Fn(&GeoEntity) -> Option<u64>>(mut records: Vec<JoinedRecord>, f: F) -> Vec<JoinedRecord> {
	let mut missing = 0usize;
	for rec in records.iter_mut() {
		rec.population = f(&rec.entity);
		if rec.population.is_none() {
			missing += 1;
		}
	}
	debug!("{} of {} joined rows without population", missing, records.len());
	records
}
