use std::collections::HashMap;

use chrono::NaiveDate;

use super::context::GeoEntity;
use super::loaders::{WideRow, WideTable};


/// One (entity, date) value of a single metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRecord {
	pub entity: GeoEntity,
	pub date: NaiveDate,
	pub value: u64,
}


/// How to read the identifier columns of a wide table into an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	/// `Province/State`, `Country/Region`
	Global,
	/// `Admin2`, `Province_State`, `Country_Region`
	Us,
}

impl Scope {
	pub fn entity(&self, table: &WideTable, row: &WideRow) -> GeoEntity {
		match self {
			Self::Global => GeoEntity::global(
				row.id(table, "Province/State").unwrap_or(""),
				row.id(table, "Country/Region").unwrap_or(""),
			),
			Self::Us => GeoEntity::us(
				row.id(table, "Admin2").unwrap_or(""),
				row.id(table, "Province_State").unwrap_or(""),
				row.id(table, "Country_Region").unwrap_or(""),
			),
		}
	}
}


/// Converts each date column of each row into one long record; a table
/// of n rows and k date columns yields exactly n*k records.
pub fn to_long(scope: Scope, table: &WideTable) -> Vec<TimeSeriesRecord> {
	let mut result = Vec::with_capacity(table.rows.len() * table.dates.len());
	for row in table.rows.iter() {
		let entity = scope.entity(table, row);
		for (date, value) in table.dates.iter().zip(row.values.iter()) {
			result.push(TimeSeriesRecord{
				entity: entity.clone(),
				date: *date,
				value: *value,
			});
		}
	}
	result
}


/// Reads the per-row `Population` identifier column of the US deaths table.
///
/// Rows with an unparseable population are left out and therefore end up
/// with a null population after the join.
pub fn embedded_population(scope: Scope, table: &WideTable) -> HashMap<GeoEntity, u64> {
	let mut result = HashMap::new();
	for row in table.rows.iter() {
		let population = match row.id(table, "Population").and_then(|v| v.parse::<u64>().ok()) {
			Some(p) => p,
			None => continue,
		};
		result.entry(scope.entity(table, row)).or_insert(population);
	}
	result
}
