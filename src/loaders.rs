use std::io;

use chrono::NaiveDate;

use serde::Deserialize;

use smartstring::alias::{String as SmartString};

use log::debug;

use super::error::Error;
use super::fetch::Dataset;
use super::progress::{CountMeter, ProgressSink};


/// Header format of the date columns in the wide tables, e.g. `1/22/20`.
pub static DATE_HEADER_FORMAT: &'static str = "%m/%d/%y";

pub static GLOBAL_ID_COLUMNS: &'static [&'static str] = &[
	"Province/State", "Country/Region", "Lat", "Long",
];

pub static US_CASES_ID_COLUMNS: &'static [&'static str] = &[
	"UID", "iso2", "iso3", "code3", "FIPS", "Admin2", "Province_State",
	"Country_Region", "Lat", "Long_", "Combined_Key",
];

pub static US_DEATHS_ID_COLUMNS: &'static [&'static str] = &[
	"UID", "iso2", "iso3", "code3", "FIPS", "Admin2", "Province_State",
	"Country_Region", "Lat", "Long_", "Combined_Key", "Population",
];


/// One entity row of a wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
	pub ids: Vec<SmartString>,
	pub values: Vec<u64>,
}

impl WideRow {
	pub fn id(&self, table: &WideTable, column: &str) -> Option<&str> {
		let index = table.id_index(column)?;
		self.ids.get(index).map(|s| s.as_str())
	}
}

/// A table with fixed identifier columns followed by one column per date.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
	pub dataset: Dataset,
	pub id_columns: Vec<SmartString>,
	pub dates: Vec<NaiveDate>,
	pub rows: Vec<WideRow>,
}

impl WideTable {
	pub fn id_index(&self, column: &str) -> Option<usize> {
		self.id_columns.iter().position(|c| c == column)
	}
}


pub fn parse_date_header(dataset: Dataset, header: &str) -> Result<NaiveDate, Error> {
	NaiveDate::parse_from_str(header.trim(), DATE_HEADER_FORMAT).map_err(|_| Error::MalformedDate{
		dataset,
		header: header.into(),
	})
}

/// Counts upstream are integral but are occasionally published as `12.0`.
fn parse_count(s: &str) -> Option<u64> {
	let s = s.trim();
	if let Ok(v) = s.parse::<u64>() {
		return Some(v)
	}
	let f = s.parse::<f64>().ok()?;
	if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
		Some(f as u64)
	} else {
		None
	}
}

pub fn load_wide_table<R: io::Read, S: ProgressSink + ?Sized>(
		s: &mut S,
		dataset: Dataset,
		id_columns: &[&str],
		r: R,
) -> Result<WideTable, Error> {
	let mut r = csv::Reader::from_reader(r);
	let headers = r.headers()?.clone();
	for (i, expected) in id_columns.iter().enumerate() {
		match headers.get(i) {
			Some(h) if h.trim() == *expected => (),
			_ => return Err(Error::MissingColumn{
				dataset,
				column: (*expected).into(),
			}),
		}
	}
	let mut dates = Vec::with_capacity(headers.len().saturating_sub(id_columns.len()));
	for header in headers.iter().skip(id_columns.len()) {
		dates.push(parse_date_header(dataset, header)?);
	}

	let mut pm = CountMeter::new(s, dataset.file_name(), 1000);
	let mut rows = Vec::new();
	for (i, record) in r.records().enumerate() {
		let record = record?;
		let ids: Vec<SmartString> = record.iter().take(id_columns.len()).map(|v| v.trim().into()).collect();
		let mut values = Vec::with_capacity(dates.len());
		for (j, cell) in record.iter().skip(id_columns.len()).enumerate() {
			match parse_count(cell) {
				Some(v) => values.push(v),
				None => return Err(Error::MalformedCount{
					dataset,
					row: i + 1,
					column: headers.get(id_columns.len() + j).unwrap_or("").into(),
					value: cell.into(),
				}),
			}
		}
		if values.len() != dates.len() {
			return Err(Error::MalformedCount{
				dataset,
				row: i + 1,
				column: String::new(),
				value: format!("{} date values for {} date columns", values.len(), dates.len()),
			})
		}
		rows.push(WideRow{ids, values});
		pm.tick();
	}
	let n = pm.finish();
	debug!("{}: {} rows x {} dates", dataset, n, dates.len());

	Ok(WideTable{
		dataset,
		id_columns: id_columns.iter().map(|c| (*c).into()).collect(),
		dates,
		rows,
	})
}


fn empty_as_none_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
	where D: serde::Deserializer<'de>
{
	let s: Option<String> = Option::deserialize(deserializer)?;
	match s.as_deref().map(str::trim) {
		None | Some("") => Ok(None),
		Some(v) => match parse_count(v) {
			Some(n) => Ok(Some(n)),
			None => Err(serde::de::Error::custom(format!("invalid population {:?}", v))),
		},
	}
}


#[derive(Debug, Clone, Deserialize)]
pub struct LookupRow {
	#[serde(rename = "Province_State", default)]
	pub province: SmartString,
	#[serde(rename = "Country_Region")]
	pub country: SmartString,
	#[serde(rename = "Population", default, deserialize_with = "empty_as_none_u64")]
	pub population: Option<u64>,
}

pub fn load_population_lookup<R: io::Read, S: ProgressSink + ?Sized>(
		s: &mut S,
		r: R,
) -> Result<Vec<LookupRow>, Error> {
	let mut r = csv::Reader::from_reader(r);
	let mut pm = CountMeter::new(s, Dataset::Lookup.file_name(), 1000);
	let mut result = Vec::new();
	for row in r.deserialize() {
		let rec: LookupRow = row?;
		result.push(rec);
		pm.tick();
	}
	pm.finish();
	Ok(result)
}


#[derive(Debug, Clone, Deserialize)]
pub struct VaccinationRow {
	pub date: NaiveDate,
	pub location: SmartString,
	#[serde(default)]
	pub people_fully_vaccinated_per_hundred: Option<f64>,
	#[serde(default)]
	pub total_vaccinations_per_hundred: Option<f64>,
	#[serde(default)]
	pub people_vaccinated_per_hundred: Option<f64>,
	#[serde(default)]
	pub distributed_per_hundred: Option<f64>,
	#[serde(default)]
	pub total_boosters_per_hundred: Option<f64>,
}

pub fn load_vaccinations<R: io::Read, S: ProgressSink + ?Sized>(
		s: &mut S,
		r: R,
) -> Result<Vec<VaccinationRow>, Error> {
	let mut r = csv::Reader::from_reader(r);
	let mut pm = CountMeter::new(s, Dataset::UsVaccinations.file_name(), 1000);
	let mut result = Vec::new();
	for row in r.deserialize() {
		let rec: VaccinationRow = row?;
		result.push(rec);
		pm.tick();
	}
	pm.finish();
	Ok(result)
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::progress::Silent;

	static GLOBAL: &'static str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.9,67.7,0,1,2
Queensland,Australia,-27.4,153.0,3,4,5
";

	#[test]
	fn loads_wide_table() {
		let t = load_wide_table(&mut Silent, Dataset::GlobalCases, GLOBAL_ID_COLUMNS, GLOBAL.as_bytes()).unwrap();
		assert_eq!(t.dates, vec![
			NaiveDate::from_ymd(2020, 1, 22),
			NaiveDate::from_ymd(2020, 1, 23),
			NaiveDate::from_ymd(2020, 1, 24),
		]);
		assert_eq!(t.rows.len(), 2);
		assert_eq!(t.rows[1].id(&t, "Province/State"), Some("Queensland"));
		assert_eq!(t.rows[1].values, vec![3, 4, 5]);
	}

	#[test]
	fn rejects_non_date_header() {
		let body = "Province/State,Country/Region,Lat,Long,1/22/20,total\n,X,0,0,1,2\n";
		match load_wide_table(&mut Silent, Dataset::GlobalCases, GLOBAL_ID_COLUMNS, body.as_bytes()) {
			Err(Error::MalformedDate{header, ..}) => assert_eq!(header, "total"),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn rejects_non_numeric_count() {
		let body = "Province/State,Country/Region,Lat,Long,1/22/20\n,X,0,0,n/a\n";
		match load_wide_table(&mut Silent, Dataset::GlobalCases, GLOBAL_ID_COLUMNS, body.as_bytes()) {
			Err(Error::MalformedCount{row, value, ..}) => {
				assert_eq!(row, 1);
				assert_eq!(value, "n/a");
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn rejects_unexpected_layout() {
		let body = "Country/Region,Province/State,Lat,Long,1/22/20\nX,,0,0,1\n";
		assert!(matches!(
			load_wide_table(&mut Silent, Dataset::GlobalCases, GLOBAL_ID_COLUMNS, body.as_bytes()),
			Err(Error::MissingColumn{..})
		));
	}

	#[test]
	fn loads_lookup_with_missing_population() {
		let body = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population
4,AF,AFG,4,,,,Afghanistan,33.9,67.7,Afghanistan,38928341
10,AQ,ATA,10,,,,Antarctica,-71.9,23.3,Antarctica,
";
		let rows = load_population_lookup(&mut Silent, body.as_bytes()).unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].province.as_str(), "");
		assert_eq!(rows[0].population, Some(38928341));
		assert_eq!(rows[1].population, None);
	}

	#[test]
	fn loads_vaccinations_with_gaps() {
		let body = "\
date,location,total_vaccinations,total_distributed,people_vaccinated,people_fully_vaccinated_per_hundred,total_vaccinations_per_hundred,people_fully_vaccinated,people_vaccinated_per_hundred,distributed_per_hundred,daily_vaccinations_raw,daily_vaccinations,daily_vaccinations_per_million,share_doses_used,total_boosters,total_boosters_per_hundred
2021-01-12,Alabama,78134,377025,70861,0.15,1.59,7270,1.45,7.69,,,,0.207,,
";
		let rows = load_vaccinations(&mut Silent, body.as_bytes()).unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].location.as_str(), "Alabama");
		assert_eq!(rows[0].people_fully_vaccinated_per_hundred, Some(0.15));
		assert_eq!(rows[0].total_boosters_per_hundred, None);
	}
}
