use std::fmt;

use smartstring::alias::{String as SmartString};

use serde::Serialize;


/// Hierarchical geographic identifier.
///
/// Global rows carry `(province?, country)`, US rows carry
/// `(county?, state, country)`; the state lives in `province`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeoEntity {
	pub country: SmartString,
	pub province: Option<SmartString>,
	pub county: Option<SmartString>,
}

fn non_empty(s: &str) -> Option<SmartString> {
	let s = s.trim();
	if s.is_empty() {
		None
	} else {
		Some(s.into())
	}
}

impl GeoEntity {
	pub fn country(country: &str) -> Self {
		Self{
			country: country.trim().into(),
			province: None,
			county: None,
		}
	}

	pub fn global(province: &str, country: &str) -> Self {
		Self{
			country: country.trim().into(),
			province: non_empty(province),
			county: None,
		}
	}

	pub fn us(county: &str, state: &str, country: &str) -> Self {
		Self{
			country: country.trim().into(),
			province: non_empty(state),
			county: non_empty(county),
		}
	}

	/// The same entity with the county component removed.
	pub fn state_level(&self) -> Self {
		Self{
			country: self.country.clone(),
			province: self.province.clone(),
			county: None,
		}
	}

	/// Key used against the population lookup table.
	pub fn lookup_key(&self) -> (Option<SmartString>, SmartString) {
		(self.province.clone(), self.country.clone())
	}

	/// Most specific name available (county, then province, then country).
	pub fn label(&self) -> &str {
		self.county.as_deref()
			.or(self.province.as_deref())
			.unwrap_or(&self.country)
	}

	pub fn combined_key(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for GeoEntity {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		let parts = [self.county.as_deref(), self.province.as_deref(), Some(&self.country[..])];
		let mut first = true;
		for part in parts.iter().filter_map(|p| *p).filter(|p| !p.is_empty()) {
			if !first {
				f.write_str(", ")?;
			}
			f.write_str(part)?;
			first = false;
		}
		Ok(())
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
	Cases,
	Deaths,
}

impl fmt::Display for Metric {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Cases => f.write_str("cases"),
			Self::Deaths => f.write_str("deaths"),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn combined_key_with_province() {
		let e = GeoEntity::global("Queensland", "Australia");
		assert_eq!(e.combined_key(), "Queensland, Australia");
	}

	#[test]
	fn combined_key_suppresses_empty_components() {
		let e = GeoEntity::global("  ", "Germany");
		assert_eq!(e.province, None);
		assert_eq!(e.combined_key(), "Germany");
	}

	#[test]
	fn us_entity_label_and_state_level() {
		let e = GeoEntity::us("Autauga", "Alabama", "US");
		assert_eq!(e.label(), "Autauga");
		assert_eq!(e.combined_key(), "Autauga, Alabama, US");
		let s = e.state_level();
		assert_eq!(s.label(), "Alabama");
		assert_eq!(s.combined_key(), "Alabama, US");
	}

	#[test]
	fn metric_names() {
		assert_eq!(Metric::Cases.to_string(), "cases");
		assert_eq!(format!("US {} per hundred", Metric::Deaths), "US deaths per hundred");
	}
}
