use std::collections::HashMap;
use std::fmt;
use std::io;
use std::io::Read;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Buf;

use enum_map::{Enum, EnumMap, enum_map};

use log::{debug, info};

use super::error::Error;


static JHU_TIME_SERIES: &'static str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";
static JHU_DATA: &'static str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data";
static OWID_VACCINATIONS: &'static str = "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/vaccinations";


/// The input tables the report is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Dataset {
	GlobalCases,
	GlobalDeaths,
	UsCases,
	UsDeaths,
	Lookup,
	UsVaccinations,
}

impl Dataset {
	pub fn file_name(&self) -> &'static str {
		match self {
			Self::GlobalCases => "time_series_covid19_confirmed_global.csv",
			Self::GlobalDeaths => "time_series_covid19_deaths_global.csv",
			Self::UsCases => "time_series_covid19_confirmed_US.csv",
			Self::UsDeaths => "time_series_covid19_deaths_US.csv",
			Self::Lookup => "UID_ISO_FIPS_LookUp_Table.csv",
			Self::UsVaccinations => "us_state_vaccinations.csv",
		}
	}

	pub fn default_url(&self) -> String {
		let base = match self {
			Self::GlobalCases | Self::GlobalDeaths | Self::UsCases | Self::UsDeaths => JHU_TIME_SERIES,
			Self::Lookup => JHU_DATA,
			Self::UsVaccinations => OWID_VACCINATIONS,
		};
		format!("{}/{}", base, self.file_name())
	}
}

impl fmt::Display for Dataset {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.file_name())
	}
}


/// Where the raw tables come from. Implementations hand out one reader
/// per dataset; the pipeline consumes each reader exactly once.
pub trait DataSource {
	fn open(&self, dataset: Dataset) -> Result<Box<dyn Read>, Error>;
}


pub struct HttpSource {
	client: reqwest::blocking::Client,
	urls: EnumMap<Dataset, String>,
}

impl HttpSource {
	pub fn new(urls: EnumMap<Dataset, String>) -> Self {
		Self{
			client: reqwest::blocking::Client::new(),
			urls,
		}
	}

	pub fn upstream() -> Self {
		Self::new(enum_map!{
			Dataset::GlobalCases => Dataset::GlobalCases.default_url(),
			Dataset::GlobalDeaths => Dataset::GlobalDeaths.default_url(),
			Dataset::UsCases => Dataset::UsCases.default_url(),
			Dataset::UsDeaths => Dataset::UsDeaths.default_url(),
			Dataset::Lookup => Dataset::Lookup.default_url(),
			Dataset::UsVaccinations => Dataset::UsVaccinations.default_url(),
		})
	}
}

impl DataSource for HttpSource {
	fn open(&self, dataset: Dataset) -> Result<Box<dyn Read>, Error> {
		let url = &self.urls[dataset];
		info!("fetching {}", url);
		let resp = self.client.get(url.as_str()).send()?.error_for_status()?;
		let body = resp.bytes()?;
		debug!("fetched {} bytes for {}", body.len(), dataset);
		Ok(Box::new(body.reader()))
	}
}


/// Opens a local file, decompressing on the fly when it ends in `.gz`.
pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	let f = fs::File::open(path)?;
	match path.extension() {
		Some(x) if x == "gz" => Ok(Box::new(flate2::read::GzDecoder::new(f))),
		_ => Ok(Box::new(io::BufReader::new(f))),
	}
}


/// Reads the datasets from a local snapshot directory, using the
/// upstream file names. A gzipped `<name>.gz` is accepted as well.
pub struct DirectorySource {
	dir: PathBuf,
}

impl DirectorySource {
	pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
		Self{dir: dir.into()}
	}
}

impl DataSource for DirectorySource {
	fn open(&self, dataset: Dataset) -> Result<Box<dyn Read>, Error> {
		let plain = self.dir.join(dataset.file_name());
		if plain.exists() {
			debug!("reading {}", plain.display());
			return Ok(magic_open(plain)?)
		}
		let gz = self.dir.join(format!("{}.gz", dataset.file_name()));
		debug!("reading {}", gz.display());
		Ok(magic_open(gz)?)
	}
}


/// Serves fixed CSV text, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	tables: HashMap<Dataset, String>,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with<S: Into<String>>(mut self, dataset: Dataset, body: S) -> Self {
		self.tables.insert(dataset, body.into());
		self
	}
}

impl DataSource for MemorySource {
	fn open(&self, dataset: Dataset) -> Result<Box<dyn Read>, Error> {
		match self.tables.get(&dataset) {
			Some(body) => Ok(Box::new(io::Cursor::new(body.clone().into_bytes()))),
			None => Err(Error::Io(io::Error::new(io::ErrorKind::NotFound, format!("no table for {}", dataset)))),
		}
	}
}
