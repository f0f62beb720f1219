use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use serde::Serialize;

use log::info;

use super::error::Error;
use super::regression::FitSummary;


#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
	/// one bar per label
	Bars(Vec<(String, f64)>),
	/// one line per series label over dates
	Lines(Vec<(String, NaiveDate, f64)>),
	/// labelled points plus an optional fitted line
	Scatter{
		points: Vec<(String, f64, f64)>,
		fit: Option<FitSummary>,
	},
}

impl ChartData {
	pub fn len(&self) -> usize {
		match self {
			Self::Bars(v) => v.len(),
			Self::Lines(v) => v.len(),
			Self::Scatter{points, ..} => points.len(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
	pub name: String,
	pub title: String,
	pub x_label: String,
	pub y_label: String,
	pub data: ChartData,
}


/// Something that turns a chart description into a rendered artifact.
pub trait ChartSink {
	fn render(&mut self, spec: &ChartSpec) -> Result<(), Error>;
}


#[derive(Serialize)]
struct BarRow<'x> {
	label: &'x str,
	value: f64,
}

#[derive(Serialize)]
struct LineRow<'x> {
	series: &'x str,
	date: NaiveDate,
	value: f64,
}

#[derive(Serialize)]
struct ScatterRow<'x> {
	label: &'x str,
	x: f64,
	y: f64,
	fitted: Option<f64>,
}


/// Writes each chart's data as `<dir>/<name>.csv` for an external plotter.
pub struct CsvChartSink {
	dir: PathBuf,
	pub written: Vec<PathBuf>,
}

impl CsvChartSink {
	pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
		Self{
			dir: dir.into(),
			written: Vec::new(),
		}
	}
}

impl ChartSink for CsvChartSink {
	fn render(&mut self, spec: &ChartSpec) -> Result<(), Error> {
		fs::create_dir_all(&self.dir)?;
		let path = self.dir.join(format!("{}.csv", spec.name));
		let mut w = csv::Writer::from_path(&path)?;
		match &spec.data {
			ChartData::Bars(v) => for (label, value) in v.iter() {
				w.serialize(BarRow{label, value: *value})?;
			},
			ChartData::Lines(v) => for (series, date, value) in v.iter() {
				w.serialize(LineRow{series, date: *date, value: *value})?;
			},
			ChartData::Scatter{points, fit} => for (label, x, y) in points.iter() {
				w.serialize(ScatterRow{
					label,
					x: *x,
					y: *y,
					fitted: fit.as_ref().map(|fit| fit.predict(*x)),
				})?;
			},
		}
		w.flush()?;
		info!("chart {:?} ({} points) -> {}", spec.title, spec.data.len(), path.display());
		self.written.push(path);
		Ok(())
	}
}


/// Keeps the specs in memory; used where no rendering is wanted.
#[derive(Debug, Default)]
pub struct CollectingSink {
	pub charts: Vec<ChartSpec>,
}

impl ChartSink for CollectingSink {
	fn render(&mut self, spec: &ChartSpec) -> Result<(), Error> {
		self.charts.push(spec.clone());
		Ok(())
	}
}
