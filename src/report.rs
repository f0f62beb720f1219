use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use log::info;

use super::aggregate::RateRecord;
use super::chart::{ChartData, ChartSink, ChartSpec};
use super::delta::DailyDeltaRecord;
use super::error::Error;
use super::regression::FitSummary;
use super::vaccination::VaccinationDeathRecord;


/// Everything the pipeline produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
	pub global_cases: Vec<RateRecord>,
	pub global_deaths: Vec<RateRecord>,
	pub us_cases: Vec<RateRecord>,
	pub us_deaths: Vec<RateRecord>,
	pub us_daily: Vec<DailyDeltaRecord>,
	pub vaccination_deaths: Vec<VaccinationDeathRecord>,
	pub regression: Option<FitSummary>,
}


fn write_table<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf, Error> {
	let path = dir.join(name);
	let mut w = csv::Writer::from_path(&path)?;
	for row in rows.iter() {
		w.serialize(row)?;
	}
	w.flush()?;
	info!("wrote {} rows to {}", rows.len(), path.display());
	Ok(path)
}

impl Report {
	pub fn write_tables<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, Error> {
		let dir = dir.as_ref();
		fs::create_dir_all(dir)?;
		let mut written = vec![
			write_table(dir, "global_cases_per_hundred.csv", &self.global_cases)?,
			write_table(dir, "global_deaths_per_hundred.csv", &self.global_deaths)?,
			write_table(dir, "us_cases_per_hundred.csv", &self.us_cases)?,
			write_table(dir, "us_deaths_per_hundred.csv", &self.us_deaths)?,
			write_table(dir, "us_daily_new.csv", &self.us_daily)?,
			write_table(dir, "us_vaccination_deaths.csv", &self.vaccination_deaths)?,
		];
		let path = dir.join("regression.txt");
		let mut f = fs::File::create(&path)?;
		match &self.regression {
			Some(fit) => {
				writeln!(f, "deaths_per_hundred ~ people_fully_vaccinated_per_hundred ({} states)", fit.n)?;
				writeln!(f)?;
				writeln!(f, "{}", fit)?;
			},
			None => writeln!(f, "not enough states with vaccination data for a fit")?,
		}
		written.push(path);
		Ok(written)
	}

	/// The fixed chart set of the report.
	pub fn charts(&self, top_n: usize) -> Vec<ChartSpec> {
		let bars = |name: &str, title: &str, rows: &[RateRecord]| ChartSpec{
			name: name.into(),
			title: title.into(),
			x_label: "".into(),
			y_label: "per 100 people".into(),
			data: ChartData::Bars(rows.iter().take(top_n).map(|r| (r.entity.to_string(), r.rate_per_hundred)).collect()),
		};
		let mut charts = vec![
			bars("global_cases_per_hundred", "Confirmed cases per hundred, by country", &self.global_cases),
			bars("global_deaths_per_hundred", "Deaths per hundred, by country", &self.global_deaths),
			bars("us_cases_per_hundred", "Confirmed cases per hundred, by US state", &self.us_cases),
			bars("us_deaths_per_hundred", "Deaths per hundred, by US state", &self.us_deaths),
		];

		// only draw daily lines for the states leading the death rate chart
		let shown: BTreeSet<&str> = self.us_deaths.iter().take(top_n).map(|r| r.entity.as_str()).collect();
		let daily = self.us_daily.iter().filter(|r| shown.contains(r.entity.as_str()));
		let (new_cases, new_deaths): (Vec<_>, Vec<_>) = daily
			.map(|r| (
				(r.entity.to_string(), r.date, r.new_cases as f64),
				(r.entity.to_string(), r.date, r.new_deaths as f64),
			))
			.unzip();
		charts.push(ChartSpec{
			name: "us_daily_new_cases".into(),
			title: "Daily new cases, by US state".into(),
			x_label: "date".into(),
			y_label: "new cases".into(),
			data: ChartData::Lines(new_cases),
		});
		charts.push(ChartSpec{
			name: "us_daily_new_deaths".into(),
			title: "Daily new deaths, by US state".into(),
			x_label: "date".into(),
			y_label: "new deaths".into(),
			data: ChartData::Lines(new_deaths),
		});

		let points = self.vaccination_deaths.iter()
			.filter_map(|r| Some((r.state.to_string(), r.people_fully_vaccinated_per_hundred?, r.deaths_per_hundred)))
			.collect();
		charts.push(ChartSpec{
			name: "us_vaccination_vs_deaths".into(),
			title: "Deaths per hundred vs. fully vaccinated per hundred".into(),
			x_label: "people fully vaccinated per hundred".into(),
			y_label: "deaths per hundred".into(),
			data: ChartData::Scatter{
				points,
				fit: self.regression.clone(),
			},
		});
		charts
	}

	pub fn render_charts<S: ChartSink + ?Sized>(&self, sink: &mut S, top_n: usize) -> Result<(), Error> {
		for spec in self.charts(top_n).iter() {
			sink.render(spec)?;
		}
		Ok(())
	}
}
