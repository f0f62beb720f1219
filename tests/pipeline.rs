use std::fs;

use covidreport::{
	CollectingSink, ChartData, Dataset, Error, MemorySource, OrdinaryLeastSquares, Report,
	Silent, StateAliases,
};


static GLOBAL_CASES: &'static str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,France,46.2,2.2,10,20,30
Reunion,France,-21.1,55.5,1,2,3
,Chile,-35.7,-71.5,5,4,8
Unknown,Chile,0,0,7,7,7
,Atlantis,0,0,1,1,1
";

static GLOBAL_DEATHS: &'static str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,France,46.2,2.2,1,2,3
Reunion,France,-21.1,55.5,0,0,1
,Chile,-35.7,-71.5,0,1,1
Unknown,Chile,0,0,1,1,1
,Atlantis,0,0,0,0,0
";

static LOOKUP: &'static str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population
250,FR,FRA,250,,,,France,46.2,2.2,France,1000
638,RE,REU,638,,,Reunion,France,-21.1,55.5,\"Reunion, France\",100
152,CL,CHL,152,,,,Chile,-35.7,-71.5,Chile,200
";

static US_CASES: &'static str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,1/22/20,1/23/20,1/24/20,1/25/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.5,-86.6,\"Autauga, Alabama, US\",10,12,15,20
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.7,-87.7,\"Baldwin, Alabama, US\",5,6,6,10
84080001,US,USA,840,80001.0,Out of AL,Alabama,US,0,0,\"Out of AL, Alabama, US\",0,0,0,1
84036061,US,USA,840,36061.0,New York,New York,US,40.7,-73.9,\"New York, New York, US\",100,150,140,200
84039049,US,USA,840,39049.0,Franklin,Ohio,US,39.9,-83.0,\"Franklin, Ohio, US\",50,60,70,80
";

static US_DEATHS: &'static str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population,1/22/20,1/23/20,1/24/20,1/25/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.5,-86.6,\"Autauga, Alabama, US\",1000,1,1,2,2
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.7,-87.7,\"Baldwin, Alabama, US\",2000,0,1,1,3
84080001,US,USA,840,80001.0,Out of AL,Alabama,US,0,0,\"Out of AL, Alabama, US\",0,0,0,0,0
84036061,US,USA,840,36061.0,New York,New York,US,40.7,-73.9,\"New York, New York, US\",5000,5,10,12,15
84039049,US,USA,840,39049.0,Franklin,Ohio,US,39.9,-83.0,\"Franklin, Ohio, US\",4000,1,2,2,4
";

static VACCINATIONS: &'static str = "\
date,location,people_fully_vaccinated_per_hundred,total_vaccinations_per_hundred,people_vaccinated_per_hundred,distributed_per_hundred,total_boosters_per_hundred
2021-06-01,Alabama,30.0,60.0,40.0,80.0,
2021-06-02,Alabama,35.0,,45.0,85.0,
2021-06-01,New York State,50.0,100.0,60.0,120.0,
2021-06-02,New York,55.0,110.0,65.0,130.0,5.0
2021-06-01,Ohio,45.0,90.0,50.0,100.0,
2021-06-01,Guam,40.0,80.0,50.0,90.0,
";


fn fixture() -> MemorySource {
	MemorySource::new()
		.with(Dataset::GlobalCases, GLOBAL_CASES)
		.with(Dataset::GlobalDeaths, GLOBAL_DEATHS)
		.with(Dataset::Lookup, LOOKUP)
		.with(Dataset::UsCases, US_CASES)
		.with(Dataset::UsDeaths, US_DEATHS)
		.with(Dataset::UsVaccinations, VACCINATIONS)
}

fn run(source: &MemorySource) -> Result<Report, Error> {
	covidreport::pipeline::run(source, &StateAliases::default(), &OrdinaryLeastSquares, &mut Silent)
}


#[test]
fn global_rates_sum_provinces_and_skip_unknown_population() {
	let report = run(&fixture()).unwrap();
	let labels: Vec<&str> = report.global_cases.iter().map(|r| r.entity.as_str()).collect();
	assert_eq!(labels, vec!["Chile", "France"]);

	let france = &report.global_cases[1];
	assert_eq!(france.population, 1100);
	assert_eq!(france.raw_count, 33);
	assert!((france.rate_per_hundred - 3.0).abs() < 1e-12);

	let france_deaths = report.global_deaths.iter().find(|r| r.entity.as_str() == "France").unwrap();
	assert_eq!(france_deaths.raw_count, 4);

	// the "Unknown" province has no population and must not inflate Chile
	let chile = &report.global_cases[0];
	assert_eq!((chile.population, chile.raw_count), (200, 8));
	let chile_deaths = report.global_deaths.iter().find(|r| r.entity.as_str() == "Chile").unwrap();
	assert_eq!(chile_deaths.raw_count, 1);
}

#[test]
fn us_rates_are_per_state() {
	let report = run(&fixture()).unwrap();
	let deaths: Vec<(&str, u64, u64)> = report.us_deaths.iter()
		.map(|r| (r.entity.as_str(), r.population, r.raw_count))
		.collect();
	assert_eq!(deaths, vec![
		("New York", 5000, 15),
		("Alabama", 3000, 5),
		("Ohio", 4000, 4),
	]);
	for r in report.us_cases.iter().chain(report.us_deaths.iter()) {
		assert!(r.population > 0);
		assert_eq!(r.rate_per_hundred, r.raw_count as f64 / r.population as f64 * 100.0);
	}
}

#[test]
fn daily_deltas_drop_first_day_and_corrections() {
	let report = run(&fixture()).unwrap();
	assert_eq!(report.us_daily.len(), 8);
	assert!(report.us_daily.iter().all(|r| r.date.to_string() != "2020-01-22"));

	let ny: Vec<(String, u64, u64)> = report.us_daily.iter()
		.filter(|r| r.entity.as_str() == "New York")
		.map(|r| (r.date.to_string(), r.new_cases, r.new_deaths))
		.collect();
	assert_eq!(ny, vec![
		("2020-01-23".to_string(), 50, 5),
		("2020-01-25".to_string(), 60, 3),
	]);

	let alabama_last = report.us_daily.iter()
		.filter(|r| r.entity.as_str() == "Alabama")
		.last()
		.unwrap();
	assert_eq!((alabama_last.cases, alabama_last.new_cases, alabama_last.population), (31, 10, 3000));
}

#[test]
fn vaccination_merge_and_regression() {
	let report = run(&fixture()).unwrap();
	let states: Vec<&str> = report.vaccination_deaths.iter().map(|r| r.state.as_str()).collect();
	assert_eq!(states, vec!["Alabama", "New York", "Ohio"]);

	let ny = &report.vaccination_deaths[1];
	assert_eq!(ny.people_fully_vaccinated_per_hundred, Some(55.0));
	assert_eq!(ny.total_boosters_per_hundred, Some(5.0));
	let alabama = &report.vaccination_deaths[0];
	assert_eq!(alabama.total_vaccinations_per_hundred, Some(60.0));

	let fit = report.regression.as_ref().unwrap();
	assert_eq!(fit.n, 3);
	assert_eq!(fit.df, 1);
}

#[test]
fn charts_and_tables_are_produced() {
	let report = run(&fixture()).unwrap();
	let mut sink = CollectingSink::default();
	report.render_charts(&mut sink, 2).unwrap();
	assert_eq!(sink.charts.len(), 7);
	match &sink.charts[0].data {
		ChartData::Bars(v) => assert_eq!(v.len(), 2),
		other => panic!("unexpected chart data {:?}", other),
	}
	match &sink.charts[6].data {
		ChartData::Scatter{points, fit} => {
			assert_eq!(points.len(), 3);
			assert!(fit.is_some());
		},
		other => panic!("unexpected chart data {:?}", other),
	}

	let dir = std::env::temp_dir().join(format!("covidreport-test-{}", std::process::id()));
	let written = report.write_tables(&dir).unwrap();
	assert_eq!(written.len(), 7);
	let daily = fs::read_to_string(dir.join("us_daily_new.csv")).unwrap();
	assert_eq!(daily.lines().count(), 1 + report.us_daily.len());
	assert!(daily.starts_with("entity,date,cases,deaths,population,new_cases,new_deaths"));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_date_header_aborts() {
	let bad = GLOBAL_CASES.replacen("1/24/20", "latest", 1);
	let source = fixture().with(Dataset::GlobalCases, bad);
	assert!(matches!(run(&source), Err(Error::MalformedDate{..})));
}

#[test]
fn missing_dataset_aborts() {
	let source = MemorySource::new()
		.with(Dataset::GlobalCases, GLOBAL_CASES)
		.with(Dataset::GlobalDeaths, GLOBAL_DEATHS);
	assert!(matches!(run(&source), Err(Error::Io(_))));
}
