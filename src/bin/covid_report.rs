use std::path::PathBuf;

use covidreport::{
	Config, CsvChartSink, DataSource, DirectorySource, HttpSource, OrdinaryLeastSquares,
};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	covidreport::logging::init();

	let argv: Vec<String> = std::env::args().collect();
	let mut cfg = Config::from_env();
	if let Some(dir) = argv.get(1) {
		cfg.output_dir = PathBuf::from(dir);
	}

	let source: Box<dyn DataSource> = match &cfg.data_dir {
		Some(dir) => {
			println!("reading snapshot from {} ...", dir.display());
			Box::new(DirectorySource::new(dir.clone()))
		},
		None => {
			println!("fetching upstream data ...");
			Box::new(HttpSource::upstream())
		},
	};

	let report = covidreport::pipeline::run(
		&*source,
		&cfg.aliases,
		&OrdinaryLeastSquares,
		&mut *covidreport::default_output(),
	)?;

	println!("writing tables to {} ...", cfg.output_dir.display());
	report.write_tables(&cfg.output_dir)?;

	println!("writing charts ...");
	let mut charts = CsvChartSink::new(cfg.output_dir.join("charts"));
	report.render_charts(&mut charts, cfg.top_n)?;

	match &report.regression {
		Some(fit) => println!("\n{}", fit),
		None => println!("\nno regression fit"),
	}
	Ok(())
}
