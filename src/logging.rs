use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;


/// Environment variable holding the filter directives, e.g. `debug` or
/// `covidreport=debug,reqwest=warn`.
pub static LOG_ENV: &'static str = "COVID_LOG";

pub static DEFAULT_FILTER: &'static str = "info";


/// Builds the filter for an optional directive string. Unset or blank
/// means the default filter.
pub fn filter_for(directives: Option<&str>) -> Result<EnvFilter, ParseError> {
	match directives.map(str::trim).filter(|v| !v.is_empty()) {
		Some(v) => EnvFilter::try_new(v),
		None => Ok(EnvFilter::new(DEFAULT_FILTER)),
	}
}

/// Installs a `tracing_subscriber` formatter on stderr. Records emitted
/// through the `log` macros are forwarded to it.
pub fn init() {
	let directives = std::env::var(LOG_ENV).ok();
	let (filter, rejected) = match filter_for(directives.as_deref()) {
		Ok(filter) => (filter, None),
		Err(e) => (EnvFilter::new(DEFAULT_FILTER), Some(e)),
	};
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
	if let Some(e) = rejected {
		log::warn!("{}={:?} is not a valid filter ({}), using {:?}", LOG_ENV, directives.unwrap_or_default(), e, DEFAULT_FILTER);
	}
}
