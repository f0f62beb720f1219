use std::env;
use std::path::PathBuf;

use log::warn;

use super::vaccination::StateAliases;


#[derive(Debug, Clone)]
pub struct Config {
	/// Local snapshot directory; `None` fetches from upstream.
	pub data_dir: Option<PathBuf>,
	pub output_dir: PathBuf,
	pub top_n: usize,
	pub aliases: StateAliases,
}

impl Default for Config {
	fn default() -> Self {
		Self{
			data_dir: None,
			output_dir: "report".into(),
			top_n: 15,
			aliases: StateAliases::default(),
		}
	}
}

/// Parses `alias=canonical;alias=canonical`. Malformed entries are skipped.
pub fn parse_aliases(s: &str) -> StateAliases {
	let pairs: Vec<(&str, &str)> = s.split(';')
		.filter(|item| !item.trim().is_empty())
		.filter_map(|item| match item.split_once('=') {
			Some((alias, canonical)) if !alias.trim().is_empty() && !canonical.trim().is_empty() => Some((alias.trim(), canonical.trim())),
			_ => {
				warn!("ignoring malformed state alias {:?}", item);
				None
			},
		})
		.collect();
	StateAliases::new(pairs)
}

impl Config {
	/// Reads `COVID_DATA_DIR`, `COVID_OUTPUT_DIR`, `COVID_TOP_N` and
	/// `COVID_STATE_ALIASES`, keeping defaults for unset or unparseable
	/// values. `COVID_LOG` is read by `logging::init`.
	pub fn from_env() -> Self {
		Self::from_lookup(|name| env::var(name).ok())
	}

	pub fn from_lookup<F: Fn(&str) -> Option<String>>(f: F) -> Self {
		let mut cfg = Self::default();
		if let Some(dir) = f("COVID_DATA_DIR").filter(|v| !v.is_empty()) {
			cfg.data_dir = Some(dir.into());
		}
		if let Some(dir) = f("COVID_OUTPUT_DIR").filter(|v| !v.is_empty()) {
			cfg.output_dir = dir.into();
		}
		if let Some(v) = f("COVID_TOP_N") {
			match v.trim().parse::<usize>() {
				Ok(n) if n > 0 => cfg.top_n = n,
				_ => warn!("COVID_TOP_N={:?} is not a positive integer, keeping {}", v, cfg.top_n),
			}
		}
		if let Some(v) = f("COVID_STATE_ALIASES") {
			cfg.aliases = parse_aliases(&v);
		}
		cfg
	}
}
