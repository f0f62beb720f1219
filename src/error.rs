use std::fmt;
use std::io;

use super::fetch::Dataset;


#[derive(Debug)]
pub enum Error {
	Io(io::Error),
	Csv(csv::Error),
	Fetch(reqwest::Error),
	MissingColumn{
		dataset: Dataset,
		column: String,
	},
	MalformedDate{
		dataset: Dataset,
		header: String,
	},
	MalformedCount{
		dataset: Dataset,
		row: usize,
		column: String,
		value: String,
	},
	InsufficientData(usize),
	DegenerateInput,
	LengthMismatch{
		x: usize,
		y: usize,
	},
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::Fetch(e) => fmt::Display::fmt(e, f),
			Self::MissingColumn{dataset, column} => write!(f, "{}: expected column {:?}", dataset, column),
			Self::MalformedDate{dataset, header} => write!(f, "{}: column header {:?} is not a m/d/yy date", dataset, header),
			Self::MalformedCount{dataset, row, column, value} => write!(f, "{}: row {} column {:?}: {:?} is not a count", dataset, row, column, value),
			Self::InsufficientData(n) => write!(f, "need at least 3 complete observations for a fit, got {}", n),
			Self::DegenerateInput => f.write_str("predictor has zero variance"),
			Self::LengthMismatch{x, y} => write!(f, "{} predictor values for {} responses", x, y),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Csv(e) => Some(e),
			Self::Fetch(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(other: io::Error) -> Self {
		Self::Io(other)
	}
}

impl From<csv::Error> for Error {
	fn from(other: csv::Error) -> Self {
		Self::Csv(other)
	}
}

impl From<reqwest::Error> for Error {
	fn from(other: reqwest::Error) -> Self {
		Self::Fetch(other)
	}
}
