use std::fmt;

use serde::Serialize;

use super::error::Error;


#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coefficient {
	pub estimate: f64,
	pub std_error: f64,
	pub t_value: f64,
	pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
	pub n: usize,
	pub intercept: Coefficient,
	pub slope: Coefficient,
	pub residual_std_error: f64,
	pub df: usize,
	pub r_squared: f64,
	pub adj_r_squared: f64,
	pub f_statistic: f64,
	pub f_p_value: f64,
}

impl FitSummary {
	pub fn predict(&self, x: f64) -> f64 {
		self.intercept.estimate + self.slope.estimate * x
	}
}


/// Fits `y = a + b*x`. Both columns have equal length and no missing values.
pub trait LinearFit {
	fn fit(&self, x: &[f64], y: &[f64]) -> Result<FitSummary, Error>;
}


pub struct OrdinaryLeastSquares;

impl LinearFit for OrdinaryLeastSquares {
	fn fit(&self, x: &[f64], y: &[f64]) -> Result<FitSummary, Error> {
		if x.len() != y.len() {
			return Err(Error::LengthMismatch{x: x.len(), y: y.len()})
		}
		let n = x.len();
		if n < 3 {
			return Err(Error::InsufficientData(n))
		}
		let nf = n as f64;
		let x_mean = x.iter().sum::<f64>() / nf;
		let y_mean = y.iter().sum::<f64>() / nf;

		let mut sxx = 0.;
		let mut sxy = 0.;
		let mut syy = 0.;
		for (xi, yi) in x.iter().zip(y.iter()) {
			let dx = xi - x_mean;
			let dy = yi - y_mean;
			sxx += dx * dx;
			sxy += dx * dy;
			syy += dy * dy;
		}
		if sxx <= 0. {
			return Err(Error::DegenerateInput)
		}

		let b = sxy / sxx;
		let a = y_mean - b * x_mean;
		let sse: f64 = x.iter().zip(y.iter())
			.map(|(xi, yi)| {
				let r = yi - (a + b * xi);
				r * r
			})
			.sum();

		let df = n - 2;
		let dff = df as f64;
		let sigma2 = sse / dff;
		let se_b = (sigma2 / sxx).sqrt();
		let se_a = (sigma2 * (1. / nf + x_mean * x_mean / sxx)).sqrt();

		let r_squared = if syy > 0. { 1. - sse / syy } else { 1. };
		let adj_r_squared = 1. - (1. - r_squared) * (nf - 1.) / dff;
		let f_statistic = (syy - sse) / sigma2;

		let slope = coefficient(b, se_b, dff);
		Ok(FitSummary{
			n,
			intercept: coefficient(a, se_a, dff),
			slope,
			residual_std_error: sigma2.sqrt(),
			df,
			r_squared,
			adj_r_squared,
			f_statistic,
			// with a single predictor F = t^2 and both tests coincide
			f_p_value: slope.p_value,
		})
	}
}

fn coefficient(estimate: f64, std_error: f64, df: f64) -> Coefficient {
	let t_value = estimate / std_error;
	let p_value = if t_value.is_finite() {
		student_t_two_sided(t_value, df)
	} else {
		0.
	};
	Coefficient{
		estimate,
		std_error,
		t_value,
		p_value,
	}
}


/// P(|T| >= |t|) for Student's t with `df` degrees of freedom.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
	let x = df / (df + t * t);
	regularized_incomplete_beta(x, df / 2., 0.5).min(1.).max(0.)
}

fn ln_gamma(x: f64) -> f64 {
	// Lanczos approximation, g = 7
	static COEF: [f64; 9] = [
		0.999_999_999_999_809_9,
		676.520_368_121_885_1,
		-1_259.139_216_722_402_8,
		771.323_428_777_653_1,
		-176.615_029_162_140_6,
		12.507_343_278_686_905,
		-0.138_571_095_265_720_12,
		9.984_369_578_019_572e-6,
		1.505_632_735_149_311_6e-7,
	];
	if x < 0.5 {
		let pi = std::f64::consts::PI;
		return (pi / (pi * x).sin()).ln() - ln_gamma(1. - x)
	}
	let x = x - 1.;
	let mut acc = COEF[0];
	for (i, c) in COEF.iter().enumerate().skip(1) {
		acc += c / (x + i as f64);
	}
	let t = x + 7.5;
	0.5 * (2. * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// I_x(a, b), evaluated through its continued fraction.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
	if x <= 0. {
		return 0.
	}
	if x >= 1. {
		return 1.
	}
	let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1. - x).ln();
	let front = ln_front.exp();
	if x < (a + 1.) / (a + b + 2.) {
		front * beta_continued_fraction(x, a, b) / a
	} else {
		1. - front * beta_continued_fraction(1. - x, b, a) / b
	}
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
	static MAX_ITERATIONS: usize = 300;
	static EPS: f64 = 1e-15;
	static TINY: f64 = 1e-300;

	let qab = a + b;
	let qap = a + 1.;
	let qam = a - 1.;
	let mut c = 1.;
	let mut d = 1. - qab * x / qap;
	if d.abs() < TINY {
		d = TINY;
	}
	d = 1. / d;
	let mut h = d;
	for m in 1..=MAX_ITERATIONS {
		let m = m as f64;
		let m2 = 2. * m;

		let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
		d = 1. + aa * d;
		if d.abs() < TINY {
			d = TINY;
		}
		c = 1. + aa / c;
		if c.abs() < TINY {
			c = TINY;
		}
		d = 1. / d;
		h *= d * c;

		let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
		d = 1. + aa * d;
		if d.abs() < TINY {
			d = TINY;
		}
		c = 1. + aa / c;
		if c.abs() < TINY {
			c = TINY;
		}
		d = 1. / d;
		let del = d * c;
		h *= del;
		if (del - 1.).abs() < EPS {
			break
		}
	}
	h
}


fn format_p(p: f64) -> String {
	if p < 2.2e-16 {
		"<2e-16".into()
	} else {
		format!("{:.3e}", p)
	}
}

impl fmt::Display for FitSummary {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "Coefficients:")?;
		writeln!(f, "{:<12} {:>12} {:>12} {:>10} {:>12}", "", "Estimate", "Std. Error", "t value", "Pr(>|t|)")?;
		for (name, c) in [("(Intercept)", &self.intercept), ("x", &self.slope)].iter() {
			writeln!(f, "{:<12} {:>12.6} {:>12.6} {:>10.3} {:>12}", name, c.estimate, c.std_error, c.t_value, format_p(c.p_value))?;
		}
		writeln!(f)?;
		writeln!(f, "Residual standard error: {:.6} on {} degrees of freedom", self.residual_std_error, self.df)?;
		writeln!(f, "Multiple R-squared: {:.4}, Adjusted R-squared: {:.4}", self.r_squared, self.adj_r_squared)?;
		write!(f, "F-statistic: {:.3} on 1 and {} DF, p-value: {}", self.f_statistic, self.df, format_p(self.f_p_value))
	}
}
