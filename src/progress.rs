use std::io;
use std::io::Write;
use std::time;


pub trait ProgressSink {
	fn update(&mut self, label: &str, inow: usize);
	fn finish(&mut self, label: &str, inow: usize);
}


/// Rewrites a single status line on stdout.
pub struct TerminalMeter {
	t0: time::Instant,
	tprev: time::Instant,
	iprev: usize,
}

impl TerminalMeter {
	pub fn start() -> Self {
		let now = time::Instant::now();
		Self{
			t0: now,
			tprev: now,
			iprev: 0,
		}
	}
}

impl ProgressSink for TerminalMeter {
	fn update(&mut self, label: &str, inow: usize) {
		let now = time::Instant::now();
		let dt = (now - self.tprev).as_secs_f64();
		let rate = inow.saturating_sub(self.iprev) as f64 / dt;
		print!("{:>40} {:12} rows [{:8.1}/s]\r", label, inow, rate);
		let _ = io::stdout().flush();
		self.iprev = inow;
		self.tprev = now;
	}

	fn finish(&mut self, label: &str, inow: usize) {
		let dt = (time::Instant::now() - self.t0).as_secs_f64();
		let rate = inow as f64 / dt;
		println!("{:>40} {:12} rows [{:8.1}/s]", label, inow, rate);
		self.t0 = time::Instant::now();
		self.tprev = self.t0;
		self.iprev = 0;
	}
}


pub struct Silent;

impl ProgressSink for Silent {
	fn update(&mut self, _label: &str, _inow: usize) {}

	fn finish(&mut self, label: &str, inow: usize) {
		log::debug!("{}: {} rows", label, inow);
	}
}


/// Counts rows and forwards to the sink every `every` rows.
pub struct CountMeter<'s, S: ProgressSink + ?Sized> {
	sink: &'s mut S,
	label: String,
	every: usize,
	n: usize,
}

impl<'s, S: ProgressSink + ?Sized> CountMeter<'s, S> {
	pub fn new(sink: &'s mut S, label: &str, every: usize) -> Self {
		Self{
			sink,
			label: label.into(),
			every: every.max(1),
			n: 0,
		}
	}

	pub fn tick(&mut self) {
		self.n += 1;
		if self.n % self.every == 0 {
			self.sink.update(&self.label, self.n);
		}
	}

	pub fn finish(self) -> usize {
		self.sink.finish(&self.label, self.n);
		self.n
	}
}


pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stdout_isatty() {
		Box::new(TerminalMeter::start())
	} else {
		Box::new(Silent)
	}
}
