extern crate clap;
extern crate colored;
extern crate rust_baseband;
extern crate serde;
extern crate serde_json;

use clap::{Arg, App};
use colored::*;
use serde::Serialize;
use rust_baseband::code::ca;
use rust_baseband::utils::bools_to_int;

#[derive(Debug, Serialize)]
struct CodeEntry {
	prn: usize,
	g2_delay: usize,
	/// G2 start state as written with SET_CA_CODE
	g2_init: u16,
	/// First ten chips, as tabulated in IS-GPS-200
	first_chips_octal: String,
}

fn entry(prn:usize) -> Option<CodeEntry> {
	let g2_init = ca::g2_init(prn)?;
	let code = ca::prn_code(prn)?;
	let first = bools_to_int::to_u64(&code[..10]).ok()?;
	Some(CodeEntry{ prn, g2_delay: ca::G2_DELAY[prn - 1], g2_init, first_chips_octal: format!("{:04o}", first) })
}

fn main() {

	let matches = App::new("GPS L1 C/A Code Table")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Lists the G2 start states a host writes to select each C/A code")
		.arg(Arg::with_name("prn")
			.short("p").long("prn")
			.help("Only this PRN (1-32)")
			.takes_value(true))
		.arg(Arg::with_name("json")
			.long("json")
			.help("Print JSON instead of a table"))
		.get_matches();

	let prns:Vec<usize> = match matches.value_of("prn").map(|s| s.parse::<usize>()) {
		Some(Ok(prn)) if ca::g2_init(prn).is_some() => vec![prn],
		Some(_) => {
			eprintln!("{}", "PRN must be an integer in 1..=32".red());
			std::process::exit(1);
		},
		None => (1..=32).collect(),
	};

	let entries:Vec<CodeEntry> = prns.into_iter().filter_map(entry).collect();

	if matches.is_present("json") {
		match serde_json::to_string_pretty(&entries) {
			Ok(s) => println!("{}", s),
			Err(_) => eprintln!("{}", "Unable to serialize the table".red()),
		}
	} else {
		println!("{}", "PRN  delay  G2 init  first 10 chips".bold());
		for e in &entries {
			println!("{:3}  {:5}  0x{:03X}    {}", e.prn, e.g2_delay, e.g2_init, e.first_chips_octal.green());
		}
	}

}
