use std::env;
use std::fs;
use std::process;
use getopts::Options;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use grammargens::{parse_transforms, report, run, Config};

fn main() {
  let args = env::args().collect::<Vec<_>>();
  let prog = args[0].clone();
  let mut opts = Options::new();
  opts.optmulti("t", "transform",
    "Rewrite to apply, in the order given. May be repeated.\n\
      Supported: left-recursion, factorize, useless, all",
    "NAME");
  opts.optflag("", "table", "Print the LL(1) table");
  opts.optflag("", "first-follow", "Print NULLABLE, FIRST and FOLLOW sets");
  opts.optopt("o", "output", "Write the resulting grammar to FILE", "FILE");
  opts.optflagmulti("v", "verbose", "Log more (repeat for trace output)");
  opts.optflag("q", "quiet", "Only log errors");
  opts.optflag("h", "help", "Print this message");

  let matches = match opts.parse(&args[1..]) {
    Ok(m) => m,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };

  if matches.opt_present("h") {
    print_usage(prog, opts);
    return;
  }

  let level = if matches.opt_present("q") {
    LevelFilter::Error
  } else {
    match matches.opt_count("v") {
      0 => LevelFilter::Warn,
      1 => LevelFilter::Info,
      2 => LevelFilter::Debug,
      _ => LevelFilter::Trace,
    }
  };

  if let Err(err) = TermLogger::init(
    level,
    ConfigBuilder::new()
      .set_time_format_custom(&[])
      .build(),
    TerminalMode::Stderr,
    ColorChoice::Auto,
  ) {
    eprintln!("{}", err);
  }

  let transforms = match parse_transforms(&matches.opt_strs("t")) {
    Ok(transforms) => transforms,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };

  let path = if matches.free.len() == 1 {
    matches.free[0].clone()
  } else {
    print_usage(prog, opts);
    process::exit(1);
  };

  let input = match fs::read_to_string(&path) {
    Ok(input) => input,
    Err(err) => {
      eprintln!("cannot read {}: {}", path, err);
      process::exit(1);
    }
  };

  let config = Config {
    transforms,
    table: matches.opt_present("table"),
    first_follow: matches.opt_present("first-follow"),
  };

  let output = match run(&input, &config) {
    Ok(output) => output,
    Err(err) => {
      eprint!("{}", report::report_grammar_error(&path, &input, &err));
      process::exit(1);
    }
  };

  print!("{}", output.report);

  let text = output.grammar.to_text();
  match matches.opt_str("o") {
    Some(out) => {
      if let Err(err) = fs::write(&out, text) {
        eprintln!("cannot write {}: {}", out, err);
        process::exit(1);
      }
    }
    None => {
      println!();
      print!("{}", text);
    }
  }
}

fn print_usage(prog: String, opts: Options) {
  let brief = format!("Usage: {} [options] PATH", prog);
  print!("{}", opts.usage(&brief));
}
