//! Brewin CLI
//!
//! `brewin <file.br> [--max-depth N]` runs `main()` against stdin/stdout.
//! Set `RUST_LOG=brewin_lang=debug` (or `trace`) to log calls to stderr.

use std::process::ExitCode;

use brewin_lang::{compile, Interpreter, Options, StdIo};

fn print_usage() {
    eprintln!("Usage: brewin <file> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-depth <n>   Fail with a fault once calls nest deeper than n");
    eprintln!("  -h, --help        Show this message");
}

/// Install a stderr subscriber, only when RUST_LOG is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

struct Args {
    path: String,
    options: Options,
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut path = None;
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "--max-depth" => {
                let raw = args.get(i + 1).ok_or("--max-depth needs a value")?;
                let n = raw.parse::<usize>()
                    .map_err(|_| format!("invalid --max-depth value `{raw}`"))?;
                options.max_call_depth = Some(n);
                i += 2;
                continue;
            }
            arg if arg.starts_with('-') => return Err(format!("unknown option `{arg}`")),
            arg if path.is_none() => path = Some(arg.to_string()),
            arg => return Err(format!("unexpected argument `{arg}`")),
        }
        i += 1;
    }

    let path = path.ok_or("missing file path")?;
    Ok(Some(Args { path, options }))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let args = match parse_args(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    init_tracing();

    let source = match std::fs::read_to_string(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read `{}`: {e}", args.path);
            return ExitCode::FAILURE;
        }
    };

    let program = match compile(&source) {
        Ok(p) => p,
        Err(errors) => {
            for e in &errors {
                eprintln!("{}: {e}", args.path);
            }
            return ExitCode::FAILURE;
        }
    };

    let mut io = StdIo;
    match Interpreter::new(&program, &mut io).with_options(args.options).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", args.path);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_path_and_depth() {
        let parsed = parse_args(&args(&["prog.br", "--max-depth", "64"])).unwrap().unwrap();
        assert_eq!(parsed.path, "prog.br");
        assert_eq!(parsed.options.max_call_depth, Some(64));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.br", "--max-depth", "lots"])).is_err());
        assert!(parse_args(&args(&["a.br", "--max-depth"])).is_err());
        assert!(parse_args(&args(&["a.br", "--fast"])).is_err());
        assert!(parse_args(&args(&["a.br", "b.br"])).is_err());
    }
}
