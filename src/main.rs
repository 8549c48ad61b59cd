use chrono::NaiveDateTime;
use sinotime::{TimeNormalizer, clean, format_base, parse_base};
use std::io::{self, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut normalizer = match TimeNormalizer::new() {
        Ok(normalizer) => normalizer.with_prefer_future(config.prefer_future),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let base = config.base.unwrap_or_else(|| chrono::Local::now().naive_local());
    let cleaned = clean(&config.input);
    let units = normalizer.parse_with_base(&config.input, base);

    println!("base:  {}", format_base(base));
    println!("input: {cleaned}");
    if units.is_empty() {
        println!("(no temporal expressions)");
        return;
    }
    for unit in units {
        let marker = if unit.is_range_connector { "  (range end)" } else { "" };
        println!("[{:>3}..{:<3}) {:<16} => {}{marker}", unit.start, unit.end, unit.text, format_base(unit.time));
    }
}

struct CliConfig {
    input: String,
    base: Option<NaiveDateTime>,
    prefer_future: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut base: Option<NaiveDateTime> = None;
    let mut prefer_future = true;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("sinotime {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--past" => prefer_future = false,
            "--base" => {
                let value = args.next().ok_or_else(|| "error: --base expects a value".to_string())?;
                base = Some(parse_base_arg(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--base=") => {
                let value = arg.trim_start_matches("--base=");
                base = Some(parse_base_arg(value)?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, base, prefer_future })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_base_arg(value: &str) -> Result<NaiveDateTime, String> {
    parse_base(value).map_err(|_| format!("error: invalid --base '{value}' (expected YYYY-MM-DD-HH-mm-ss)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "sinotime {version}

Chinese temporal expression normalizer CLI.

Usage:
  sinotime [OPTIONS] [--] <input...>
  sinotime [OPTIONS] --input <text>

Options:
  -i, --input <text>   Input text to parse. If omitted, reads remaining args
                       or stdin when no args are provided.
  --base <timestamp>   Base time in YYYY-MM-DD-HH-mm-ss.
                       Default: the current local time.
  --past               Prefer the past side when an expression is ambiguous.
  -h, --help           Show this help message.
  -V, --version        Print version information.

Exit codes:
  0  Success.
  1  Internal error (grammar failed to compile).
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
