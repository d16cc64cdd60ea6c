mod report;

use chrono::{NaiveDateTime, Utc};
use evtz::{DisplayFormat, EventCalendar, EventOffset, Separator, config};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV_VAR: &str = "EVTZ_LOG";

fn main() {
    init_logger();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut calendar = EventCalendar::new(config.offset);
    if let Some(wall) = config.reference {
        let Some(reference) = calendar.at_wall(wall) else {
            eprintln!("error: --reference {wall} cannot be placed in offset {}", calendar.offset());
            std::process::exit(2);
        };
        calendar.set_reference(Some(reference.datetime().with_timezone(&Utc)));
    }

    let request = report::Request {
        inputs: &config.inputs,
        format: config.format,
        separator: config.separator,
        pattern: config.pattern.as_deref(),
    };
    report::print_report(&calendar, &request, config.color);
}

fn init_logger() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .init();
}

struct CliConfig {
    inputs: Vec<String>,
    offset: EventOffset,
    reference: Option<NaiveDateTime>,
    format: Option<DisplayFormat>,
    separator: Separator,
    pattern: Option<String>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut inputs: Vec<String> = Vec::new();
    let mut offset: Option<EventOffset> = None;
    let mut reference: Option<NaiveDateTime> = None;
    let mut format: Option<DisplayFormat> = None;
    let mut separator = Separator::default();
    let mut pattern: Option<String> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline.clone().or_else(|| args.next()).ok_or_else(|| format!("error: {name} expects a value"))
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("evtz {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--offset" => {
                let raw = value("--offset")?;
                offset = Some(EventOffset::parse(&raw).map_err(|err| format!("error: {err}"))?);
            }
            "--reference" => reference = Some(parse_reference(&value("--reference")?)?),
            "--format" => {
                let raw = value("--format")?;
                format = Some(raw.parse::<DisplayFormat>().map_err(|err| format!("error: {err}"))?);
            }
            "--pattern" => pattern = Some(value("--pattern")?),
            "--separator" => {
                let raw = value("--separator")?;
                separator = Separator::from_symbol(&raw)
                    .ok_or_else(|| format!("error: invalid --separator '{raw}' (expected '-' or '/')"))?;
            }
            "--" => {
                inputs.extend(args.by_ref());
                break;
            }
            _ if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => inputs.push(arg),
        }
    }

    if inputs.is_empty() {
        inputs = read_stdin_inputs()?;
    }
    if inputs.is_empty() {
        return Err(format!("error: no date provided\n\n{}", help_text()));
    }
    if inputs.len() > 2 {
        return Err("error: expected one date or two dates (a range)".to_string());
    }

    let offset = match offset {
        Some(offset) => offset,
        None => config::install_from_env().map_err(|err| format!("error: {err} (or pass --offset)"))?,
    };

    Ok(CliConfig { inputs, offset, reference, format, separator, pattern, color })
}

fn read_stdin_inputs() -> Result<Vec<String>, String> {
    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect())
}

fn parse_reference(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| format!("error: invalid --reference '{value}' (expected YYYY-MM-DDTHH:MM:SS)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    let formats = DisplayFormat::ALL.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ");
    format!(
        "evtz {version}

Render dates relative to a fixed event UTC offset.

Usage:
  evtz [OPTIONS] [--] <date> [<end-date>]
  echo <date> | evtz [OPTIONS]

Dates may be ISO-8601 (with or without an offset), YYYY-MM-DD, or a
serialised day such as 05-03-24 or 5/3/2024.

Options:
  --offset <minutes>         Event UTC offset in minutes east of UTC.
                             Default: ${offset_var}
  --reference <timestamp>    Pin \"now\" to this event wall-clock time
                             (YYYY-MM-DDTHH:MM:SS). Default: system clock.
  --format <name>            Highlight one preset: {formats}.
  --pattern <raw>            Also render with a raw pattern, e.g. \"YYYY-MM-DD HH:mm\".
  --separator <-|/>          Separator for numeric presets. Default: /
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {offset_var}           Event UTC offset when --offset is absent.
  {log_var}                   Log filter (tracing EnvFilter syntax). Default: warn

Exit codes:
  0  Success.
  2  Invalid arguments or configuration.
",
        version = env!("CARGO_PKG_VERSION"),
        offset_var = config::EVENT_UTC_OFFSET_VAR,
        log_var = LOG_ENV_VAR,
    )
}
