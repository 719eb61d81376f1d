use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "pgtyped.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Gen,
    Init,
    Describe,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Gen(GenArgs),
    Init(InitArgs),
    Describe(ConfigArgs),
}

#[derive(Debug, Clone)]
pub struct GenArgs {
    pub config: PathBuf,
    pub dry_run: bool,
    pub check: bool,
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigArgs {
    pub config: PathBuf,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first {
        "-h" | "--help" | "help" => Ok(Command::Help(match it.next() {
            None => HelpTopic::Root,
            Some("gen") => HelpTopic::Gen,
            Some("init") => HelpTopic::Init,
            Some("describe") => HelpTopic::Describe,
            Some(other) => anyhow::bail!("unknown command: {other}"),
        })),
        "gen" => parse_gen(it),
        "init" => Ok(match parse_config_only(it, HelpTopic::Init)? {
            Ok(config) => Command::Init(InitArgs { config }),
            Err(topic) => Command::Help(topic),
        }),
        "describe" => Ok(match parse_config_only(it, HelpTopic::Describe)? {
            Ok(config) => Command::Describe(ConfigArgs { config }),
            Err(topic) => Command::Help(topic),
        }),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_gen<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut dry_run = false;
    let mut check = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Gen)),
            "--dry-run" => dry_run = true,
            "--check" => check = true,
            _ => {
                if let Some(v) = config_flag(token, &mut it)? {
                    config = v;
                } else {
                    anyhow::bail!("unknown argument: {token}");
                }
            }
        }
    }

    if dry_run && check {
        anyhow::bail!("--dry-run and --check cannot be combined");
    }

    Ok(Command::Gen(GenArgs {
        config,
        dry_run,
        check,
    }))
}

/// Commands taking only `--config`. `Err(topic)` asks for help.
fn parse_config_only<'a>(
    mut it: impl Iterator<Item = &'a str>,
    topic: HelpTopic,
) -> anyhow::Result<Result<PathBuf, HelpTopic>> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Err(topic));
        }
        match config_flag(token, &mut it)? {
            Some(v) => config = v,
            None => anyhow::bail!("unknown argument: {token}"),
        }
    }
    Ok(Ok(config))
}

fn config_flag<'a>(
    token: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<PathBuf>> {
    if token == "--config" {
        let Some(v) = it.next() else {
            anyhow::bail!("--config requires a value");
        };
        return Ok(Some(PathBuf::from(v)));
    }
    Ok(token.strip_prefix("--config=").map(PathBuf::from))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pgtyped - typed PostgreSQL table code generator

USAGE:
  pgtyped <COMMAND> [OPTIONS]

COMMANDS:
  gen           Generate DDL and Rust table modules from schema files
  init          Write a template config and example schema
  describe      Print each table's columns, types and operators
  help          Print help for a command

Run `pgtyped <command> --help` for more."
            );
        }
        HelpTopic::Gen => {
            println!(
                "\
USAGE:
  pgtyped gen [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: pgtyped.toml)
  --dry-run             Print files that would change
  --check               Exit non-zero if output would change
  -h, --help            Print help"
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  pgtyped init [OPTIONS]

Writes the config file and schema/example.toml next to it.
Existing files are never overwritten.

OPTIONS:
  --config <FILE>       Config file path (default: pgtyped.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Describe => {
            println!(
                "\
USAGE:
  pgtyped describe [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: pgtyped.toml)
  -h, --help            Print help"
            );
        }
    }
}
