//! `pgtyped` command line: schema files in, DDL and typed table modules out.

mod cli;
mod codegen;
mod config;
mod ddl;
mod describe;
mod generate;
mod init;
mod schema;
mod type_mapper;
mod write;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Gen(args) => generate::run(args),
        cli::Command::Init(args) => init::run(args),
        cli::Command::Describe(args) => describe::run(args),
    }
}
