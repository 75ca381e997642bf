use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{ArgEnum, Parser};
use evm_engine::backend::{JournaledHost, MemoryDatabase, PlainHost};
use evm_engine::executor::{ExecutionResult, StackExecutor};
use evm_engine::{Environment, Host, Log, RuntimeConfig};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use primitive_types::{H160, U256};

#[derive(ArgEnum, Clone, Copy, Debug)]
enum HostKind {
	/// Transient state, nothing is reverted.
	Plain,
	/// In-memory database with a journal.
	Journaled,
}

#[derive(Parser, Debug)]
#[clap(name = "evm-cli", version, about = "Run EVM bytecode")]
struct Opts {
	/// Hex-encoded code to run.
	#[clap(long)]
	code: String,
	/// Hex-encoded call data.
	#[clap(long, default_value = "")]
	data: String,
	/// Gas limit of the transaction.
	#[clap(long, default_value_t = 10_000_000)]
	gas_limit: u64,
	/// Treat the code as init code and deploy it.
	#[clap(long)]
	create: bool,
	/// Sender of a create.
	#[clap(long, default_value = "0000000000000000000000000000000000000001")]
	caller: String,
	/// YAML file holding the runtime configuration.
	#[clap(long)]
	config: Option<PathBuf>,
	#[clap(long, arg_enum, default_value = "journaled")]
	host: HostKind,
	/// Console log level.
	#[clap(long, default_value = "info")]
	log_level: LevelFilter,
	/// log4rs YAML configuration, replaces the console logger.
	#[clap(long)]
	log_config: Option<PathBuf>,
}

fn init_logging(level: LevelFilter, file: Option<&Path>) -> Result<()> {
	if let Some(file) = file {
		return log4rs::init_file(file, Default::default())
			.with_context(|| format!("loading log config {}", file.display()));
	}

	let stderr = ConsoleAppender::builder()
		.target(Target::Stderr)
		.encoder(Box::new(PatternEncoder::new(
			"{d(%H:%M:%S%.3f)} {h({l})} {t} - {m}{n}",
		)))
		.build();
	let config = Config::builder()
		.appender(Appender::builder().build("stderr", Box::new(stderr)))
		.build(Root::builder().appender("stderr").build(level))?;
	log4rs::init_config(config)?;
	Ok(())
}

fn load_config(file: Option<&Path>) -> Result<RuntimeConfig> {
	match file {
		Some(file) => {
			let raw = fs::read_to_string(file)
				.with_context(|| format!("reading config {}", file.display()))?;
			serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", file.display()))
		}
		None => Ok(RuntimeConfig::new()),
	}
}

fn decode_hex(name: &str, value: &str) -> Result<Vec<u8>> {
	let value = value.trim().trim_start_matches("0x");
	hex::decode(value).with_context(|| format!("invalid hex in --{}", name))
}

fn run<H: Host>(host: H, config: &RuntimeConfig, opts: &Opts) -> Result<(ExecutionResult, H)> {
	let code = decode_hex("code", &opts.code)?;
	let data = decode_hex("data", &opts.data)?;
	let mut executor = StackExecutor::new(host, config);

	let result = if opts.create {
		let caller = decode_hex("caller", &opts.caller)?;
		if caller.len() != 20 {
			bail!("--caller must be 20 bytes, got {}", caller.len());
		}
		let caller = H160::from_slice(&caller);
		executor.transact_create(caller, U256::zero(), code, opts.gas_limit, None)
	} else {
		executor.execute(code, data, opts.gas_limit)
	}
	.context("execution aborted")?;

	Ok((result, executor.into_host()))
}

fn print_result(result: &ExecutionResult, logs: &[Log]) {
	match &result.exit_reason {
		Ok(reason) => println!("exit: {:?}", reason),
		Err(error) => println!("exit: {}", error),
	}
	println!("output: 0x{}", hex::encode(&result.output));
	println!("gas used: {}", result.gas_used);
	println!("gas refunded: {}", result.gas_refunded);
	if let Some(address) = result.created_address {
		println!("created: {:?}", address);
	}
	for log in logs {
		println!(
			"log {:?} topics {:?} data 0x{}",
			log.address,
			log.topics,
			hex::encode(&log.data)
		);
	}
}

fn main() -> Result<()> {
	let opts = Opts::parse();
	init_logging(opts.log_level, opts.log_config.as_deref())?;
	let config = load_config(opts.config.as_deref())?;

	match opts.host {
		HostKind::Plain => {
			let (result, host) = run(PlainHost::new(Environment::default()), &config, &opts)?;
			print_result(&result, host.logs());
		}
		HostKind::Journaled => {
			let host = JournaledHost::new(Environment::default(), MemoryDatabase::default());
			let (result, mut host) = run(host, &config, &opts)?;
			let logs = host.take_logs();
			host.apply()?;
			print_result(&result, &logs);
		}
	}

	Ok(())
}
