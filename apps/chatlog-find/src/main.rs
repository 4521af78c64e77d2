use clap::Parser;

use chatlog_find::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	chatlog_find::run(args).await
}
