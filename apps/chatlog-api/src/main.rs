use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = chatlog_api::Args::parse();

	chatlog_api::run(args).await
}
