use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = orgdex_api::Args::parse();

	orgdex_api::run(args).await
}
