use clap::Parser;
use tracing_subscriber::EnvFilter;

use crudgen::{catalog, generators, GeneratorConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GeneratorConfig::parse();
    let tables = catalog::tables();
    generators::generate_all(&config, &tables)?;

    println!("✅ Changelog: {}", config.master_file.display());
    println!(
        "✅ Sources: {}/{}",
        config.out_dir.display(),
        config.package.replace('.', "/")
    );
    println!("✅ Collection: {}", config.collection_out.display());
    Ok(())
}
