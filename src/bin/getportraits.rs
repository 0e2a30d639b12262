// Copyright © 2016, Peter Atashian
use congress_portraits::{batch, Config, Error, Mediawiki};
use std::{
    env::args,
    io::{stderr, stdout},
    path::Path,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(stderr)
        .init();
    let config = match args().nth(1) {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let mw = Mediawiki::new(config)?;
    batch::run(&mw, Path::new("."), &mut stdout().lock())?;
    Ok(())
}
