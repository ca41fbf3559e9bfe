use {
    anyhow::Context,
    clap::Parser,
    contacts::{
        args::{Args, Command},
        browse, commands,
        config::{self, Config},
        logging, ContactStore,
    },
    std::io::{self, Write},
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::resolve(args.store_path().cloned(), config::obtain_config()?);

    if let Some(Command::Browse) = args.subcommand() {
        logging::init_browse_logging(&config, args.verbosity());
        return browse::run(&config);
    }
    logging::init_cli_logging(&config, args.verbosity());

    let mut store = ContactStore::open(&config.store_path)
        .context("There was an error while loading your contacts.")?;

    let mut stdout = io::stdout().lock();
    commands::run(args.subcommand(), args.search(), &mut store, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
