use clap::Parser;
use filevault::cli::{commands, init_logging, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt {
            ref file,
            ref output,
            ref label,
            legacy,
            force,
        } => commands::encrypt::execute(
            file,
            output.as_deref(),
            label.as_deref(),
            legacy,
            force,
        ),
        Commands::Decrypt {
            ref file,
            ref output,
            stdout,
            force,
        } => commands::decrypt::execute(file, output.as_deref(), stdout, force),
        Commands::AddKey {
            ref file,
            ref label,
        } => commands::add_key::execute(file, label.as_deref()),
        Commands::RemoveKey {
            ref file,
            ref slot_id,
            force,
        } => commands::remove_key::execute(file, slot_id, force),
        Commands::ListKeys { ref file } => commands::list_keys::execute(file),
        Commands::RotateKey {
            ref file,
            ref label,
        } => commands::rotate::execute(file, label.as_deref()),
        Commands::Migrate {
            ref file,
            ref label,
        } => commands::migrate::execute(file, label.as_deref()),
        Commands::Info { ref file } => commands::info::execute(file),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
