use clap::Parser;

use rillc_drv::{run, Cli};

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}
