use std::{env, process};

use prequal_core::{
    cli::{self, output, Invocation},
    init,
};

#[tokio::main]
async fn main() {
    init();

    let invocation = match Invocation::parse(env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("{}", cli::USAGE);
            process::exit(1);
        }
    };
    output::set_preferences(invocation.output);

    if let Err(err) = cli::execute(invocation.command).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
