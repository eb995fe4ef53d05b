use mysh::{Shell, ShellConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    // Silent unless RUST_LOG is set; logs go to stderr so they never mix
    // with program output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = Shell::new(ShellConfig::from_env()).repl() {
        eprintln!("mysh: {e:#}");
    }
}
