/// Logger setup.
///
/// A thin layer over `env_logger`: a verbosity flag, a `RUST_LOG` override
/// and an optional log file for when the terminal is taken.

use std::fs::File;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, debug messages are printed; otherwise only info
/// and above.  `RUST_LOG` overrides both.  Output goes to `file` when given
/// (the terminal host owns the screen), to stderr otherwise.
pub fn init(verbose: bool, file: Option<File>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    if let Some(file) = file {
        builder.target(Target::Pipe(Box::new(file)));
    }

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
}
