//! # cld dispatch
//!
//! An embeddable command-line dispatch engine. A tree of named commands, each
//! carrying typed options and positional arguments, is matched against a raw
//! token stream; the options and arguments are parsed with type coercion and
//! the registered handlers are invoked with the parsed values.
//!
//! ## Features
//!
//! - Command chains with short names (`image pull` / `img pl`)
//! - Options aggregated across the whole chain, `--long` and `-short` spellings
//! - Exact-arity positional arguments on the leaf command
//! - Strict or lenient numeric coercion
//! - Streaming handler output through success/error callbacks
//!
//! ## Example
//!
//! ```
//! use cld_dispatch::core::{
//!     Argument, CollectingSink, Command, Dispatcher, Status, TokenStream, ValueKind,
//! };
//!
//! let mut dispatcher: Dispatcher<()> = Dispatcher::default();
//! dispatcher.register(
//!     Command::new("image", Some("img"), "Image commands").subcommand(
//!         Command::new("pull", Some("pl"), "Pull an image")
//!             .argument(Argument::new("image name", ValueKind::String, "Image to pull"))
//!             .handler(|_, inv, _| {
//!                 assert_eq!(inv.arg_str(0), Some("alpine"));
//!                 Status::Success
//!             }),
//!     ),
//! )?;
//!
//! let mut sink = CollectingSink::new();
//! let mut tokens = TokenStream::new(["img", "pl", "alpine"]);
//! assert_eq!(dispatcher.execute(&mut (), &mut tokens, &mut sink), Status::Success);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
