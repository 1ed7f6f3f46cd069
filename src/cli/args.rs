//! Process-level flags of the `cld` binary
//!
//! Everything after the first positional word is handed to the dispatcher
//! untouched, so command options never collide with these flags.

use clap::Parser;
use std::path::PathBuf;

/// cld - container engine client built on a command-tree dispatcher
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "cld")]
pub struct Args {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Read malformed numbers as their numeric prefix (or zero) instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Dispatch every line of a script file, stopping at the first failure
    #[arg(long, value_name = "FILE", conflicts_with_all = ["interactive", "tokens"])]
    pub script: Option<PathBuf>,

    /// Read command lines from standard input
    #[arg(short = 'i', long, conflicts_with = "tokens")]
    pub interactive: bool,

    /// Prompt printed before each interactive line
    #[arg(long, default_value = "cld> ")]
    pub prompt: String,

    /// Command line to dispatch, e.g. `image pull alpine`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub tokens: Vec<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = Args::try_parse_from(["cld", "image", "ls"]).unwrap();
        assert!(!args.debug);
        assert!(!args.lenient);
        assert_eq!(args.tokens, vec!["image", "ls"]);
    }

    #[test]
    fn test_command_options_pass_through() {
        let args =
            Args::try_parse_from(["cld", "--debug", "image", "ls", "--all", "-n", "2"]).unwrap();
        assert!(args.debug);
        assert_eq!(args.tokens, vec!["image", "ls", "--all", "-n", "2"]);
    }

    #[test]
    fn test_script_conflicts_with_tokens() {
        let result = Args::try_parse_from(["cld", "--script", "run.cld", "image", "ls"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_interactive_defaults() {
        let args = Args::try_parse_from(["cld", "-i"]).unwrap();
        assert!(args.interactive);
        assert_eq!(args.prompt, "cld> ");
        assert!(args.tokens.is_empty());
    }
}
