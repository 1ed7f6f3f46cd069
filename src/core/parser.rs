//! Option and positional-argument parsing
//!
//! Both parsers consume a prefix of the token stream only when they succeed;
//! on error the stream is left untouched.

use crate::{
    core::{
        argument::Argument,
        option::CommandOption,
        token::TokenStream,
        value::{Coercion, ValueKind},
    },
    error::{DispatchError, Result},
};
use tracing::{debug, instrument};

/// How an option token names its option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'t> {
    /// `--name`
    Long(&'t str),
    /// `-short`
    Short(&'t str),
}

impl<'t> Marker<'t> {
    /// Classify a token; anything shorter than two chars or not starting with `-` is not an option
    fn parse(token: &'t str) -> Option<Self> {
        if token.len() < 2 || !token.starts_with('-') {
            return None;
        }
        Some(match token.strip_prefix("--") {
            Some(long) => Self::Long(long),
            None => Self::Short(&token[1..]),
        })
    }

    fn matches(self, option: &CommandOption) -> bool {
        match self {
            Self::Long(name) => option.matches_long(name),
            Self::Short(name) => option.matches_short(name),
        }
    }
}

/// Parse the contiguous block of option tokens at the head of the stream.
///
/// Flags are set on presence; every other kind takes the following token as
/// its value. When several options share a spelling the last one listed wins.
/// Returns the number of tokens consumed.
#[instrument(skip_all, fields(remaining = tokens.len()))]
pub fn parse_options(
    options: &mut [&mut CommandOption],
    tokens: &mut TokenStream,
    coercion: Coercion,
) -> Result<usize> {
    let mut consumed = 0;

    while let Some(token) = tokens.get(consumed) {
        let Some(marker) = Marker::parse(token) else {
            break;
        };

        // Later options belong to deeper commands and shadow their ancestors
        let option = options
            .iter_mut()
            .rev()
            .find(|o| marker.matches(o))
            .ok_or_else(|| DispatchError::option_not_found(token))?;

        if option.kind() == ValueKind::Flag {
            debug!("Option --{} set", option.name);
            option.value_mut().set_flag();
            consumed += 1;
        } else {
            let value = tokens
                .get(consumed + 1)
                .ok_or_else(|| DispatchError::missing_option_value(token))?;
            option.value_mut().parse(value, coercion)?;
            debug!("Option --{} = {}", option.name, option.value());
            consumed += 2;
        }
    }

    tokens.consume(consumed);
    Ok(consumed)
}

/// Parse the remaining stream positionally into `arguments`.
///
/// The stream must hold exactly one token per argument.
#[instrument(skip_all, fields(expected = arguments.len(), found = tokens.len()))]
pub fn parse_arguments(
    arguments: &mut [Argument],
    tokens: &mut TokenStream,
    coercion: Coercion,
) -> Result<()> {
    if tokens.len() != arguments.len() {
        return Err(DispatchError::argument_count_mismatch(
            arguments.len(),
            tokens.len(),
        ));
    }

    for (argument, token) in arguments.iter_mut().zip(tokens.iter()) {
        argument.value_mut().parse(token, coercion)?;
        debug!("Argument <{}> = {}", argument.name, argument.value());
    }

    tokens.consume(arguments.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn options() -> Vec<CommandOption> {
        vec![
            CommandOption::flag("verbose", Some("v"), "Verbose"),
            CommandOption::new("limit", Some("n"), ValueKind::Integer, "Max rows"),
            CommandOption::new("filter", Some("f"), ValueKind::String, "Pattern"),
        ]
    }

    fn run(opts: &mut [CommandOption], tokens: &mut TokenStream) -> Result<usize> {
        let mut refs: Vec<&mut CommandOption> = opts.iter_mut().collect();
        parse_options(&mut refs, tokens, Coercion::Strict)
    }

    #[test]
    fn test_marker_classification() {
        assert_eq!(Marker::parse("--all"), Some(Marker::Long("all")));
        assert_eq!(Marker::parse("-a"), Some(Marker::Short("a")));
        assert_eq!(Marker::parse("-"), None);
        assert_eq!(Marker::parse("alpine"), None);
        assert_eq!(Marker::parse("--"), Some(Marker::Long("")));
    }

    #[test]
    fn test_long_and_short_set_same_value() {
        for spelling in ["--verbose", "-v"] {
            let mut opts = options();
            let mut tokens = TokenStream::new([spelling, "alpine"]);
            assert_eq!(run(&mut opts, &mut tokens).unwrap(), 1);
            assert_eq!(opts[0].value(), &Value::Flag(true));
            assert_eq!(tokens.as_slice(), ["alpine"]);
        }
    }

    #[test]
    fn test_value_options_consume_two() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["-n", "5", "--filter", "alp*", "rest"]);
        assert_eq!(run(&mut opts, &mut tokens).unwrap(), 4);
        assert_eq!(opts[1].value().as_int(), Some(5));
        assert_eq!(opts[2].value().as_str(), Some("alp*"));
        assert_eq!(tokens.as_slice(), ["rest"]);
    }

    #[test]
    fn test_value_token_may_look_like_option() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["--filter", "-v"]);
        run(&mut opts, &mut tokens).unwrap();
        assert_eq!(opts[2].value().as_str(), Some("-v"));
        assert_eq!(opts[0].value(), &Value::Flag(false));
    }

    #[test]
    fn test_unknown_option_consumes_nothing() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["-v", "--bogus"]);
        let err = run(&mut opts, &mut tokens).unwrap_err();
        assert_eq!(err, DispatchError::option_not_found("--bogus"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_missing_value_consumes_nothing() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["--limit"]);
        let err = run(&mut opts, &mut tokens).unwrap_err();
        assert_eq!(err, DispatchError::missing_option_value("--limit"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_options_after_positionals_are_not_parsed() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["alpine", "-v"]);
        assert_eq!(run(&mut opts, &mut tokens).unwrap(), 0);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_short_spelling_does_not_match_long_name() {
        let mut opts = options();
        let mut tokens = TokenStream::new(["-verbose"]);
        assert!(run(&mut opts, &mut tokens).is_err());
    }

    #[test]
    fn test_later_option_shadows_same_spelling() {
        let mut opts = vec![
            CommandOption::new("tag", Some("t"), ValueKind::String, "image"),
            CommandOption::new("tag", Some("t"), ValueKind::String, "build"),
        ];
        let mut tokens = TokenStream::new(["-t", "web:1"]);
        run(&mut opts, &mut tokens).unwrap();
        assert_eq!(opts[0].value().as_str(), Some(""));
        assert_eq!(opts[1].value().as_str(), Some("web:1"));
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let mut opts = options();
        let mut snapshots = Vec::new();
        for _ in 0..2 {
            opts.iter_mut().for_each(CommandOption::reset);
            let mut tokens = TokenStream::new(["-v", "-n", "3"]);
            run(&mut opts, &mut tokens).unwrap();
            snapshots.push(opts.clone());
        }
        assert_eq!(snapshots[0], snapshots[1]);
    }

    #[test]
    fn test_arguments_exact_arity() {
        let mut args = vec![
            Argument::new("name", ValueKind::String, ""),
            Argument::new("count", ValueKind::Integer, ""),
        ];

        let mut tokens = TokenStream::new(["alpine"]);
        let err = parse_arguments(&mut args, &mut tokens, Coercion::Strict).unwrap_err();
        assert_eq!(err, DispatchError::argument_count_mismatch(2, 1));
        assert_eq!(tokens.len(), 1);

        let mut tokens = TokenStream::new(["alpine", "2", "extra"]);
        assert!(parse_arguments(&mut args, &mut tokens, Coercion::Strict).is_err());
        assert_eq!(tokens.len(), 3);

        let mut tokens = TokenStream::new(["alpine", "2"]);
        parse_arguments(&mut args, &mut tokens, Coercion::Strict).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(args[0].value().as_str(), Some("alpine"));
        assert_eq!(args[1].value().as_int(), Some(2));
    }

    #[test]
    fn test_argument_coercion_failure_consumes_nothing() {
        let mut args = vec![Argument::new("count", ValueKind::Integer, "")];
        let mut tokens = TokenStream::new(["many"]);
        assert!(parse_arguments(&mut args, &mut tokens, Coercion::Strict).is_err());
        assert_eq!(tokens.len(), 1);
    }
}
