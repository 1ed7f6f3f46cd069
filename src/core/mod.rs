//! The dispatch engine
//!
//! Contains the command/option/argument model, the three parsing stages
//! (chain resolution, options, positional arguments) and the dispatcher that
//! runs them and invokes handlers.

pub mod argument;
pub mod command;
pub mod dispatcher;
pub mod option;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod token;
pub mod value;

pub use argument::Argument;
pub use command::{Command, Handler, Invocation};
pub use dispatcher::{DispatchOptions, Dispatcher};
pub use option::CommandOption;
pub use output::{
    CollectingSink, CommandOutput, FnSink, OutputSink, Progress, ProgressEntry, ResultKind,
    Status, Table,
};
pub use parser::{parse_arguments, parse_options};
pub use resolver::{ResolvedChain, resolve_chain};
pub use token::{LineSplitter, TokenStream};
pub use value::{Coercion, Value, ValueKind};
