use clap::{ArgAction, Parser, Subcommand};
use filterz::model::{FilterId, Relation};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filterz", bin_name = "filterz", version)]
#[command(about = "Build AND/OR filter trees and exchange them as JSON Logic", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding config.json and state.json
    #[arg(long, global = true, env = "FILTERZ_DIR", default_value = ".filterz")]
    pub dir: PathBuf,

    /// Verbose output (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory with a sample schema
    Init,

    /// Print the filter tree (default)
    #[command(alias = "ls")]
    Show,

    /// Add a filter to a group
    #[command(alias = "a")]
    Add {
        /// Group to add to
        #[arg(short, long, default_value = "root")]
        group: String,

        #[command(flatten)]
        fields: FilterFields,
    },

    /// Create a group inside another group
    #[command(alias = "g")]
    Group {
        /// Parent group
        #[arg(short, long, default_value = "root")]
        parent: String,

        /// Join the new group's items with OR instead of AND
        #[arg(long)]
        or: bool,
    },

    /// Change a filter's type, predicate or value
    Set {
        /// Filter id
        id: FilterId,

        #[command(flatten)]
        fields: FilterFields,
    },

    /// Remove a filter
    Rm {
        /// Filter id
        id: FilterId,
    },

    /// Remove a group and everything inside it
    Rmgroup {
        /// Group id (e.g. group-2)
        group: String,
    },

    /// Flip a group between AND and OR
    Toggle {
        /// Group id (`root` accepted)
        #[arg(default_value = "root")]
        group: String,
    },

    /// Export the tree as a JSON Logic document
    Export {
        /// Write to a file instead of stdout (defaults to the configured document name)
        #[arg(short, long, num_args = 0..=1)]
        output: Option<Option<PathBuf>>,

        /// Copy to the system clipboard
        #[arg(short, long)]
        clipboard: bool,
    },

    /// Replace the tree with one read from a JSON Logic document
    Import {
        /// Document to read (stdin when piped, else the configured document name)
        path: Option<PathBuf>,

        /// Read from the system clipboard
        #[arg(short, long, conflicts_with = "path")]
        clipboard: bool,
    },

    /// Remove every filter and group
    Reset,

    /// List the fields filters can use
    Schema {
        /// Replace the schema with the JSON array in this file
        #[arg(long, value_name = "PATH")]
        load: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct FilterFields {
    /// Schema field to compare
    #[arg(short = 't', long = "type")]
    pub filter_type: Option<String>,

    /// Relation: < <= > >= == !=
    #[arg(short, long)]
    pub predicate: Option<Relation>,

    /// Value to compare against
    #[arg(short, long = "ref", allow_hyphen_values = true)]
    pub ref_value: Option<String>,
}
