use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filterkit")]
#[command(about = "Inspect and build shareable filter query strings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the module schema document (JSON)
    #[arg(short, long, global = true, default_value = "schema.json")]
    pub schema: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a query string into filter values
    #[command(alias = "d")]
    Decode {
        /// The query string (leading '?' optional)
        query: String,
    },

    /// Build a query string from field=value pairs
    #[command(alias = "e")]
    Encode {
        /// field=value pairs; values are JSON, bare text is taken as a string
        #[arg(required = true, num_args = 1..)]
        pairs: Vec<String>,
    },

    /// List declared fields with their current visibility
    #[command(alias = "f")]
    Fields {
        /// Query string supplying the current values
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Manage saved presets (stored beside the schema)
    #[command(alias = "p")]
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// Save a query string under a name
    Save {
        name: String,

        /// Query string to snapshot
        #[arg(short, long)]
        query: String,
    },

    /// List saved presets
    List,

    /// Print the query string of a saved preset
    Load { name: String },

    /// Delete a preset by name
    Delete { name: String },
}
