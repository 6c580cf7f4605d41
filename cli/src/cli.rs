use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cdnfs")]
#[command(about = "Filesystem-style access to a CDN storage zone", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log span durations on close
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a local file
    Put {
        /// Local file to upload
        local: PathBuf,

        /// Destination path in the zone
        remote: String,

        /// Content type recorded for the upload
        #[arg(long, short = 't')]
        mime_type: Option<String>,
    },
    /// Download an object to stdout or a file
    Get {
        /// Object path in the zone
        remote: String,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Delete an object
    Rm {
        /// Object path in the zone
        remote: String,
    },
    /// Delete a directory and everything below it
    Rmdir {
        /// Directory path in the zone
        remote: String,
    },
    /// Move an object (copy, then delete the source)
    Mv { from: String, to: String },
    /// Copy an object
    Cp { from: String, to: String },
    /// List a directory
    Ls {
        /// Directory to list, the zone root when omitted
        #[arg(default_value = "")]
        dir: String,

        /// Descend into subdirectories
        #[arg(long, short = 'r')]
        recursive: bool,
    },
    /// Show size, type and modification time of an object
    Stat {
        /// Object path in the zone
        remote: String,
    },
    /// Exit with status 0 when the object exists, 1 otherwise
    Exists {
        /// Object path in the zone
        remote: String,
    },
    /// Print the public CDN URL of an object
    Url {
        /// Object path in the zone
        remote: String,
    },
}
