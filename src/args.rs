use {
    anyhow::bail,
    clap::{ArgAction, Parser, Subcommand},
    std::{path::PathBuf, str::FromStr},
};

/// Store your contacts.
///
/// Without a command, lists your contacts sorted by name.
#[derive(Debug, Parser)]
#[command(name = "contacts", version)]
pub struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// The file your contacts are stored in
    #[arg(long = "file", env = "CONTACTS_FILE", global = true, value_name = "PATH")]
    store_path: Option<PathBuf>,
    /// Only list the contacts whose name or email address contains every term
    #[arg(short = 's', long = "search", value_name = "TERMS")]
    search: Vec<String>,
    /// Print diagnostics to STDERR (repeat for more detail)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

impl Args {
    pub fn subcommand(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// The store path given on the command line or in `CONTACTS_FILE`.
    pub fn store_path(&self) -> Option<&PathBuf> {
        self.store_path.as_ref()
    }

    pub fn search(&self) -> &[String] {
        &self.search
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a contact
    New {
        /// The name of the contact
        name: String,
        /// The email address of the contact
        email: String,
    },
    /// Change the email address of a contact
    #[command(alias = "update")]
    Edit {
        /// The name of the contact
        name: String,
        /// The new email address of the contact
        email: String,
    },
    /// Delete contacts by name, by search, or all of them
    Delete {
        /// The names of the contacts to delete
        #[arg(required_unless_present_any = ["search", "all"], conflicts_with = "all")]
        names: Vec<String>,
        /// Delete every contact whose name or email address contains every term
        #[arg(short = 's', long = "search", value_name = "TERMS", conflicts_with = "all")]
        search: Vec<String>,
        /// Delete all contacts
        #[arg(long = "all")]
        all: bool,
    },
    /// Output contacts to STDOUT in the given format (by default vCard)
    Export {
        /// The format of the output (vcard/json)
        #[arg(short = 'f', long = "fmt", default_value = "vcard")]
        format: OutputFormat,
    },
    /// Browse and edit your contacts interactively
    Browse,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Json,
    Vcard,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;
    fn from_str(format: &str) -> anyhow::Result<Self> {
        Ok(match format.to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "vcard" => OutputFormat::Vcard,
            _ => bail!("Invalid output format"),
        })
    }
}
