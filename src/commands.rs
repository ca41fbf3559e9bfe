//! Command handlers
//!
//! Every invocation loads the store once, runs one handler against it and saves the store once
//! if the handler changed anything. Handlers print to any writer so they can run against a
//! buffer.

use {
    crate::{
        args::{Command, OutputFormat},
        json,
        store::{ContactStore, Query},
        vcard,
    },
    anyhow::Context,
    chrono::Utc,
    std::io::Write,
};

const NO_CONTACTS: &str = "You do not have any contacts.";
const NO_MATCHES: &str = "None of your contacts match your search.";

/// Runs `command` (or lists the contacts matching `search` without a command) and saves the
/// store if it changed.
///
/// [`Command::Browse`] is not a command line command and is rejected here.
pub fn run<W: Write>(
    command: Option<&Command>,
    search: &[String],
    store: &mut ContactStore,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        None => list(store, &Query::from_terms(search), out)?,
        Some(Command::New { name, email }) => new(store, name, email, out)?,
        Some(Command::Edit { name, email }) => edit(store, name, email, out)?,
        Some(Command::Delete { names, search, all }) => {
            let search = (!search.is_empty()).then(|| Query::from_terms(search));
            delete(store, names, search.as_ref(), *all, out)?
        }
        Some(Command::Export { format }) => export(store, *format, out)?,
        Some(Command::Browse) => anyhow::bail!("The browser needs an interactive terminal"),
    }

    if store.is_dirty() {
        store
            .save()
            .context("There was an error while saving your contacts.")?;
    }
    Ok(())
}

fn list<W: Write>(store: &ContactStore, query: &Query, out: &mut W) -> anyhow::Result<()> {
    if store.is_empty() && query.is_empty() {
        writeln!(out, "{NO_CONTACTS}")?;
        return Ok(());
    }

    let mut shown = 0;
    for (name, email) in store.search(query) {
        writeln!(out, "{name}: {email}")?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(out, "{NO_MATCHES}")?;
    }
    Ok(())
}

fn new<W: Write>(
    store: &mut ContactStore,
    name: &str,
    email: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    match store.create(name, email) {
        Ok(()) => writeln!(out, "{name} was created.")?,
        Err(error) => writeln!(out, "{error}")?,
    }
    Ok(())
}

fn edit<W: Write>(
    store: &mut ContactStore,
    name: &str,
    email: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    match store.update(name, email) {
        Ok(()) => writeln!(out, "{name} was edited.")?,
        Err(error) => writeln!(out, "{error}")?,
    }
    Ok(())
}

/// Deletes the named contacts plus the ones matching `search`, or every contact if `all` is set.
///
/// An empty `search` matches every contact, as it does when listing.
fn delete<W: Write>(
    store: &mut ContactStore,
    names: &[String],
    search: Option<&Query>,
    all: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut selected = names.to_vec();
    if all {
        if store.is_empty() {
            writeln!(out, "{NO_CONTACTS}")?;
            return Ok(());
        }
        selected = store.iter().map(|(name, _)| name.to_owned()).collect();
    } else if let Some(search) = search {
        let matches = store
            .search(search)
            .map(|(name, _)| name.to_owned())
            .filter(|name| !names.contains(name))
            .collect::<Vec<_>>();
        if matches.is_empty() && names.is_empty() {
            writeln!(out, "{NO_MATCHES}")?;
            return Ok(());
        }
        selected.extend(matches);
    }

    for (name, outcome) in store.delete_many(&selected) {
        match outcome {
            Ok(()) => writeln!(out, "{name} was deleted.")?,
            Err(error) => writeln!(out, "{error}")?,
        }
    }
    Ok(())
}

fn export<W: Write>(
    store: &ContactStore,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            json::contacts_to_json(out, store.as_map()).context("Failed to write contacts as JSON")
        }
        OutputFormat::Vcard => vcard::contacts_to_vcard(out, store.iter(), Utc::now()),
    }
}
