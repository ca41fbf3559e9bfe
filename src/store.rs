//! The contact store
//!
//! A [`ContactStore`] maps contact names to email addresses. It is read from its backing file as
//! a whole and written back as a whole; a missing file is an empty store.
//!
//! Writers are not coordinated. Two processes saving the same file lose updates (the last save
//! wins). [`ContactStore::reload_if_changed`] only decides whether to pick up someone else's
//! save, it does not prevent overwriting it.

use {
    crate::{
        error::{ContactError, StorageError, StorageResult},
        json,
    },
    std::{
        collections::{btree_map::Entry, BTreeMap},
        ffi::OsStr,
        fmt,
        fs::{self, File},
        io::{self, BufWriter},
        path::{Path, PathBuf},
        time::SystemTime,
    },
    tracing::{debug, info},
};

#[derive(Debug)]
pub struct ContactStore {
    path: PathBuf,
    contacts: BTreeMap<String, String>,
    /// Modification time of the backing file as of the last load or save.
    modified: Option<SystemTime>,
    dirty: bool,
}

impl ContactStore {
    /// Loads the store backed by the file at `path`.
    ///
    /// Returns an empty store if the file does not exist. Fails if it exists but cannot be read
    /// or does not hold a contact list.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (contacts, modified) = match read_contacts(&path)? {
            Some(loaded) => loaded,
            None => {
                debug!(path = %path.display(), "no contact file yet, starting empty");
                (BTreeMap::new(), None)
            }
        };

        Ok(Self {
            path,
            contacts,
            modified,
            dirty: false,
        })
    }

    /// Writes every contact to the backing file, replacing its previous content.
    ///
    /// The contacts are written to a temporary file next to the backing file which is then
    /// renamed over it, so readers see either the old or the new list.
    pub fn save(&mut self) -> StorageResult<()> {
        write_contacts(&self.path, &self.contacts)?;
        self.dirty = false;
        self.modified = modified_time(&self.path);
        info!(path = %self.path.display(), count = self.contacts.len(), "saved contacts");
        Ok(())
    }

    /// Reloads the contacts if the backing file was modified since the last load or save.
    ///
    /// Returns whether a reload happened. A backing file that has disappeared is not reloaded.
    /// Unsaved changes are discarded by a reload.
    pub fn reload_if_changed(&mut self) -> StorageResult<bool> {
        let Some(modified) = modified_time(&self.path) else {
            return Ok(false);
        };
        if self.modified == Some(modified) {
            return Ok(false);
        }

        match read_contacts(&self.path)? {
            Some((contacts, modified)) => {
                info!(path = %self.path.display(), count = contacts.len(), "reloaded contacts");
                self.contacts = contacts;
                self.modified = modified;
                self.dirty = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the contacts changed since they were loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contacts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.contacts.get(name).map(String::as_str)
    }

    /// All contacts as `(name, email)`, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contacts
            .iter()
            .map(|(name, email)| (name.as_str(), email.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.contacts
    }

    /// The contacts matching `query`, ordered by name.
    pub fn search<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter()
            .filter(move |(name, email)| query.matches(name, email))
    }

    /// Adds a contact. Never replaces an existing one.
    pub fn create(&mut self, name: &str, email: &str) -> Result<(), ContactError> {
        match self.contacts.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(ContactError::AlreadyExists(name.to_owned())),
            Entry::Vacant(entry) => {
                entry.insert(email.to_owned());
                self.dirty = true;
                debug!(name, "created contact");
                Ok(())
            }
        }
    }

    /// Replaces the email address of an existing contact.
    pub fn update(&mut self, name: &str, email: &str) -> Result<(), ContactError> {
        let current = self
            .contacts
            .get_mut(name)
            .ok_or_else(|| ContactError::NotFound(name.to_owned()))?;
        *current = email.to_owned();
        self.dirty = true;
        debug!(name, "edited contact");
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<(), ContactError> {
        self.contacts
            .remove(name)
            .ok_or_else(|| ContactError::NotFound(name.to_owned()))?;
        self.dirty = true;
        debug!(name, "deleted contact");
        Ok(())
    }

    /// Deletes each of `names`, returning the outcome for every name in order.
    pub fn delete_many<I, S>(&mut self, names: I) -> Vec<(String, Result<(), ContactError>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_owned(), self.delete(name))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        if !self.contacts.is_empty() {
            self.contacts.clear();
            self.dirty = true;
            debug!("deleted all contacts");
        }
    }
}

// ========================================================================== //
// =====> search queries <=================================================== //
// ========================================================================== //

/// A search made of whitespace-separated terms.
///
/// A contact matches if every term occurs in its name or in its email address. Terms are matched
/// case-sensitively and may be satisfied by different fields. A query without terms matches every
/// contact.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    pub fn parse(text: &str) -> Self {
        Self::from_terms([text])
    }

    /// Builds a query from several search strings, each of which may hold several terms.
    pub fn from_terms<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = Vec::new();
        for text in texts {
            terms.extend(text.as_ref().split_whitespace().map(str::to_owned));
        }
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matches(&self, name: &str, email: &str) -> bool {
        self.terms
            .iter()
            .all(|term| name.contains(term.as_str()) || email.contains(term.as_str()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms.join(" "))
    }
}

// ========================================================================== //
// =====> backing file <===================================================== //
// ========================================================================== //

type Loaded = (BTreeMap<String, String>, Option<SystemTime>);

/// Reads the backing file, or returns [`None`] if there is none.
fn read_contacts(path: &Path) -> StorageResult<Option<Loaded>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(StorageError::reading(error, path.to_owned())),
    };
    let modified = file.metadata().and_then(|metadata| metadata.modified()).ok();

    let contacts = json::contacts_from_json(file).map_err(|source| {
        if source.is_io() {
            StorageError::reading(io::Error::from(source), path.to_owned())
        } else {
            StorageError::Parse {
                path: path.to_owned(),
                source,
            }
        }
    })?;

    debug!(path = %path.display(), count = contacts.len(), "loaded contacts");
    Ok(Some((contacts, modified)))
}

fn write_contacts(path: &Path, contacts: &BTreeMap<String, String>) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_owned(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);
    if let Err(error) = write_temp_file(&temp_path, contacts) {
        let _ = fs::remove_file(&temp_path);
        return Err(error);
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StorageError::Rename {
            from: temp_path.clone(),
            to: path.to_owned(),
            source,
        }
    })
}

fn write_temp_file(temp_path: &Path, contacts: &BTreeMap<String, String>) -> StorageResult<()> {
    let fail = |source: io::Error| StorageError::writing(source, temp_path.to_owned());

    let mut writer = BufWriter::new(File::create(temp_path).map_err(fail)?);
    json::contacts_to_json(&mut writer, contacts).map_err(|error| fail(error.into()))?;
    let file = writer
        .into_inner()
        .map_err(|error| fail(error.into_error()))?;
    file.sync_all().map_err(fail)
}

/// `.contacts` is written through `.contacts.tmp` in the same directory.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new("contacts"))
        .to_os_string();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::{collections::BTreeSet, time::Duration},
        tempfile::TempDir,
    };

    fn store_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join(".contacts")
    }

    fn store_with(temp_dir: &TempDir, contacts: &[(&str, &str)]) -> ContactStore {
        let mut store = ContactStore::open(store_path(temp_dir)).unwrap();
        for (name, email) in contacts {
            store.create(name, email).unwrap();
        }
        store
    }

    fn names<'a>(matches: impl Iterator<Item = (&'a str, &'a str)>) -> BTreeSet<&'a str> {
        matches.map(|(name, _)| name).collect()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = ContactStore::open(store_path(&temp_dir)).unwrap();

        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert!(!store_path(&temp_dir).exists());
    }

    #[test]
    fn test_create_new_contact() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ContactStore::open(store_path(&temp_dir)).unwrap();

        assert_eq!(store.create("Alice", "a@x.com"), Ok(()));
        assert_eq!(store.get("Alice"), Some("a@x.com"));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_create_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com")]);

        assert_eq!(
            store.create("Alice", "b@y.com"),
            Err(ContactError::AlreadyExists("Alice".to_owned()))
        );
        assert_eq!(store.get("Alice"), Some("a@x.com"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_and_delete_absent_contact() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com")]);
        store.save().unwrap();

        let not_found = Err(ContactError::NotFound("Bob".to_owned()));
        assert_eq!(store.update("Bob", "b@x.com"), not_found);
        assert_eq!(store.delete("Bob"), not_found);
        assert!(!store.is_dirty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_existing_contact() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com")]);

        store.update("Alice", "alice@y.com").unwrap();

        assert_eq!(store.get("Alice"), Some("alice@y.com"));
    }

    #[test]
    fn test_delete_many_collects_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com"), ("Bob", "b@x.com")]);

        let outcomes = store.delete_many(["Alice", "Carol"]);

        assert_eq!(
            outcomes,
            vec![
                ("Alice".to_owned(), Ok(())),
                (
                    "Carol".to_owned(),
                    Err(ContactError::NotFound("Carol".to_owned()))
                ),
            ]
        );
        assert!(!store.contains("Alice"));
        assert!(store.contains("Bob"));
    }

    #[test]
    fn test_clear_only_dirties_non_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ContactStore::open(store_path(&temp_dir)).unwrap();
        store.clear();
        assert!(!store.is_dirty());

        store.create("Alice", "a@x.com").unwrap();
        store.save().unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(
            &temp_dir,
            &[("Alice", "a@x.com"), ("Bob", "b@x.com"), ("Zoë", "")],
        );
        store.save().unwrap();
        assert!(!store.is_dirty());

        let reloaded = ContactStore::open(store_path(&temp_dir)).unwrap();
        assert_eq!(reloaded.as_map(), store.as_map());

        let again = ContactStore::open(store_path(&temp_dir)).unwrap();
        assert_eq!(again.as_map(), reloaded.as_map());
    }

    #[test]
    fn test_save_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ContactStore::open(store_path(&temp_dir)).unwrap();
        store.save().unwrap();

        assert_eq!(fs::read_to_string(store_path(&temp_dir)).unwrap(), "{}\n");
        assert!(ContactStore::open(store_path(&temp_dir)).unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_whole_file_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(store_path(&temp_dir), r#"{"Old": "o@x.com"}"#).unwrap();

        let mut store = ContactStore::open(store_path(&temp_dir)).unwrap();
        store.delete("Old").unwrap();
        store.create("New", "n@x.com").unwrap();
        store.save().unwrap();

        let saved = json::contacts_from_json(File::open(store_path(&temp_dir)).unwrap()).unwrap();
        assert_eq!(saved, BTreeMap::from([("New".to_owned(), "n@x.com".to_owned())]));
        assert!(!temp_dir.path().join(".contacts.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("contacts.json");
        let mut store = ContactStore::open(&path).unwrap();
        store.create("Alice", "a@x.com").unwrap();

        store.save().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(store_path(&temp_dir), "not json").unwrap();

        let err = ContactStore::open(store_path(&temp_dir)).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn test_unreadable_path_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(store_path(&temp_dir)).unwrap();

        let err = ContactStore::open(store_path(&temp_dir)).unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_on_load() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = store_path(&temp_dir);
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&path).is_ok() {
            // Permission bits do not apply to this user (e.g. root).
            return;
        }

        let err = ContactStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::PermissionDenied { .. }));
    }

    #[test]
    fn test_search_scenarios() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, &[("Alice", "a@x.com"), ("Bob", "b@x.com")]);

        let query = Query::parse("x.com");
        assert_eq!(names(store.search(&query)), BTreeSet::from(["Alice", "Bob"]));
        let query = Query::parse("Alice");
        assert_eq!(names(store.search(&query)), BTreeSet::from(["Alice"]));
        let query = Query::parse("zzz");
        assert!(names(store.search(&query)).is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, &[("Alice", "a@x.com"), ("Bob", "b@x.com")]);

        for query in [Query::default(), Query::parse(""), Query::parse("  \t ")] {
            assert!(query.is_empty());
            assert_eq!(store.search(&query).count(), 2);
        }
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let query = Query::parse("alice");
        assert!(!query.matches("Alice", "a@x.com"));
        assert!(query.matches("Alice", "alice@x.com"));
    }

    #[test]
    fn test_terms_may_match_different_fields() {
        let query = Query::from_terms(["Alice", "y.org"]);
        assert!(query.matches("Alice", "a@y.org"));
        assert!(!query.matches("Alice", "a@x.com"));
        assert!(!query.matches("Bob", "b@y.org"));

        let query = Query::parse("Ali ce");
        assert_eq!(query.terms(), ["Ali", "ce"]);
        assert!(query.matches("Alice", ""));
        assert_eq!(query.to_string(), "Ali ce");
    }

    #[test]
    fn test_reload_only_when_modified() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com")]);
        store.save().unwrap();
        assert!(!store.reload_if_changed().unwrap());

        let mut other = ContactStore::open(store_path(&temp_dir)).unwrap();
        other.create("Bob", "b@x.com").unwrap();
        other.save().unwrap();
        File::options()
            .write(true)
            .open(store_path(&temp_dir))
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        assert!(store.reload_if_changed().unwrap());
        assert!(store.contains("Bob"));
        assert!(!store.reload_if_changed().unwrap());
    }

    #[test]
    fn test_no_reload_after_file_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("Alice", "a@x.com")]);
        store.save().unwrap();
        fs::remove_file(store_path(&temp_dir)).unwrap();

        assert!(!store.reload_if_changed().unwrap());
        assert!(store.contains("Alice"));
    }

    #[test]
    fn test_temp_path_keeps_dotfile_name() {
        assert_eq!(
            temp_path_for(Path::new("/home/me/.contacts")),
            PathBuf::from("/home/me/.contacts.tmp")
        );
        assert_eq!(
            temp_path_for(Path::new("contacts.json")),
            PathBuf::from("contacts.json.tmp")
        );
    }
}
