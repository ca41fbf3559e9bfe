//! JSON representation of the contacts
//!
//! The backing file and the JSON export share one format: a single object whose members map a
//! contact's name to its email address.
//!
//! ```json
//! {
//!   "Alice": "alice@example.com",
//!   "Bob": "bob@example.com"
//! }
//! ```

use {
    std::{
        collections::BTreeMap,
        io::{BufReader, Read, Write},
    },
};

// ========================================================================== //
// =====> serialization <==================================================== //
// ========================================================================== //

/// Writes `contacts` as a pretty-printed JSON object followed by a newline.
pub fn contacts_to_json<W: Write>(
    mut writer: W,
    contacts: &BTreeMap<String, String>,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut writer, contacts)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

// ========================================================================== //
// =====> deserialization <================================================== //
// ========================================================================== //

/// Reads a JSON object of name/email string pairs.
///
/// Anything else (an array, a number, an object with non-string values) is rejected, so a caller
/// never sees a partially parsed contact list.
pub fn contacts_from_json<R: Read>(reader: R) -> serde_json::Result<BTreeMap<String, String>> {
    serde_json::from_reader(BufReader::new(reader))
}
