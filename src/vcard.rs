use {
    anyhow::Context,
    chrono::{DateTime, Utc},
    ical_vcard::{Contentline, Identifier, Value},
    std::{io::Write, iter::IntoIterator},
};

/// Writes one vCard 4.0 per contact.
///
/// `revision` is stamped into every card as its `REV` property.
pub fn contacts_to_vcard<'a, C, W>(
    writer: W,
    contacts: C,
    revision: DateTime<Utc>,
) -> anyhow::Result<()>
where
    C: IntoIterator<Item = (&'a str, &'a str)>,
    W: Write,
{
    let revision = revision.format("%Y%m%dT%H%M%SZ").to_string();
    let mut writer = ical_vcard::Writer::new(writer);
    for (name, email) in contacts {
        writer
            .write_all(
                contact_to_contentlines(name, email, &revision)
                    .with_context(|| format!("{name} could not be serialized to vCard"))?,
            )
            .context("Failed to write contacts to vCard")?;
    }
    Ok(())
}

fn contact_to_contentlines(
    name: &str,
    email: &str,
    revision: &str,
) -> anyhow::Result<Vec<Contentline<'static>>> {
    let mut contentlines = vec![
        Contentline {
            group: None,
            name: Identifier::new("BEGIN").expect("valid identifier"),
            params: Vec::new(),
            value: Value::new("VCARD").expect("valid value"),
        },
        Contentline {
            group: None,
            name: Identifier::new("VERSION").expect("valid identifier"),
            params: Vec::new(),
            value: Value::new("4.0").expect("valid value"),
        },
        Contentline {
            group: None,
            name: Identifier::new("FN").expect("valid identifier"),
            params: Vec::new(),
            value: Value::new(escape_text(name)).context(
                "Failed to write name to contentline because it contains control characters",
            )?,
        },
    ];

    if !email.is_empty() {
        contentlines.push(Contentline {
            group: None,
            name: Identifier::new("EMAIL").expect("valid identifier"),
            params: Vec::new(),
            value: Value::new(escape_text(email))
                .context("Failed to write email address to contentline")?,
        });
    }

    contentlines.push(Contentline {
        group: None,
        name: Identifier::new("REV").expect("valid identifier"),
        params: Vec::new(),
        value: Value::new(revision.to_owned()).expect("valid value"),
    });

    contentlines.push(Contentline {
        group: None,
        name: Identifier::new("END").expect("valid identifier"),
        params: Vec::new(),
        value: Value::new("VCARD").expect("valid value"),
    });

    Ok(contentlines)
}

/// Escapes a vCard TEXT value (RFC 6350, section 3.4).
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
