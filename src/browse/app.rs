//! Browser state and key handling

use {
    crate::{
        error::ContactError,
        store::{ContactStore, Query},
    },
    anyhow::Context,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    std::mem,
    tracing::debug,
};

/// What the browser is currently asking of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Navigating the contact table
    Normal,
    /// Filling in the New or Edit form
    Form(Form),
    /// Typing the filter; `previous` is restored on Esc
    Filter { input: String, previous: Query },
    /// Waiting for y/n before deleting the named contact
    ConfirmDelete(String),
    About,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    New,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub name: String,
    pub email: String,
    pub field: Field,
}

impl Form {
    pub fn new_contact() -> Self {
        Self {
            kind: FormKind::New,
            name: String::new(),
            email: String::new(),
            field: Field::Name,
        }
    }

    /// The name of an edited contact is fixed, only its email address changes.
    pub fn edit_contact(name: &str, email: &str) -> Self {
        Self {
            kind: FormKind::Edit,
            name: name.to_owned(),
            email: email.to_owned(),
            field: Field::Email,
        }
    }

    /// Why the form cannot be saved right now, if it cannot.
    pub fn problem(&self, store: &ContactStore) -> Option<String> {
        match self.kind {
            FormKind::New if self.name.is_empty() => Some("Enter a name.".to_owned()),
            FormKind::New if store.contains(&self.name) => {
                Some(ContactError::AlreadyExists(self.name.clone()).to_string())
            }
            _ => None,
        }
    }

    fn input(&mut self) -> &mut String {
        match self.field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
        }
    }

    fn switch_field(&mut self) {
        if self.kind == FormKind::New {
            self.field = match self.field {
                Field::Name => Field::Email,
                Field::Email => Field::Name,
            };
        }
    }
}

pub struct App {
    pub store: ContactStore,
    /// Live filter, reapplied after every reload and change
    pub filter: Query,
    /// The contacts passing the filter, ordered by name
    pub rows: Vec<(String, String)>,
    pub selected: usize,
    pub mode: Mode,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: ContactStore) -> Self {
        let mut app = Self {
            store,
            filter: Query::default(),
            rows: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            status: None,
            should_quit: false,
        };
        app.refresh();
        app
    }

    pub fn selected_contact(&self) -> Option<&(String, String)> {
        self.rows.get(self.selected)
    }

    /// Recomputes the visible rows, keeping the selection on the same contact if possible.
    pub fn refresh(&mut self) {
        let current = self.selected_contact().map(|(name, _)| name.clone());
        self.rows = self
            .store
            .search(&self.filter)
            .map(|(name, email)| (name.to_owned(), email.to_owned()))
            .collect();
        match current {
            Some(name) => self.select(&name),
            None => self.clamp_selection(),
        }
    }

    /// Reloads the contacts if another program changed the backing file.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        let reloaded = self
            .store
            .reload_if_changed()
            .context("There was an error while loading your contacts.")?;
        if reloaded {
            self.refresh();
            self.status = Some("Reloaded your contacts.".to_owned());
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(key)?,
            Mode::Form(form) => self.handle_form_key(form, key)?,
            Mode::Filter { input, previous } => self.handle_filter_key(input, previous, key),
            Mode::ConfirmDelete(name) => self.handle_confirm_key(name, key)?,
            Mode::About => {}
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => self.selected = self.rows.len().saturating_sub(1),
            KeyCode::Char('n') => self.mode = Mode::Form(Form::new_contact()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some((name, email)) = self.selected_contact() {
                    self.mode = Mode::Form(Form::edit_contact(name, email));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some((name, _)) = self.selected_contact() {
                    self.mode = Mode::ConfirmDelete(name.clone());
                }
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Filter {
                    input: self.filter.to_string(),
                    previous: self.filter.clone(),
                }
            }
            KeyCode::Char('r') => self.reload()?,
            KeyCode::Char('?') => self.mode = Mode::About,
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, mut form: Form, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Enter => {
                if form.problem(&self.store).is_none() {
                    return self.submit(form);
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.switch_field(),
            KeyCode::Backspace => {
                if form.kind == FormKind::New || form.field == Field::Email {
                    form.input().pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.input().push(c)
            }
            _ => {}
        }
        self.mode = Mode::Form(form);
        Ok(())
    }

    fn submit(&mut self, form: Form) -> anyhow::Result<()> {
        let outcome = match form.kind {
            FormKind::New => self.store.create(&form.name, &form.email),
            FormKind::Edit => self.store.update(&form.name, &form.email),
        };

        match outcome {
            Ok(()) => {
                self.save()?;
                self.status = Some(match form.kind {
                    FormKind::New => format!("{} was created.", form.name),
                    FormKind::Edit => format!("{} was edited.", form.name),
                });
                self.refresh();
                self.select(&form.name);
            }
            Err(error) => self.status = Some(error.to_string()),
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, mut input: String, previous: Query, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter = previous;
                self.refresh();
                return;
            }
            KeyCode::Enter => return,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
        self.filter = Query::parse(&input);
        self.refresh();
        self.mode = Mode::Filter { input, previous };
    }

    fn handle_confirm_key(&mut self, name: String, key: KeyEvent) -> anyhow::Result<()> {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            match self.store.delete(&name) {
                Ok(()) => {
                    self.save()?;
                    self.status = Some(format!("{name} was deleted."));
                }
                Err(error) => self.status = Some(error.to_string()),
            }
            self.refresh();
        }
        Ok(())
    }

    fn save(&mut self) -> anyhow::Result<()> {
        debug!("saving after change in browser");
        self.store
            .save()
            .context("There was an error while saving your contacts.")
    }

    fn select(&mut self, name: &str) {
        match self.rows.iter().position(|(row_name, _)| row_name == name) {
            Some(index) => self.selected = index,
            None => self.clamp_selection(),
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}
