use std::collections::{BTreeMap, HashMap};

use secrecy::{ExposeSecret, Secret};

use crate::domain::{UserEmail, UserEntity, UserName};

const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Email,
    FirstName,
    LastName,
    Password,
    ConfPassword,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 5] = [
        RegistrationField::Email,
        RegistrationField::FirstName,
        RegistrationField::LastName,
        RegistrationField::Password,
        RegistrationField::ConfPassword,
    ];

    /// Name of the field in the submitted form body.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationField::Email => "email",
            RegistrationField::FirstName => "firstName",
            RegistrationField::LastName => "lastName",
            RegistrationField::Password => "password",
            RegistrationField::ConfPassword => "conf_password",
        }
    }

    fn is_secret(&self) -> bool {
        matches!(self, RegistrationField::Password | RegistrationField::ConfPassword)
    }
}

/// The registration form, bound to a submitted body.
///
/// Serializes to `{ values, errors }` for the template: `values` holds what
/// the user typed (passwords excluded) and `errors` one list per field.
/// `get_data` only yields a user after `is_valid` returned `true`.
#[derive(Debug, serde::Serialize)]
pub struct RegistrationForm {
    values: BTreeMap<&'static str, String>,
    errors: BTreeMap<&'static str, Vec<String>>,
    #[serde(skip)]
    password: Option<Secret<String>>,
    #[serde(skip)]
    conf_password: Option<Secret<String>>,
    #[serde(skip)]
    data: Option<UserEntity>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        let values = RegistrationField::ALL
            .iter()
            .filter(|field| !field.is_secret())
            .map(|field| (field.as_str(), String::new()))
            .collect();
        let errors = RegistrationField::ALL
            .iter()
            .map(|field| (field.as_str(), Vec::new()))
            .collect();
        Self {
            values,
            errors,
            password: None,
            conf_password: None,
            data: None,
        }
    }

    pub fn set_data(&mut self, mut data: HashMap<String, String>) {
        *self = Self::new();
        for field in RegistrationField::ALL {
            let value = data.remove(field.as_str());
            match field {
                RegistrationField::Password => self.password = value.map(Secret::new),
                RegistrationField::ConfPassword => self.conf_password = value.map(Secret::new),
                _ => {
                    self.values.insert(field.as_str(), value.unwrap_or_default());
                }
            }
        }
    }

    pub fn is_valid(&mut self) -> bool {
        self.data = None;
        for messages in self.errors.values_mut() {
            messages.clear();
        }

        let email = match UserEmail::parse(self.value(RegistrationField::Email)) {
            Ok(email) => Some(email),
            Err(_) => {
                self.add_error(RegistrationField::Email, "Please enter a valid email address.");
                None
            }
        };
        let first_name = match UserName::parse(self.value(RegistrationField::FirstName)) {
            Ok(name) => Some(name),
            Err(_) => {
                self.add_error(RegistrationField::FirstName, "Please enter a valid first name.");
                None
            }
        };
        let last_name = match UserName::parse(self.value(RegistrationField::LastName)) {
            Ok(name) => Some(name),
            Err(_) => {
                self.add_error(RegistrationField::LastName, "Please enter a valid last name.");
                None
            }
        };

        let password = self.password.clone();
        match &password {
            None => self.add_error(RegistrationField::Password, "Please choose a password."),
            Some(p) if p.expose_secret().is_empty() => {
                self.add_error(RegistrationField::Password, "Please choose a password.")
            }
            Some(p) if p.expose_secret().chars().count() > MAX_PASSWORD_LENGTH => self.add_error(
                RegistrationField::Password,
                "Passwords must be at most 128 characters long.",
            ),
            Some(_) => {}
        }

        let conf_password = self.conf_password.clone();
        let passwords_match = match (&password, &conf_password) {
            (Some(p), Some(c)) => p.expose_secret() == c.expose_secret(),
            _ => false,
        };
        if !passwords_match {
            self.add_error(RegistrationField::ConfPassword, "Passwords do not match.");
        }

        if self.has_errors() {
            return false;
        }
        if let (Some(email), Some(first_name), Some(last_name), Some(password), Some(conf_password)) =
            (email, first_name, last_name, password, conf_password)
        {
            self.data = Some(UserEntity::new(email, first_name, last_name, password, conf_password));
        }
        self.data.is_some()
    }

    pub fn get_data(&self) -> Option<UserEntity> {
        self.data.clone()
    }

    pub fn add_error(&mut self, field: RegistrationField, message: impl Into<String>) {
        self.errors
            .entry(field.as_str())
            .or_default()
            .push(message.into());
        self.data = None;
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|messages| !messages.is_empty())
    }

    pub fn errors(&self, field: RegistrationField) -> &[String] {
        self.errors
            .get(field.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn value(&self, field: RegistrationField) -> String {
        self.values.get(field.as_str()).cloned().unwrap_or_default()
    }
}
