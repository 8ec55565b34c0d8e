use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{self, Store, ACCOUNT_KEY};

pub const MIN_PASSWORD_LEN: usize = 6;

/// The single admin account, stored under `fyfa-admin-session`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Default, FromForm, Deserialize)]
pub struct AccountForm {
    #[field(default = String::new())]
    pub new_username: String,
    #[field(default = String::new())]
    pub current_password: String,
    #[field(default = String::new())]
    pub new_password: String,
    #[field(default = String::new())]
    pub confirm_password: String,
}

/// The validated outcome of an account form.
#[derive(Debug, PartialEq)]
pub struct AccountChange {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountError {
    NothingToChange,
    PasswordMismatch,
    PasswordTooShort,
}

impl AccountError {
    /// Toast severity used when reporting this rule.
    pub fn severity(&self) -> &'static str {
        match self {
            AccountError::NothingToChange => "warning",
            _ => "error",
        }
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AccountError::NothingToChange => "يرجى إدخال اسم مستخدم جديد أو كلمة سر جديدة",
            AccountError::PasswordMismatch => "كلمة السر الجديدة وتأكيدها غير متطابقتين",
            AccountError::PasswordTooShort => "كلمة السر يجب أن تكون 6 أحرف على الأقل",
        };
        f.write_str(msg)
    }
}

impl AccountForm {
    /// Apply the account rules in order: something must change, the new
    /// password must match its confirmation, and it must be long enough.
    pub fn validate(&self) -> Result<AccountChange, AccountError> {
        let username = self.new_username.trim();
        let password = self.new_password.as_str();

        if username.is_empty() && password.is_empty() {
            return Err(AccountError::NothingToChange);
        }
        if !password.is_empty() && password != self.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort);
        }

        Ok(AccountChange {
            username: (!username.is_empty()).then(|| username.to_string()),
            password: (!password.is_empty()).then(|| password.to_string()),
        })
    }
}

impl Account {
    pub fn load(store: &dyn Store) -> Option<Self> {
        store::read_json(store, ACCOUNT_KEY)
    }

    pub fn save(&self, store: &dyn Store) -> Result<(), String> {
        store::write_json(store, ACCOUNT_KEY, self)
    }

    /// Create the account from configured credentials unless one exists.
    pub fn seed(store: &dyn Store, username: &str, password: &str) -> Result<(), String> {
        if Self::load(store).is_some() {
            return Ok(());
        }
        let account = Account {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };
        account.save(store)?;
        log::info!("Seeded admin account '{}'", username);
        Ok(())
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && verify_password(password, &self.password_hash)
    }

    /// Apply a validated change and persist it.
    pub fn apply(&mut self, change: &AccountChange, store: &dyn Store) -> Result<(), String> {
        if let Some(ref name) = change.username {
            self.username = name.clone();
        }
        if let Some(ref password) = change.password {
            self.password_hash = hash_password(password)?;
        }
        self.save(store)
    }
}

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, HASH_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Friendly name shown in the admin sidebar.
pub fn display_name(username: &str) -> String {
    match username {
        "admin" => "المدير العام".to_string(),
        "fyfa" => "عطارة فيفا".to_string(),
        "manager" => "المدير".to_string(),
        "user" => "المستخدم".to_string(),
        "editor" => "المحرر".to_string(),
        other => other.to_string(),
    }
}
