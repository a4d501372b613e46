use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{User, UserRole};

const SESSION_KEY: &str = "session_user_id";

struct UserRecord {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: UserRole,
    active: bool,
}

impl UserRecord {
    fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            name: self.name.to_string(),
            email: self.email.to_string(),
            role: self.role,
        }
    }
}

// Route gating only; the remote API does not authenticate these accounts.
const USERS: &[UserRecord] = &[
    UserRecord {
        id: "u-01",
        name: "Laura Méndez",
        email: "laura@mueblesmendez.mx",
        password: "taller-2024",
        role: UserRole::Admin,
        active: true,
    },
    UserRecord {
        id: "u-02",
        name: "Carlos Ibarra",
        email: "carlos@mueblesmendez.mx",
        password: "ventas-2024",
        role: UserRole::Seller,
        active: true,
    },
    UserRecord {
        id: "u-03",
        name: "Pedro Salas",
        email: "pedro@mueblesmendez.mx",
        password: "instala-2024",
        role: UserRole::Installer,
        active: true,
    },
    UserRecord {
        id: "u-04",
        name: "Rocío Méndez",
        email: "rocio@mueblesmendez.mx",
        password: "direccion-2024",
        role: UserRole::SuperAdmin,
        active: true,
    },
    UserRecord {
        id: "u-05",
        name: "Marta Ruiz",
        email: "marta@mueblesmendez.mx",
        password: "ventas-2023",
        role: UserRole::Seller,
        active: false,
    },
];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user account is inactive")]
    Inactive,
}

pub struct AuthStore {
    store: Arc<Mutex<Database>>,
    current: Option<User>,
}

impl AuthStore {
    pub fn new(store: Arc<Mutex<Database>>) -> Self {
        AuthStore {
            store,
            current: None,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Re-resolves the persisted user id against the static list, so a user
    /// deactivated since the last session loses the session on startup.
    pub fn restore_session(&mut self) -> Option<User> {
        let id = {
            let store = self.store.lock().ok()?;
            store.get_value(SESSION_KEY).ok().flatten()?
        };

        match USERS.iter().find(|u| u.id == id && u.active) {
            Some(record) => {
                let user = record.to_user();
                self.current = Some(user.clone());
                info!(user = %user.id, "session restored");
                Some(user)
            }
            None => {
                warn!(user = %id, "stored session no longer resolves, clearing it");
                self.clear_session();
                None
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();
        let record = USERS
            .iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        if !record.active {
            return Err(AuthError::Inactive);
        }

        match self.store.lock() {
            Ok(store) => {
                if let Err(err) = store.set_value(SESSION_KEY, record.id) {
                    warn!(error = %err, "session not persisted");
                }
            }
            Err(_) => warn!("local store lock poisoned, session not persisted"),
        }

        let user = record.to_user();
        self.current = Some(user.clone());
        info!(user = %user.id, "login");
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.current = None;
        self.clear_session();
    }

    fn clear_session(&self) {
        if let Ok(store) = self.store.lock() {
            if let Err(err) = store.delete_value(SESSION_KEY) {
                warn!(error = %err, "stored session not cleared");
            }
        }
    }
}
