use bono_types::models::{Application, ApplicationStatus, Role, User};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{KeyValueStore, StorageError, StoreError, UniqueField};

pub const USERS_KEY: &str = "bonoUsers";
pub const APPLICATIONS_KEY: &str = "bonoApplications";

pub const ADMIN_USERNAME: &str = "adrian";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_NAME: &str = "Administrador";
const ADMIN_EMAIL: &str = "admin@bono.gob.do";
const ADMIN_CEDULA: &str = "001-0000000-0";
const ADMIN_PHONE: &str = "809-000-0000";

/// Users and applications, loaded once from a key-value backend and written
/// back whole on every mutation.
///
/// A failed write rolls the in-memory collection back, so what is held here
/// always matches what was last persisted.
pub struct RecordStore<S> {
    storage: S,
    users: Vec<User>,
    applications: Vec<Application>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Load both collections and seed the admin account if it is missing.
    /// Safe to call on every startup.
    pub fn initialize(storage: S) -> Result<Self, StorageError> {
        let users: Vec<User> = load_collection(&storage, USERS_KEY)?;
        let applications: Vec<Application> = load_collection(&storage, APPLICATIONS_KEY)?;

        let mut store = Self {
            storage,
            users,
            applications,
        };
        store.seed_admin()?;

        info!(
            "Record store loaded: {} users, {} applications",
            store.users.len(),
            store.applications.len()
        );
        Ok(store)
    }

    fn seed_admin(&mut self) -> Result<(), StorageError> {
        if self.find_user_by_username(ADMIN_USERNAME).is_some() {
            return Ok(());
        }

        self.users.push(User {
            id: Uuid::new_v4(),
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            role: Role::Admin,
            name: ADMIN_NAME.to_string(),
            first_name: None,
            last_name: None,
            email: ADMIN_EMAIL.to_string(),
            cedula: ADMIN_CEDULA.to_string(),
            phone: ADMIN_PHONE.to_string(),
            created_at: Utc::now(),
        });
        if let Err(e) = self.flush_users() {
            self.users.pop();
            return Err(e);
        }

        info!("Seeded default admin user '{}'", ADMIN_USERNAME);
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // -- Users --

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn find_user_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_by_cedula(&self, cedula: &str) -> Option<&User> {
        self.users.iter().find(|u| u.cedula == cedula)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// The user whose username and plaintext password both match exactly.
    ///
    /// Usernames are not unique, so the password takes part in the lookup.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password);
        debug!("Credential check for '{}': {}", username, user.is_some());
        user
    }

    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        self.authenticate(username, password).is_some()
    }

    pub fn save_user(&mut self, user: User) -> Result<(), StoreError> {
        self.ensure_unique(&user)?;

        self.users.push(user);
        if let Err(e) = self.flush_users() {
            self.users.pop();
            return Err(e.into());
        }
        Ok(())
    }

    // -- Applications --

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn find_application(&self, id: Uuid) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    /// Applications owned by `user_id`, in submission order.
    pub fn applications_for_user(&self, user_id: Uuid) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .collect()
    }

    pub fn save_application(&mut self, application: Application) -> Result<(), StoreError> {
        if self.find_user_by_id(application.user_id).is_none() {
            return Err(StoreError::UserNotFound(application.user_id));
        }

        self.applications.push(application);
        if let Err(e) = self.flush_applications() {
            self.applications.pop();
            return Err(e.into());
        }
        Ok(())
    }

    /// Set a new status and stamp `updated_at`. Returns the updated record.
    pub fn update_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, StoreError> {
        let Some(idx) = self.applications.iter().position(|a| a.id == id) else {
            warn!("Status update for unknown application {}", id);
            return Err(StoreError::ApplicationNotFound(id));
        };

        let app = &mut self.applications[idx];
        let previous = (app.status.clone(), app.updated_at);
        app.status = status;
        app.updated_at = Some(Utc::now());

        if let Err(e) = self.flush_applications() {
            let app = &mut self.applications[idx];
            app.status = previous.0;
            app.updated_at = previous.1;
            return Err(e.into());
        }

        let app = &self.applications[idx];
        info!("Application {} is now {}", app.id, app.status);
        Ok(app.clone())
    }

    // -- Registration --

    /// Append a new user and its first application with a single atomic
    /// write. Uniqueness is checked here as well, so a caller that validated
    /// earlier cannot race another registration into a duplicate.
    pub fn insert_registration(
        &mut self,
        user: User,
        application: Application,
    ) -> Result<(), StoreError> {
        self.ensure_unique(&user)?;
        if application.user_id != user.id {
            return Err(StoreError::UserNotFound(application.user_id));
        }

        self.users.push(user);
        self.applications.push(application);

        let written = encode(USERS_KEY, &self.users).and_then(|users| {
            let applications = encode(APPLICATIONS_KEY, &self.applications)?;
            self.storage
                .set_many(&[(USERS_KEY, users), (APPLICATIONS_KEY, applications)])
        });

        if let Err(e) = written {
            self.users.pop();
            self.applications.pop();
            return Err(e.into());
        }
        Ok(())
    }

    fn ensure_unique(&self, user: &User) -> Result<(), StoreError> {
        if self.find_user_by_email(&user.email).is_some() {
            return Err(StoreError::Duplicate {
                field: UniqueField::Email,
                value: user.email.clone(),
            });
        }
        if self.find_user_by_cedula(&user.cedula).is_some() {
            return Err(StoreError::Duplicate {
                field: UniqueField::Cedula,
                value: user.cedula.clone(),
            });
        }
        Ok(())
    }

    fn flush_users(&self) -> Result<(), StorageError> {
        self.storage.set(USERS_KEY, encode(USERS_KEY, &self.users)?)
    }

    fn flush_applications(&self) -> Result<(), StorageError> {
        self.storage
            .set(APPLICATIONS_KEY, encode(APPLICATIONS_KEY, &self.applications)?)
    }
}

fn load_collection<S, T>(storage: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match storage.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}
