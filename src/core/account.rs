//! Account business logic - registration, login, profiles and staff accounts.
//!
//! Passwords are stored as Argon2 hashes. Usernames and emails are unique
//! across all accounts, compared without regard to case.

use crate::{
    config::store::AccountSeed,
    entities::{Announcement, Role, User, announcement, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use argon2::password_hash::rand_core::OsRng;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, warn};

/// Shortest accepted password
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Self-service registration form
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Editable profile fields. Empty optional fields are cleared.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Hashes a password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks a password against a stored hash. A malformed hash never verifies.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("Stored password hash could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Normalizes a Philippine phone number to `+63...` form.
///
/// Accepts `+` followed by at least 8 digits, local numbers starting with `0`
/// (10 or more digits), bare 9 or 10 digit numbers, and numbers starting with
/// `63` (11 or more digits). Returns `None` for anything else.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if kept.starts_with('+') {
        let digits: String = kept.chars().filter(char::is_ascii_digit).collect();
        return (digits.len() >= 8).then(|| format!("+{digits}"));
    }

    let digits: String = kept.chars().filter(char::is_ascii_digit).collect();
    if (digits.starts_with('0') && digits.len() >= 10) || digits.len() == 9 || digits.len() == 10 {
        return Some(format!("+63{}", digits.trim_start_matches('0')));
    }
    if digits.starts_with("63") && digits.len() >= 11 {
        return Some(format!("+{digits}"));
    }
    None
}

/// Fails with [`Error::PermissionDenied`] unless `role` is one of `allowed`.
pub fn require_role(role: Role, allowed: &[Role], action: &str) -> Result<()> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            role: role.to_string(),
            action: action.to_string(),
        })
    }
}

fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password != confirm {
        return Err(Error::validation("Passwords do not match"));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the username or email that is already taken by an account other
/// than `exclude_id`.
async fn find_conflict<C>(
    db: &C,
    username: &str,
    email: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let username = username.to_lowercase();
    let email = email.map(str::to_lowercase);

    for account in User::find().all(db).await? {
        if Some(account.id) == exclude_id {
            continue;
        }
        if account.username.to_lowercase() == username {
            return Ok(Some(account.username));
        }
        if let (Some(existing), Some(wanted)) = (account.email.as_deref(), email.as_deref()) {
            if existing.to_lowercase() == wanted {
                return Ok(Some(existing.to_string()));
            }
        }
    }
    Ok(None)
}

async fn insert_account<C>(
    db: &C,
    name: String,
    username: String,
    email: Option<String>,
    password: &str,
    role: Role,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if let Some(value) = find_conflict(db, &username, email.as_deref(), None).await? {
        return Err(Error::DuplicateAccount { value });
    }

    let now = chrono::Utc::now().naive_utc();
    user::ActiveModel {
        name: Set(name),
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        phone: Set(None),
        address: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Registers a customer account.
///
/// # Errors
/// Returns an error if a field is blank, the passwords differ or are too
/// short, or the username or email is already in use.
pub async fn register_customer(
    db: &DatabaseConnection,
    registration: Registration,
) -> Result<user::Model> {
    let name = required(&registration.name, "Name")?;
    let username = required(&registration.username, "Username")?;
    let email = required(&registration.email, "Email")?;
    if !email.contains('@') {
        return Err(Error::validation(format!("Invalid email: {email}")));
    }
    validate_new_password(&registration.password, &registration.confirm_password)?;

    let account = insert_account(
        db,
        name,
        username,
        Some(email),
        &registration.password,
        Role::Customer,
    )
    .await?;

    info!("Registered customer {}", account.username);
    Ok(account)
}

/// Creates a staff or customer account on behalf of an admin.
///
/// Admin accounts come only from seeding; `role` must be cashier or customer.
pub async fn create_account(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
) -> Result<user::Model> {
    let username = required(username, "Username")?;
    if role == Role::Admin {
        return Err(Error::validation("Role must be cashier or customer"));
    }
    validate_new_password(password, password)?;

    let account = insert_account(db, username.clone(), username, None, password, role).await?;
    info!("Created {} account {}", account.role, account.username);
    Ok(account)
}

/// Logs in with a username or email.
///
/// Unknown identifiers, wrong passwords and inactive accounts all yield
/// [`Error::InvalidCredentials`].
pub async fn authenticate(
    db: &DatabaseConnection,
    identifier: &str,
    password: &str,
) -> Result<user::Model> {
    let wanted = identifier.trim().to_lowercase();
    let account = User::find()
        .filter(user::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .find(|account| {
            account.username.to_lowercase() == wanted
                || account
                    .email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase() == wanted)
        })
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(password, &account.password_hash) {
        return Err(Error::InvalidCredentials);
    }
    Ok(account)
}

/// All accounts by username.
pub async fn list_accounts(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_account_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds an account by username, ignoring case.
pub async fn get_account_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    let wanted = username.trim().to_lowercase();
    Ok(list_accounts(db)
        .await?
        .into_iter()
        .find(|account| account.username.to_lowercase() == wanted))
}

async fn require_account<C>(db: &C, id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            username: id.to_string(),
        })
}

/// Admin edit of an account's username and role.
pub async fn update_account(
    db: &DatabaseConnection,
    id: i64,
    username: &str,
    role: Role,
) -> Result<user::Model> {
    let username = required(username, "Username")?;
    if role == Role::Admin {
        return Err(Error::validation("Role must be cashier or customer"));
    }

    let existing = require_account(db, id).await?;
    if existing.role == Role::Admin {
        return Err(Error::validation("Admin accounts cannot be edited here"));
    }
    if let Some(value) = find_conflict(db, &username, None, Some(id)).await? {
        return Err(Error::DuplicateAccount { value });
    }

    let mut active: user::ActiveModel = existing.into();
    active.username = Set(username);
    active.role = Set(role);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(db).await?;

    info!("Updated account {} ({})", updated.username, updated.role);
    Ok(updated)
}

/// Enables or disables logins for an account. Admin accounts stay active.
pub async fn set_active(db: &DatabaseConnection, id: i64, active: bool) -> Result<user::Model> {
    let existing = require_account(db, id).await?;
    if existing.role == Role::Admin && !active {
        return Err(Error::validation("Admin accounts cannot be deactivated"));
    }
    if existing.is_active == active {
        return Ok(existing);
    }

    let mut account: user::ActiveModel = existing.into();
    account.is_active = Set(active);
    account.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = account.update(db).await?;

    info!(
        "Account {} {}",
        updated.username,
        if active { "activated" } else { "deactivated" }
    );
    Ok(updated)
}

/// Updates a user's own profile.
///
/// # Errors
/// Returns an error if name or username is blank, the phone number cannot be
/// normalized, or the username or email belongs to another account.
pub async fn update_profile(
    db: &DatabaseConnection,
    id: i64,
    profile: ProfileUpdate,
) -> Result<user::Model> {
    let name = required(&profile.name, "Name")?;
    let username = required(&profile.username, "Username")?;
    let email = optional(profile.email);
    let phone = match optional(profile.phone) {
        Some(raw) => Some(
            normalize_phone(&raw)
                .ok_or_else(|| Error::validation(format!("Invalid phone number: {raw}")))?,
        ),
        None => None,
    };

    let existing = require_account(db, id).await?;
    if let Some(value) = find_conflict(db, &username, email.as_deref(), Some(id)).await? {
        return Err(Error::DuplicateAccount { value });
    }

    let mut active: user::ActiveModel = existing.into();
    active.name = Set(name);
    active.username = Set(username);
    active.email = Set(email);
    active.phone = Set(phone);
    active.address = Set(optional(profile.address));
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(db).await?;

    info!("Updated profile of {}", updated.username);
    Ok(updated)
}

/// Changes a password after checking the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    id: i64,
    current: &str,
    new_password: &str,
    confirm: &str,
) -> Result<()> {
    let existing = require_account(db, id).await?;
    if !verify_password(current, &existing.password_hash) {
        return Err(Error::InvalidCredentials);
    }
    validate_new_password(new_password, confirm)?;

    let username = existing.username.clone();
    let mut active: user::ActiveModel = existing.into();
    active.password_hash = Set(hash_password(new_password)?);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;

    info!("Password changed for {}", username);
    Ok(())
}

/// Deletes an account. The last admin account cannot be deleted.
///
/// Announcements posted by the account are kept without an author.
pub async fn delete_account(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
    let txn = db.begin().await?;
    let existing = require_account(&txn, id).await?;

    if existing.role == Role::Admin {
        let admins = User::find()
            .filter(user::Column::Role.eq(Role::Admin))
            .count(&txn)
            .await?;
        if admins <= 1 {
            return Err(Error::validation("Cannot delete the last admin account"));
        }
    }

    Announcement::update_many()
        .col_expr(announcement::Column::AuthorId, Expr::value(Option::<i64>::None))
        .filter(announcement::Column::AuthorId.eq(id))
        .exec(&txn)
        .await?;
    User::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!("Deleted account {}", existing.username);
    Ok(existing)
}

/// Creates the configured accounts when no account exists yet.
///
/// Seeds with an unknown role are skipped with a warning. Returns the number
/// of accounts created.
pub async fn seed_default_accounts(db: &DatabaseConnection, seeds: &[AccountSeed]) -> Result<usize> {
    if User::find().count(db).await? > 0 {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut created = 0;
    for seed in seeds {
        let Some(role) = Role::parse(&seed.role) else {
            warn!("Skipping seed account {}: unknown role {}", seed.username, seed.role);
            continue;
        };
        insert_account(
            &txn,
            seed.name.clone(),
            seed.username.clone(),
            seed.email.clone(),
            &seed.password,
            role,
        )
        .await?;
        created += 1;
    }
    txn.commit().await?;

    info!("Seeded {} accounts", created);
    Ok(created)
}
