//! Domain types stored in the database.
//!
//! These types represent the persisted user profiles of the lab directory.

use std::collections::BTreeSet;

use labseat_core::UserId;
use serde::{Deserialize, Serialize};

/// A user profile stored in the document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, also the document key.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Contact mail address.
    pub mail: String,
    /// Gender as recorded in the profile.
    pub gender: Gender,
    /// Roles granted to the user.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

/// Gender recorded on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// Role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lab administrator.
    Admin,
    /// Regular staff user.
    User,
    /// Trainee attending a training.
    Student,
}
