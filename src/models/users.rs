use crate::schema::users;
use chrono::NaiveDateTime;
use std::{fmt, str::FromStr};

#[derive(Queryable)]
pub struct UserData {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub is_blocked: bool,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(AsChangeset, Default)]
#[table_name = "users"]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none() && self.photo.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Customer,
    Nutritionist,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Nutritionist, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Nutritionist => "nutritionist",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::error::ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| crate::error::ServiceError::InvalidRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_names_only() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("nutritionist".parse::<Role>().unwrap(), Role::Nutritionist);
        assert!("Admin".parse::<Role>().is_err());
        assert!("doctor".parse::<Role>().is_err());
    }
}
