use actix_web::web;
use anyhow::Context;
use chrono::Utc;
use diesel::prelude::*;

use crate::{
    database::get_db_conn,
    error::ServiceError,
    models::{
        user_logins::UserLoginData,
        users::{Role, UserData},
    },
    AppState,
};

/// The account behind a login token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub role: Role,
}

impl Session {
    pub fn require(&self, role: Role) -> Result<(), ServiceError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), ServiceError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

pub async fn get_session_from_token(
    token: String,
    state: &web::Data<AppState>,
) -> anyhow::Result<Session> {
    use crate::schema::{user_logins, users};

    let conn = get_db_conn(state)?;
    let data = web::block(move || {
        user_logins::table
            .inner_join(users::table.on(user_logins::user_id.eq(users::id)))
            .filter(user_logins::token.eq(token))
            .order(user_logins::login_time.desc())
            .limit(1)
            .get_result::<(UserLoginData, UserData)>(&conn)
            .optional()
    })
    .await
    .context("DB error")?;

    let (login, user) = data.ok_or(ServiceError::NotLoggedIn)?;
    let time_diff = Utc::now()
        .naive_utc()
        .signed_duration_since(login.login_time);
    if time_diff.num_seconds() > state.config.session_ttl_secs {
        return Err(ServiceError::SessionExpired.into());
    }
    if user.is_blocked {
        return Err(ServiceError::Blocked.into());
    }

    Ok(Session {
        user_id: user.id,
        role: user.role.parse()?,
    })
}

/// Resolves the token and checks the caller holds `role`.
pub async fn require_role(
    token: String,
    state: &web::Data<AppState>,
    role: Role,
) -> anyhow::Result<Session> {
    let session = get_session_from_token(token, state).await?;
    session.require(role)?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_checks() {
        let session = Session {
            user_id: 1,
            role: Role::Nutritionist,
        };
        assert!(session.require(Role::Nutritionist).is_ok());
        assert_eq!(session.require(Role::Admin), Err(ServiceError::Forbidden));
        assert!(session.require_any(&[Role::Admin, Role::Nutritionist]).is_ok());
        assert_eq!(
            session.require_any(&[Role::Customer]),
            Err(ServiceError::Forbidden)
        );
    }
}
