mod requests;
mod responses;
pub mod session;

use crate::{
    database::get_db_conn,
    error::ServiceError,
    models::{
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    protocol::SimpleResponse,
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;

use self::{requests::*, responses::*, session::get_session_from_token};

const MIN_PASSWORD_LEN: usize = 6;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(modify_password);
}

crate::post_funcs! {
    (register, "/register", RegisterRequest, SimpleResponse),
    (login, "/login", LoginRequest, LoginResponse),
    (logout, "/logout", LogoutRequest, SimpleResponse),
    (modify_password, "/modify_password", ModifyPasswordRequest, SimpleResponse),
}

fn assert_password_str(password: &str) -> anyhow::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    Ok(())
}

/// Role requested at sign-up. Admin accounts are only granted by another admin.
fn registration_role(role: Option<&str>) -> anyhow::Result<Role> {
    let role = match role {
        None | Some("") => Role::Customer,
        Some(role) => role.parse::<Role>()?,
    };
    if role == Role::Admin {
        bail!(ServiceError::Forbidden);
    }
    Ok(role)
}

async fn register_impl(
    state: web::Data<AppState>,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let name = info.name.trim().to_string();
    let email = info.email.trim().to_lowercase();
    if name.is_empty() {
        bail!("Name is required");
    }
    crate::utils::assert_email_str(&email)?;
    assert_password_str(&info.password)?;
    let role = registration_role(info.role.as_deref())?;

    let conn = get_db_conn(&state)?;
    web::block(move || {
        conn.transaction(|| {
            let res = users::table
                .filter(users::email.eq(&email))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res > 0 {
                bail!("Email already registered");
            }

            let data = NewUser {
                name,
                password: crate::utils::hash_password(&info.password)?,
                email,
                role: role.as_str().to_string(),
            };
            diesel::insert_into(users::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(role = role.as_str(), "user registered");
    Ok(SimpleResponse::ok())
}

async fn login_impl(
    state: web::Data<AppState>,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    use crate::schema::{user_logins, users};

    let info = info.into_inner();
    let email = info.email.trim().to_lowercase();

    let conn = get_db_conn(&state)?;
    let (login_token, user) = web::block(move || {
        conn.transaction(|| {
            let user = users::table
                .filter(users::email.eq(&email))
                .get_result::<UserData>(&conn)
                .optional()
                .context("DB error")?;
            let user = match user {
                Some(user) => user,
                None => bail!("Invalid email or password"),
            };
            if !crate::utils::verify_password(&info.password, &user.password) {
                bail!("Invalid email or password");
            }
            if user.is_blocked {
                bail!(ServiceError::Blocked);
            }

            let login_time = Utc::now().naive_utc();
            let login_token = crate::utils::generate_login_token(user.id, &user.role, &login_time);
            let token_data = UserLoginData {
                token: login_token.clone(),
                user_id: user.id,
                login_time,
            };
            diesel::insert_into(user_logins::table)
                .values(token_data)
                .execute(&conn)
                .context("DB error")?;

            Ok((login_token, user))
        })
    })
    .await?;

    tracing::info!(user_id = user.id, role = user.role.as_str(), "user logged in");
    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    })
}

async fn logout_impl(
    state: web::Data<AppState>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::user_logins;

    let info = info.into_inner();
    let conn = get_db_conn(&state)?;
    web::block(move || {
        diesel::delete(user_logins::table.filter(user_logins::token.eq(info.login_token)))
            .execute(&conn)
    })
    .await
    .context("DB error")?;

    Ok(SimpleResponse::ok())
}

async fn modify_password_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    assert_password_str(&info.password_new)?;
    let session = get_session_from_token(info.login_token.clone(), &state).await?;
    let user_id = session.user_id;

    let conn = get_db_conn(&state)?;
    web::block(move || {
        conn.transaction(|| {
            let user = users::table
                .filter(users::id.eq(user_id))
                .get_result::<UserData>(&conn)
                .context("DB error")?;
            if !crate::utils::verify_password(&info.password_old, &user.password) {
                bail!("Wrong password");
            }

            let hashed_password_new = crate::utils::hash_password(&info.password_new)?;
            diesel::update(users::table.filter(users::id.eq(user_id)))
                .set(users::password.eq(&hashed_password_new))
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[test]
    fn sign_up_roles() {
        assert_eq!(registration_role(None).unwrap(), Role::Customer);
        assert_eq!(registration_role(Some("")).unwrap(), Role::Customer);
        assert_eq!(
            registration_role(Some("nutritionist")).unwrap(),
            Role::Nutritionist
        );

        let err = registration_role(Some("admin")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ServiceError>(),
            Some(&ServiceError::Forbidden)
        );
        assert!(registration_role(Some("doctor")).is_err());
    }

    #[actix_rt::test]
    async fn register_rejects_bad_email_before_touching_db() {
        let mut app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&json!({
                "name": "Rina",
                "email": "not-an-email",
                "password": "secret123",
            }))
            .to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["err"], json!("Invalid email format"));
    }

    #[actix_rt::test]
    async fn register_rejects_short_password() {
        let mut app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&json!({
                "name": "Rina",
                "email": "rina@example.com",
                "password": "123",
            }))
            .to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["err"], json!("Password must be at least 6 characters"));
    }

    #[actix_rt::test]
    async fn malformed_body_is_a_client_error() {
        let mut app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(&json!({ "email": "rina@example.com" }))
            .to_request();
        let resp = test::call_service(&mut app, req).await;

        assert!(resp.status().is_client_error());
    }
}
