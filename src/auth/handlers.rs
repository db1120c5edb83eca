use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            UpdateMeRequest,
        },
        repo::User,
        services::{
            hash_password, is_valid_email, is_valid_geburtstag, verify_password, AuthUser, JwtKeys,
        },
    },
    plans,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

fn issue_tokens(
    state: &AppState,
    user: User,
) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.vorname = payload.vorname.trim().to_string();
    payload.nachname = payload.nachname.trim().to_string();
    payload.phone = payload.phone.trim().to_string();
    payload.geburtstag = payload.geburtstag.trim().to_string();

    if payload.vorname.is_empty()
        || payload.nachname.is_empty()
        || payload.email.is_empty()
        || payload.phone.is_empty()
        || payload.geburtstag.is_empty()
        || payload.password.is_empty()
    {
        warn!("registration with missing fields");
        return Err((StatusCode::BAD_REQUEST, "All fields are required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if !is_valid_geburtstag(&payload.geburtstag) {
        warn!("invalid birth date format");
        return Err((
            StatusCode::BAD_REQUEST,
            "Birth date must match DD.MM.YYYY".into(),
        ));
    }

    if payload.password.len() < 6 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    // Ensure email is not taken
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    // Next id after the current local maximum; fresh installs start at 1001.
    let max_id = match User::max_id(&state.db).await {
        Ok(max) => max.unwrap_or(1000),
        Err(e) => {
            error!(error = %e, "max_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let user = User {
        id: max_id + 1,
        email: payload.email,
        vorname: payload.vorname,
        nachname: payload.nachname,
        phone: payload.phone,
        geburtstag: payload.geburtstag,
        password_hash: hash,
    };

    if let Err(e) = User::insert(&state.db, &user).await {
        error!(error = %e, "create user failed");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
    }

    // Best-effort mirror: a failed remote write never fails the registration.
    if let Err(e) = state.remote.save_user(&user).await {
        warn!(error = %e, email = %user.email, "remote user mirror failed");
    }

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let local = match User::find_by_email(&state.db, &payload.email).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    // Unknown locally: try to recover the account from the remote store and
    // hydrate its plans into the local store.
    let user = match local {
        Some(u) => u,
        None => match state.remote.find_user_by_email(&payload.email).await {
            Ok(Some(remote_user)) => {
                if remote_user.id == 0 {
                    warn!(email = %payload.email, "remote user id missing or 0");
                }
                let recovered = User {
                    id: remote_user.id,
                    email: remote_user.email,
                    vorname: remote_user.vorname,
                    nachname: remote_user.nachname,
                    phone: remote_user.phone,
                    geburtstag: remote_user.geburtstag,
                    password_hash: remote_user.password_hash,
                };
                if let Err(e) = User::insert(&state.db, &recovered).await {
                    error!(error = %e, "recovering remote user failed");
                    return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
                }
                match state.remote.load_plans(recovered.id).await {
                    Ok(remote_plans) => {
                        let count =
                            plans::service::import_plans(&state.db, &remote_plans)
                                .await
                                .map_err(|e| {
                                    error!(error = %e, "importing remote plans failed");
                                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                                })?;
                        info!(user_id = recovered.id, count, "remote plans hydrated");
                    }
                    // A failed load yields an empty plan set, not a login failure.
                    Err(e) => warn!(error = %e, "loading remote plans failed"),
                }
                recovered
            }
            Ok(None) => {
                warn!(email = %payload.email, "login unknown email");
                return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
            }
            Err(e) => {
                error!(error = %e, "remote user lookup failed");
                return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
            }
        },
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(email = %payload.email, user_id = user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .ok()
        .flatten()
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if let Some(geburtstag) = payload.geburtstag.as_deref() {
        if !geburtstag.is_empty() && !is_valid_geburtstag(geburtstag) {
            warn!("invalid birth date format");
            return Err((
                StatusCode::BAD_REQUEST,
                "Birth date must match DD.MM.YYYY".into(),
            ));
        }
    }

    // The email is the business key for both the local table and the remote
    // user document; renaming onto a taken address would shadow that user.
    if let Ok(Some(other)) = User::find_by_email(&state.db, &email).await {
        if other.id != user_id {
            warn!(%email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
    }

    let existing = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let password_hash = match payload.password.as_deref() {
        Some(p) if !p.trim().is_empty() => hash_password(p).map_err(|e| {
            error!(error = %e, "hash_password failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?,
        _ => existing.password_hash.clone(),
    };

    let updated = User {
        id: existing.id,
        email,
        vorname: existing.vorname,
        nachname: existing.nachname,
        phone: payload.phone.unwrap_or_default(),
        geburtstag: payload.geburtstag.unwrap_or_default(),
        password_hash,
    };

    if let Err(e) = User::update(&state.db, &updated).await {
        error!(error = %e, user_id, "update user failed");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
    }

    if let Err(e) = state.remote.save_user(&updated).await {
        warn!(error = %e, email = %updated.email, "remote user mirror failed");
    }

    info!(user_id, "profile updated");
    Ok(Json(updated.into()))
}
