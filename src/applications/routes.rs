use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tokio::task::spawn_blocking;

use crate::{
    applications::{
        Application, ApplicationDetails, ApplicationStatus, Decision,
        TeamApplicationView, TournamentApplicationView,
        service::ApplicationService,
    },
    auth::Actor,
    state::AppState,
    util_resp::{StandardResponse, bad_request},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/teams/:team_id/applications",
            get(team_applications).post(create_application),
        )
        .route(
            "/teams/:team_id/applications/:application_id",
            get(team_application).put(update_by_team),
        )
        .route(
            "/tournaments/:tournament_id/applications",
            get(tournament_applications),
        )
        .route(
            "/tournaments/:tournament_id/applications/:application_id",
            get(tournament_application).put(update_by_tournament_owner),
        )
}

fn body<T>(json: Result<Json<T>, JsonRejection>) -> StandardResponse<T> {
    match json {
        Ok(Json(t)) => Ok(t),
        Err(e) => bad_request(e.body_text()),
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateApplicationForm {
    pub tournament_id: String,
    #[serde(default)]
    pub players: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct TeamUpdateForm {
    pub status: Option<ApplicationStatus>,
    pub players: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
pub struct DecisionForm {
    pub status: Decision,
}

pub async fn create_application(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path(team_id): Path<String>,
    form: Result<Json<CreateApplicationForm>, JsonRejection>,
) -> StandardResponse<(StatusCode, Json<ApplicationDetails>)> {
    let form = body(form)?;

    let created = spawn_blocking(move || {
        service.create(
            &actor.user_id,
            &team_id,
            &form.tournament_id,
            &form.players,
        )
    })
    .await??;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn team_applications(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path(team_id): Path<String>,
) -> StandardResponse<Json<Vec<Application>>> {
    let applications = spawn_blocking(move || {
        service.team_applications(&actor.user_id, &team_id)
    })
    .await??;

    Ok(Json(applications))
}

pub async fn team_application(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path((team_id, application_id)): Path<(String, String)>,
) -> StandardResponse<Json<TeamApplicationView>> {
    let view = spawn_blocking(move || {
        service.get_for_team(&actor.user_id, &team_id, &application_id)
    })
    .await??;

    Ok(Json(view))
}

pub async fn update_by_team(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path((team_id, application_id)): Path<(String, String)>,
    form: Result<Json<TeamUpdateForm>, JsonRejection>,
) -> StandardResponse<Json<ApplicationDetails>> {
    let form = body(form)?;

    if form.status.is_none() && form.players.is_none() {
        return bad_request("expected `status` or `players`");
    }

    let updated = spawn_blocking(move || {
        service.update_by_team(
            &actor.user_id,
            &team_id,
            &application_id,
            form.status,
            form.players.as_deref(),
        )
    })
    .await??;

    Ok(Json(updated))
}

pub async fn tournament_applications(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path(tournament_id): Path<String>,
) -> StandardResponse<Json<Vec<Application>>> {
    let applications = spawn_blocking(move || {
        service.tournament_applications(&actor.user_id, &tournament_id)
    })
    .await??;

    Ok(Json(applications))
}

pub async fn tournament_application(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path((tournament_id, application_id)): Path<(String, String)>,
) -> StandardResponse<Json<TournamentApplicationView>> {
    let view = spawn_blocking(move || {
        service.get_for_tournament(
            &actor.user_id,
            &tournament_id,
            &application_id,
        )
    })
    .await??;

    Ok(Json(view))
}

pub async fn update_by_tournament_owner(
    State(service): State<Arc<ApplicationService>>,
    actor: Actor,
    Path((tournament_id, application_id)): Path<(String, String)>,
    form: Result<Json<DecisionForm>, JsonRejection>,
) -> StandardResponse<Json<ApplicationDetails>> {
    let form = body(form)?;

    let updated = spawn_blocking(move || {
        service.update_by_tournament_owner(
            &actor.user_id,
            &tournament_id,
            &application_id,
            form.status,
        )
    })
    .await??;

    Ok(Json(updated))
}
