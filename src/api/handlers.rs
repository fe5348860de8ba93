//! API request handlers.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::program::{parse_duration_hms, parse_time_of_day};
use crate::core::types::ProgramId;
use crate::scheduler::{ProgramEvent, PumpStatus, Scheduler};
use crate::storage::{NewProgram, ProgramStore};

use super::errors::ApiError;
use super::responses::{MessageResponse, ProgramResponse, SeasonsResponse};

/// Shared application state for API handlers.
pub struct ApiState<S: ProgramStore> {
    pub scheduler: Arc<Scheduler<S>>,
    pub store: Arc<S>,
}

impl<S: ProgramStore> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            store: Arc::clone(&self.store),
        }
    }
}

/// Liveness/info page.
pub async fn index() -> Html<&'static str> {
    Html(
        "<h1>Pool Filter Controller</h1>\
         <p>HTTP API for pump programs, seasons, and manual overrides.</p>",
    )
}

/// Current running/idle state.
pub async fn get_current_program<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
) -> Json<PumpStatus> {
    Json(state.scheduler.current_status().await)
}

/// List all programs.
pub async fn get_all_programs<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
) -> Result<Json<Vec<ProgramResponse>>, ApiError> {
    let programs = state.store.list_programs().await?;
    Ok(Json(programs.into_iter().map(ProgramResponse::from).collect()))
}

/// Season boundary dates.
pub async fn get_season_dates<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
) -> Result<Json<SeasonsResponse>, ApiError> {
    let table = state.store.season_table().await?;
    Ok(Json(table.into()))
}

/// Query parameters for creating a program. Everything arrives as strings
/// so missing fields can be reported individually.
#[derive(Debug, Deserialize)]
pub struct AddProgramQuery {
    pub speed: Option<String>,
    pub start: Option<String>,
    pub summer_duration: Option<String>,
    pub winter_duration: Option<String>,
}

/// Create a program.
pub async fn post_new_program<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
    Query(query): Query<AddProgramQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let missing: HashMap<&'static str, bool> = HashMap::from([
        ("speed", query.speed.is_none()),
        ("start", query.start.is_none()),
        ("summer_duration", query.summer_duration.is_none()),
        ("winter_duration", query.winter_duration.is_none()),
    ]);
    let (Some(speed), Some(start), Some(summer), Some(winter)) = (
        query.speed,
        query.start,
        query.summer_duration,
        query.winter_duration,
    ) else {
        return Err(ApiError::Validation {
            message: "Insufficient information provided to create new program".to_string(),
            parameters: Some(missing),
        });
    };

    let new = NewProgram {
        speed: speed
            .parse()
            .map_err(|_| ApiError::validation(format!("invalid speed '{speed}'")))?,
        start: parse_time_of_day(&start).map_err(|e| ApiError::validation(e.to_string()))?,
        summer_duration: parse_duration_hms(&summer)
            .map_err(|e| ApiError::validation(e.to_string()))?,
        winter_duration: parse_duration_hms(&winter)
            .map_err(|e| ApiError::validation(e.to_string()))?,
    };

    state.store.add_program(new).await?;
    state.scheduler.update_next_event().await?;

    Ok(Json(MessageResponse::new("Successfully added new program")))
}

/// Query parameters for updating a program.
#[derive(Debug, Deserialize)]
pub struct UpdateProgramQuery {
    pub id: Option<String>,
    pub speed: Option<String>,
    pub start: Option<String>,
    pub summer_duration: Option<String>,
    pub winter_duration: Option<String>,
}

/// Update fields of an existing program.
pub async fn put_update_program<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
    Query(query): Query<UpdateProgramQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_program_id(query.id)?;
    let mut program = state.store.get_program(id).await?;

    if let Some(speed) = query.speed {
        program.speed = speed
            .parse()
            .map_err(|_| ApiError::validation(format!("invalid speed '{speed}'")))?;
    }
    if let Some(start) = query.start {
        program.start =
            parse_time_of_day(&start).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if let Some(summer) = query.summer_duration {
        program.summer_duration =
            parse_duration_hms(&summer).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if let Some(winter) = query.winter_duration {
        program.winter_duration =
            parse_duration_hms(&winter).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    state.store.update_program(program).await?;
    state.scheduler.update_next_event().await?;

    Ok(Json(MessageResponse::new("Successfully updated program")))
}

/// Query parameters for a manual override.
#[derive(Debug, Deserialize)]
pub struct OverrideQuery {
    pub speed: Option<String>,
    pub duration: Option<String>,
}

/// Force the current state: turn the pump on at a speed for a duration, or
/// off with speed 0.
pub async fn put_override<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
    Query(query): Query<OverrideQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(speed) = query.speed else {
        return Err(ApiError::validation("Speed not provided to override"));
    };
    let speed: u32 = speed
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid speed '{speed}'")))?;

    let event = if speed > 0 {
        let Some(duration) = query.duration else {
            return Err(ApiError::validation(
                "Duration not provided to override when trying to turn on filter",
            ));
        };
        let duration =
            parse_duration_hms(&duration).map_err(|e| ApiError::validation(e.to_string()))?;
        ProgramEvent::start_now(duration, speed)
    } else {
        ProgramEvent::stop_now()
    };

    state.scheduler.override_event(event).await?;
    Ok(Json(MessageResponse::new("Overwrote current program")))
}

/// Force stop.
pub async fn put_override_stop<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .scheduler
        .override_event(ProgramEvent::stop_now())
        .await?;
    Ok(Json(MessageResponse::new("Overwrote current program")))
}

/// Query parameters for deleting a program.
#[derive(Debug, Deserialize)]
pub struct DeleteProgramQuery {
    pub id: Option<String>,
}

/// Remove a program by id.
pub async fn delete_program<S: ProgramStore + 'static>(
    State(state): State<ApiState<S>>,
    Query(query): Query<DeleteProgramQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_program_id(query.id)?;
    state.store.delete_program(id).await?;
    state.scheduler.update_next_event().await?;
    Ok(Json(MessageResponse::new("Successfully deleted program")))
}

fn parse_program_id(id: Option<String>) -> Result<ProgramId, ApiError> {
    let Some(id) = id else {
        return Err(ApiError::validation("Did not provide id of program"));
    };
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid program id '{id}'")))?;
    Ok(ProgramId::new(id))
}
