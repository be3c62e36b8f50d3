//! Single binary web server: tournament engine REST API plus an SSE event
//! stream for real-time clients.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    get, post,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use footy_tournament_web::{
    logic, realtime::EngineEvent, EngineError, ErrorKind, EventBus, GroupSettings, MatchId,
    TeamSelection, Tournament, TournamentFormat, TournamentId, TournamentRules, UserId,
};
use futures_util::StreamExt;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::BroadcastStream;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID plus the event bus. Entries are
/// removed after prolonged inactivity.
struct AppState {
    tournaments: RwLock<HashMap<TournamentId, TournamentEntry>>,
    events: EventBus,
}

type SharedState = Data<AppState>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    title: String,
    #[serde(default)]
    format: TournamentFormat,
    max_participants: u32,
    organizer_id: UserId,
    #[serde(default)]
    group_settings: Option<GroupSettings>,
    #[serde(default)]
    entry_fee: u32,
    #[serde(default)]
    rules: Option<TournamentRules>,
    #[serde(default)]
    prize_distribution: Vec<String>,
}

#[derive(Deserialize)]
struct JoinBody {
    user_id: UserId,
    team_name: String,
    #[serde(default)]
    team_logo: Option<String>,
}

#[derive(Deserialize)]
struct UserBody {
    user_id: UserId,
}

#[derive(Deserialize)]
struct AdminBody {
    admin_id: UserId,
}

#[derive(Deserialize)]
struct SubmitResultBody {
    user_id: UserId,
    score_player1: u32,
    score_player2: u32,
    #[serde(default)]
    penalties_player1: Option<u32>,
    #[serde(default)]
    penalties_player2: Option<u32>,
    proof_screenshot: String,
}

#[derive(Deserialize)]
struct AdminResolveBody {
    admin_id: UserId,
    winner_id: UserId,
}

#[derive(Deserialize)]
struct ChatBody {
    user_id: UserId,
    sender_name: String,
    text: String,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// Path segments: tournament id and user id.
#[derive(Deserialize)]
struct TournamentUserPath {
    id: TournamentId,
    user_id: UserId,
}

/// Map the engine error taxonomy onto HTTP statuses:
/// validation 400, authorization 403, conflict 409, not-found 404.
fn engine_error(e: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Authorization => HttpResponse::Forbidden().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
    }
}

/// Apply one mutating operation under the store write lock. On success,
/// publish the given events and return the updated tournament. The write
/// lock is what serializes concurrent transitions on the same tournament.
fn apply(
    state: &SharedState,
    id: TournamentId,
    events: Vec<EngineEvent>,
    op: impl FnOnce(&mut Tournament) -> Result<(), EngineError>,
) -> HttpResponse {
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return engine_error(&EngineError::TournamentNotFound),
    };
    entry.last_activity = Instant::now();
    match op(&mut entry.tournament) {
        Ok(()) => {
            let response = HttpResponse::Ok().json(&entry.tournament);
            drop(g);
            for event in events {
                state.events.publish(event);
            }
            response
        }
        Err(e) => engine_error(&e),
    }
}

/// Run a read-only query against a tournament under the read lock.
fn query(
    state: &SharedState,
    id: TournamentId,
    f: impl FnOnce(&Tournament) -> HttpResponse,
) -> HttpResponse {
    let g = match state.tournaments.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&id) {
        Some(entry) => f(&entry.tournament),
        None => engine_error(&EngineError::TournamentNotFound),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "footy-tournament-web",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: SharedState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut tournament = match logic::create_tournament(
        body.title,
        body.format,
        body.max_participants,
        body.organizer_id,
    ) {
        Ok(t) => t,
        Err(e) => return engine_error(&e),
    };
    tournament.group_settings = body.group_settings;
    tournament.entry_fee = body.entry_fee;
    tournament.rules = body.rules.unwrap_or_default();
    tournament.prize_distribution = body.prize_distribution;
    let id = tournament.id;
    let response = HttpResponse::Created().json(&tournament);
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => engine_error(&EngineError::TournamentNotFound),
    }
}

/// Join with a selected team (tournament must be Open; team names are unique).
#[post("/api/tournaments/{id}/join")]
async fn api_join(state: SharedState, path: Path<TournamentPath>, body: Json<JoinBody>) -> HttpResponse {
    let id = path.id;
    let body = body.into_inner();
    let events = vec![
        EngineEvent::TournamentParticipantJoined {
            tournament_id: id,
            user_id: body.user_id,
        },
        EngineEvent::TournamentUpdated { tournament_id: id },
    ];
    apply(&state, id, events, move |t| {
        logic::join_tournament(
            t,
            body.user_id,
            TeamSelection {
                name: body.team_name,
                logo: body.team_logo,
            },
        )
    })
}

/// Withdraw from an Open tournament.
#[post("/api/tournaments/{id}/leave")]
async fn api_leave(state: SharedState, path: Path<TournamentPath>, body: Json<UserBody>) -> HttpResponse {
    let id = path.id;
    let user_id = body.user_id;
    let events = vec![EngineEvent::TournamentUpdated { tournament_id: id }];
    apply(&state, id, events, move |t| logic::leave_tournament(t, user_id))
}

/// Close registration and open check-in (organizer only).
#[post("/api/tournaments/{id}/check-in/open")]
async fn api_begin_check_in(state: SharedState, path: Path<TournamentPath>, body: Json<AdminBody>) -> HttpResponse {
    let id = path.id;
    let admin_id = body.admin_id;
    let events = vec![EngineEvent::TournamentUpdated { tournament_id: id }];
    apply(&state, id, events, move |t| logic::begin_check_in(t, admin_id))
}

/// Confirm attendance during the check-in window.
#[post("/api/tournaments/{id}/check-in")]
async fn api_check_in(state: SharedState, path: Path<TournamentPath>, body: Json<UserBody>) -> HttpResponse {
    let id = path.id;
    let user_id = body.user_id;
    let events = vec![EngineEvent::TournamentUpdated { tournament_id: id }];
    apply(&state, id, events, move |t| logic::check_in(t, user_id))
}

/// Start the tournament: materialize matches per format (organizer only).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: SharedState, path: Path<TournamentPath>, body: Json<AdminBody>) -> HttpResponse {
    let id = path.id;
    let admin_id = body.admin_id;
    let events = vec![EngineEvent::TournamentUpdated { tournament_id: id }];
    apply(&state, id, events, move |t| logic::start_tournament(t, admin_id))
}

/// Cancel the tournament from any pre-completed phase (organizer only).
#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: SharedState, path: Path<TournamentPath>, body: Json<AdminBody>) -> HttpResponse {
    let id = path.id;
    let admin_id = body.admin_id;
    let events = vec![EngineEvent::TournamentUpdated { tournament_id: id }];
    apply(&state, id, events, move |t| logic::cancel_tournament(t, admin_id))
}

/// Knockout bracket grouped by round, with display names (Final, Semifinal, ...).
#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    query(&state, path.id, |t| {
        HttpResponse::Ok().json(serde_json::json!({ "rounds": logic::bracket_rounds(t) }))
    })
}

/// Standings: per-group tables (hybrid) or the whole-field table.
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    query(&state, path.id, |t| match t.format {
        TournamentFormat::Hybrid => {
            HttpResponse::Ok().json(serde_json::json!({ "groups": logic::group_tables(t) }))
        }
        _ => HttpResponse::Ok().json(serde_json::json!({ "table": logic::league_table(t) })),
    })
}

/// Aggregates for drill-down views: best attack/defense, biggest win.
#[get("/api/tournaments/{id}/overview")]
async fn api_overview(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    query(&state, path.id, |t| {
        HttpResponse::Ok().json(logic::league_overview(t))
    })
}

/// All matches involving one participant, in schedule order.
#[get("/api/tournaments/{id}/participants/{user_id}/fixtures")]
async fn api_fixtures(state: SharedState, path: Path<TournamentUserPath>) -> HttpResponse {
    query(&state, path.id, |t| {
        if t.participant(path.user_id).is_none() {
            return engine_error(&EngineError::ParticipantNotFound);
        }
        HttpResponse::Ok().json(logic::participant_fixtures(t, path.user_id))
    })
}

/// A participant marks their match as being played.
#[post("/api/tournaments/{id}/matches/{match_id}/begin")]
async fn api_begin_match(state: SharedState, path: Path<TournamentMatchPath>, body: Json<UserBody>) -> HttpResponse {
    let (id, match_id, user_id) = (path.id, path.match_id, body.user_id);
    let events = vec![EngineEvent::MatchUpdated {
        tournament_id: id,
        match_id,
    }];
    apply(&state, id, events, move |t| {
        logic::begin_match(t, match_id, user_id)
    })
}

/// Submit a match result with proof (one of the two players).
#[post("/api/tournaments/{id}/matches/{match_id}/submit")]
async fn api_submit_result(
    state: SharedState,
    path: Path<TournamentMatchPath>,
    body: Json<SubmitResultBody>,
) -> HttpResponse {
    let (id, match_id) = (path.id, path.match_id);
    let body = body.into_inner();
    let penalties = match (body.penalties_player1, body.penalties_player2) {
        (Some(p1), Some(p2)) => Some((p1, p2)),
        _ => None,
    };
    let events = vec![EngineEvent::MatchUpdated {
        tournament_id: id,
        match_id,
    }];
    apply(&state, id, events, move |t| {
        logic::submit_result(
            t,
            match_id,
            body.user_id,
            body.score_player1,
            body.score_player2,
            penalties,
            &body.proof_screenshot,
        )
    })
}

/// The opponent confirms the submitted result; winners advance.
#[post("/api/tournaments/{id}/matches/{match_id}/confirm")]
async fn api_confirm_result(state: SharedState, path: Path<TournamentMatchPath>, body: Json<UserBody>) -> HttpResponse {
    let (id, match_id, user_id) = (path.id, path.match_id, body.user_id);
    let events = vec![
        EngineEvent::MatchUpdated {
            tournament_id: id,
            match_id,
        },
        EngineEvent::TournamentUpdated { tournament_id: id },
    ];
    apply(&state, id, events, move |t| {
        logic::confirm_result(t, match_id, user_id)
    })
}

/// The opponent rejects the submitted result; the match goes to dispute.
#[post("/api/tournaments/{id}/matches/{match_id}/reject")]
async fn api_reject_result(state: SharedState, path: Path<TournamentMatchPath>, body: Json<UserBody>) -> HttpResponse {
    let (id, match_id, user_id) = (path.id, path.match_id, body.user_id);
    let events = vec![EngineEvent::MatchUpdated {
        tournament_id: id,
        match_id,
    }];
    apply(&state, id, events, move |t| {
        logic::reject_result(t, match_id, user_id)
    })
}

/// Admin arbitration of a disputed match.
#[post("/api/tournaments/{id}/matches/{match_id}/resolve")]
async fn api_admin_resolve(
    state: SharedState,
    path: Path<TournamentMatchPath>,
    body: Json<AdminResolveBody>,
) -> HttpResponse {
    let (id, match_id) = (path.id, path.match_id);
    let (admin_id, winner_id) = (body.admin_id, body.winner_id);
    let events = vec![
        EngineEvent::MatchUpdated {
            tournament_id: id,
            match_id,
        },
        EngineEvent::TournamentUpdated { tournament_id: id },
    ];
    apply(&state, id, events, move |t| {
        logic::admin_resolve(t, match_id, admin_id, winner_id)
    })
}

/// Administrative cancellation of a scheduled match.
#[post("/api/tournaments/{id}/matches/{match_id}/cancel")]
async fn api_cancel_match(state: SharedState, path: Path<TournamentMatchPath>, body: Json<AdminBody>) -> HttpResponse {
    let (id, match_id, admin_id) = (path.id, path.match_id, body.admin_id);
    let events = vec![
        EngineEvent::MatchUpdated {
            tournament_id: id,
            match_id,
        },
        EngineEvent::TournamentUpdated { tournament_id: id },
    ];
    apply(&state, id, events, move |t| {
        logic::cancel_match(t, match_id, admin_id)
    })
}

/// Append a chat message to the match channel.
#[post("/api/tournaments/{id}/matches/{match_id}/chat")]
async fn api_match_chat(state: SharedState, path: Path<TournamentMatchPath>, body: Json<ChatBody>) -> HttpResponse {
    let (id, match_id) = (path.id, path.match_id);
    let body = body.into_inner();
    let events = vec![EngineEvent::MatchUpdated {
        tournament_id: id,
        match_id,
    }];
    apply(&state, id, events, move |t| {
        logic::append_chat_message(t, match_id, body.user_id, &body.sender_name, &body.text)
    })
}

/// Server-sent event stream of this tournament's mutation events. Clients
/// treat each event as a cache-invalidation signal and re-fetch state.
#[get("/api/tournaments/{id}/events")]
async fn api_tournament_events(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    {
        let g = match state.tournaments.read() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        if !g.contains_key(&id) {
            return engine_error(&EngineError::TournamentNotFound);
        }
    }
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |item| async move {
        let event = item.ok()?;
        if event.tournament_id() != id {
            return None;
        }
        let json = serde_json::to_string(&event).ok()?;
        Some(Ok::<_, Infallible>(web::Bytes::from(format!(
            "data: {json}\n\n"
        ))))
    });
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        tournaments: RwLock::new(HashMap::new()),
        events: EventBus::default(),
    });

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.tournaments.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_join)
            .service(api_leave)
            .service(api_begin_check_in)
            .service(api_check_in)
            .service(api_start_tournament)
            .service(api_cancel_tournament)
            .service(api_bracket)
            .service(api_standings)
            .service(api_overview)
            .service(api_fixtures)
            .service(api_begin_match)
            .service(api_submit_result)
            .service(api_confirm_result)
            .service(api_reject_result)
            .service(api_admin_resolve)
            .service(api_cancel_match)
            .service(api_match_chat)
            .service(api_tournament_events)
    })
    .bind(bind)?
    .run()
    .await
}
