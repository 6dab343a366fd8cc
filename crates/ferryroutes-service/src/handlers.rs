//! Request handlers.
//!
//! Each handler validates its inputs, calls one `ferryroutes_lib::query`
//! operation and maps the outcome to a [`ServiceResponse`] or an RFC 9457
//! [`ProblemDetails`]. Queries that match nothing answer 404.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use ferryroutes_lib::model::parse_travel_date;
use ferryroutes_lib::query::{
    self, Availability, DurationResult, IndirectRoute, PriceList, PriceQuote, ScheduleEntry,
    Suggestions, VesselList,
};
use ferryroutes_lib::{ConversationContext, Error as LibError, QueryRequest, Route};
use ferryroutes_service_shared::{
    from_chat_error, from_lib_error, record_chat_completion, record_query_empty,
    record_query_failed, record_query_served, AppState, ChatError, ChatQueryParams, ChatReply,
    ChatRequest,
    FormatParams, ProblemDetails, RequestId, ResponseFormat, ServiceResponse, SuggestionsParams,
    Validate,
};

type HandlerResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

#[derive(Debug, Serialize)]
pub struct RouteList {
    pub routes: Vec<Route>,
}

#[derive(Debug, Serialize)]
pub struct IndirectRouteList {
    pub origin: String,
    pub destination: String,
    pub routes: Vec<IndirectRoute>,
}

#[derive(Debug, Serialize)]
pub struct Departures {
    pub origin: String,
    pub departures: Vec<ScheduleEntry>,
}

/// Suggestions with their rendered text, so clients can show either.
#[derive(Debug, Serialize)]
pub struct SuggestionsReply {
    pub text: String,
    pub suggestions: Suggestions,
}

fn served<T>(operation: &str, results: usize, data: T) -> HandlerResult<T> {
    record_query_served(operation, results);
    Ok(ServiceResponse::new(data))
}

fn not_found(operation: &str, detail: &str, request_id: &RequestId) -> ProblemDetails {
    debug!(request_id = %request_id, operation, "query matched nothing");
    record_query_empty(operation);
    ProblemDetails::not_found(detail, request_id.as_str())
}

fn failed(operation: &str, error: &LibError, request_id: &RequestId) -> ProblemDetails {
    let reason = match error {
        LibError::InvalidInput { .. } => "invalid_input",
        err if err.is_store_failure() => "store_unavailable",
        _ => "internal",
    };
    warn!(request_id = %request_id, operation, error = %error, "query failed");
    record_query_failed(operation, reason);
    from_lib_error(error, request_id.as_str())
}

/// `GET /routes`. An empty store yields an empty list.
pub async fn list_routes(State(state): State<AppState>) -> HandlerResult<RouteList> {
    let routes = query::all_routes(state.store());
    served("all_routes", routes.len(), RouteList { routes })
}

/// `GET /routes/{origin}/{destination}`
pub async fn routes_between(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((origin, destination)): Path<(String, String)>,
) -> HandlerResult<RouteList> {
    const OP: &str = "routes_by_ports";
    let routes = query::routes_by_ports(state.store(), &origin, &destination)
        .map_err(|e| failed(OP, &e, &request_id))?;
    if routes.is_empty() {
        return Err(not_found(OP, "No routes found.", &request_id));
    }
    served(OP, routes.len(), RouteList { routes })
}

/// `GET /prices/{route_id}`
pub async fn prices(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(route_id): Path<String>,
) -> HandlerResult<PriceList> {
    const OP: &str = "price_lookup";
    let list = query::price_lookup(state.store(), &route_id)
        .map_err(|e| failed(OP, &e, &request_id))?;
    if list.prices.is_empty() {
        return Err(not_found(OP, "Price data not found.", &request_id));
    }
    served(OP, list.prices.len(), list)
}

/// `GET /duration/{origin}/{destination}`
pub async fn duration(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((origin, destination)): Path<(String, String)>,
) -> HandlerResult<DurationResult> {
    const OP: &str = "shortest_duration";
    match query::shortest_duration(state.store(), &origin, &destination) {
        Ok(Some(result)) => served(OP, 1, result),
        Ok(None) => Err(not_found(OP, "No duration data available.", &request_id)),
        Err(e) => Err(failed(OP, &e, &request_id)),
    }
}

/// `GET /availability/{origin}/{destination}/{date}`
pub async fn availability(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((origin, destination, date)): Path<(String, String, String)>,
) -> HandlerResult<Availability> {
    const OP: &str = "availability";
    let result = parse_travel_date(&date)
        .and_then(|date| query::availability(state.store(), &origin, &destination, date))
        .map_err(|e| failed(OP, &e, &request_id))?;
    if result.available_services.is_empty() {
        return Err(not_found(OP, "No ferry available on this date.", &request_id));
    }
    served(OP, result.available_services.len(), result)
}

/// `GET /indirect-route/{origin}/{destination}`
pub async fn indirect_route(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((origin, destination)): Path<(String, String)>,
) -> HandlerResult<IndirectRouteList> {
    const OP: &str = "indirect_route";
    let routes = query::indirect_routes(state.store(), &origin, &destination)
        .map_err(|e| failed(OP, &e, &request_id))?;
    if routes.is_empty() {
        return Err(not_found(OP, "No indirect route found.", &request_id));
    }
    served(
        OP,
        routes.len(),
        IndirectRouteList {
            origin,
            destination,
            routes,
        },
    )
}

/// `GET /vessel/{route_id}`
pub async fn vessels(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(route_id): Path<String>,
) -> HandlerResult<VesselList> {
    const OP: &str = "vessels";
    let list =
        query::vessels(state.store(), &route_id).map_err(|e| failed(OP, &e, &request_id))?;
    if list.vessels.is_empty() {
        return Err(not_found(OP, "No vessel found.", &request_id));
    }
    served(OP, list.vessels.len(), list)
}

/// `GET /schedule/{origin}`
pub async fn schedule(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(origin): Path<String>,
) -> HandlerResult<Departures> {
    const OP: &str = "schedule";
    let departures =
        query::schedule(state.store(), &origin).map_err(|e| failed(OP, &e, &request_id))?;
    if departures.is_empty() {
        return Err(not_found(OP, "No departures found.", &request_id));
    }
    served(OP, departures.len(), Departures { origin, departures })
}

/// `GET /cheapest-route/{origin}/{destination}`
pub async fn cheapest_route(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((origin, destination)): Path<(String, String)>,
) -> HandlerResult<PriceQuote> {
    const OP: &str = "cheapest_route";
    match query::cheapest_route(state.store(), &origin, &destination) {
        Ok(Some(quote)) => served(OP, 1, quote),
        Ok(None) => Err(not_found(OP, "No price data available.", &request_id)),
        Err(e) => Err(failed(OP, &e, &request_id)),
    }
}

/// `GET /most-expensive-route`
pub async fn most_expensive_route(
    State(state): State<AppState>,
    request_id: RequestId,
) -> HandlerResult<PriceQuote> {
    const OP: &str = "most_expensive_route";
    match query::most_expensive_route(state.store()) {
        Some(quote) => served(OP, 1, quote),
        None => Err(not_found(OP, "No price data available.", &request_id)),
    }
}

/// `GET /suggestions?origin=&date=`. Always 200, possibly with nothing to suggest.
pub async fn suggestions(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<SuggestionsParams>,
) -> HandlerResult<SuggestionsReply> {
    const OP: &str = "suggestions";
    params
        .validate(request_id.as_str())
        .map_err(|problem| *problem)?;

    let suggestions = params
        .date
        .as_deref()
        .map(parse_travel_date)
        .transpose()
        .and_then(|date| query::suggestions(state.store(), params.origin.as_deref(), date))
        .map_err(|e| failed(OP, &e, &request_id))?;

    let text = ferryroutes_lib::output::format_suggestions(&suggestions);
    let count = suggestions.destinations.len()
        + suggestions.popular_ports.len()
        + suggestions.similar_ports.len()
        + suggestions.nearby_dates.len();
    served(OP, count, SuggestionsReply { text, suggestions })
}

/// `POST /api/v1/query[?format=text]`
///
/// Dispatches any [`QueryRequest`]. Empty outcomes are returned as-is with
/// 200; only invalid input and store failures produce problems.
pub async fn run_query(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<FormatParams>,
    Json(request): Json<QueryRequest>,
) -> Result<Response, ProblemDetails> {
    let operation = request.operation();
    info!(request_id = %request_id, operation, "handling query request");

    let outcome = ferryroutes_lib::execute(state.store(), &request)
        .map_err(|e| failed(operation, &e, &request_id))?;

    if outcome.is_empty() {
        record_query_empty(operation);
    } else {
        record_query_served(operation, 1);
    }

    Ok(match params.format {
        ResponseFormat::Json => ServiceResponse::new(outcome).into_response(),
        ResponseFormat::Text => ServiceResponse::text(outcome.render()).into_response(),
    })
}

/// `POST /api/v1/chat`
///
/// The caller sends the history returned by its previous call; the reply
/// carries the updated, window-trimmed history.
pub async fn chat(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ChatRequest>,
) -> HandlerResult<ChatReply> {
    answer_chat(&state, &request_id, request).await
}

/// `GET /chat/?query=...`
///
/// Single-turn form used by the web frontend; the reply carries the new
/// exchange as history so a client can continue with `POST /api/v1/chat`.
pub async fn chat_query(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(params): Query<ChatQueryParams>,
) -> HandlerResult<ChatReply> {
    answer_chat(&state, &request_id, params.into()).await
}

async fn answer_chat(
    state: &AppState,
    request_id: &RequestId,
    request: ChatRequest,
) -> HandlerResult<ChatReply> {
    request
        .validate(request_id.as_str())
        .map_err(|problem| *problem)?;

    let Some(model) = state.chat_model() else {
        record_chat_completion("none", "unconfigured");
        return Err(from_chat_error(
            &ChatError::NotConfigured,
            request_id.as_str(),
        ));
    };

    let mut context = ConversationContext::from_turns(request.history, state.history_turns());
    let prompt = context.render_prompt(&request.query);

    let response = match model.complete(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!(request_id = %request_id, model = model.model_name(), error = %e, "chat completion failed");
            record_chat_completion(model.model_name(), "upstream_error");
            return Err(from_chat_error(&e, request_id.as_str()));
        }
    };
    record_chat_completion(model.model_name(), "ok");
    info!(
        request_id = %request_id,
        model = model.model_name(),
        history_turns = context.turns().len(),
        "chat completion returned"
    );

    context.record_exchange(request.query, response.clone());
    Ok(ServiceResponse::new(ChatReply {
        response,
        history: context.into_turns(),
    }))
}
