use super::*;

#[derive(Debug, serde::Deserialize)]
pub(super) struct FilesQuery {
    #[serde(default)]
    path: String,
    #[serde(default)]
    recursive: bool,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct CompareParams {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
}

pub(super) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub(super) async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return unauthorized();
    };
    let Ok(value) = value.to_str() else {
        return unauthorized();
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return unauthorized();
    };
    if !state.knows_token(token) {
        return unauthorized();
    }
    let token = token.to_string();

    let mut req = req;
    req.extensions_mut().insert(Caller { token });
    next.run(req).await
}

pub(super) async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Response {
    let (project, level) = match visible_project(&state, &caller, &id) {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    Json(project.info(level)).into_response()
}

pub(super) async fn list_files(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(q): Query<FilesQuery>,
) -> Response {
    let (project, _) = match visible_project(&state, &caller, &id) {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    let branch = q
        .reference
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| project.default_branch.clone());

    match project.list(&branch, &q.path, q.recursive) {
        Ok(entries) => {
            tracing::debug!(project = project.id, %branch, path = %q.path, count = entries.len(), "listed files");
            Json(entries).into_response()
        }
        Err(err) => lookup_failed(err),
    }
}

pub(super) async fn compare(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(q): Query<CompareParams>,
) -> Response {
    let (project, _) = match visible_project(&state, &caller, &id) {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    let (Some(from), Some(to)) = (q.from, q.to) else {
        return bad_request("from and to are required");
    };

    match project.compare(&from, &to) {
        Ok(cmp) => Json(cmp).into_response(),
        Err(err) => lookup_failed(err),
    }
}

/// Projects the caller holds no role on are reported as missing.
fn visible_project<'a>(
    state: &'a AppState,
    caller: &Caller,
    id: &str,
) -> std::result::Result<(&'a FixtureProject, AccessLevel), Response> {
    let Ok(id) = id.parse::<u64>() else {
        return Err(bad_request("invalid project id"));
    };
    let Some(project) = state.projects.get(&id) else {
        return Err(not_found("project not found"));
    };
    let Some(level) = state.access_for(&caller.token, project) else {
        return Err(not_found("project not found"));
    };
    Ok((project, level))
}
