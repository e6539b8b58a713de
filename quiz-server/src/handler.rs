use std::net::{IpAddr, SocketAddr};

use axum::{
    Form, Json,
    body::Bytes,
    extract::{ConnectInfo, Path, Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::Markup;
use quiz_core::{EventSink, Feedback, QuizEvent, SubmitOutcome, ViewOutcome};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::activity::RequestEvents;
use crate::message::{AckResponse, ClickRequest, FeedbackRequest, StartQuery, SubmitForm, SubmitResponse};
use crate::pages;
use crate::server::{AppState, START_PATH, SUCCESS_PATH, question_path};
use crate::session::SESSION_COOKIE;

/// 当前请求对应的会话与事件记录器
struct Visitor {
    session_id: String,
    jar: CookieJar,
    events: RequestEvents,
}

/// 解析（或创建）访客会话，并在需要时下发会话 Cookie
fn visitor(state: &AppState, jar: CookieJar, connect: Option<ConnectInfo<SocketAddr>>) -> Visitor {
    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (session_id, created) = state.sessions.resolve(cookie_id.as_deref());

    let jar = if created {
        let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(state.cookie_secure);
        jar.add(cookie)
    } else {
        jar
    };

    let events = state
        .activity
        .scope(client_ip(connect), Some(&session_id));

    Visitor {
        session_id,
        jar,
        events,
    }
}

/// 只记录事件的请求，不创建会话也不下发 Cookie
struct Tracker {
    jar: CookieJar,
    events: RequestEvents,
}

fn tracker(state: &AppState, jar: CookieJar, connect: Option<ConnectInfo<SocketAddr>>) -> Tracker {
    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let session_id = state.sessions.lookup(cookie_id.as_deref());
    let events = state
        .activity
        .scope(client_ip(connect), session_id.as_deref());

    Tracker { jar, events }
}

fn client_ip(connect: Option<ConnectInfo<SocketAddr>>) -> Option<IpAddr> {
    connect.map(|ConnectInfo(addr)| addr.ip())
}

/// 首页，`?reset=1` 时清空进度
pub async fn start(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    Query(query): Query<StartQuery>,
) -> (CookieJar, Markup) {
    let visitor = visitor(&state, jar, connect);
    let view = state.sessions.with_session(&visitor.session_id, |session| {
        state.gate.start(session, query.wants_reset(), &visitor.events)
    });
    debug!("Start page for {} at question {}", visitor.session_id, view.progress);

    (visitor.jar, pages::start(&view))
}

/// 显示题目；题号、令牌或权限不符时重定向
pub async fn question(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path((id, token)): Path<(String, String)>,
) -> (CookieJar, Response) {
    let visitor = visitor(&state, jar, connect);
    // Non-numeric ids fall out of range and go back to the start page.
    let id: i64 = id.parse().unwrap_or(0);

    let outcome = state.sessions.with_session(&visitor.session_id, |session| {
        state.gate.view(session, id, &token, &visitor.events)
    });

    let response = match outcome {
        ViewOutcome::Show(view) => pages::question(&view).into_response(),
        ViewOutcome::RedirectToStart => Redirect::to(START_PATH).into_response(),
        ViewOutcome::RedirectToQuestion(address) => {
            Redirect::to(&question_path(address.question_id, address.token.as_str()))
                .into_response()
        }
    };

    (visitor.jar, response)
}

/// 提交答案
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> (CookieJar, Json<SubmitResponse>) {
    let visitor = visitor(&state, jar, connect);

    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            debug!("Rejected submission body: {}", e);
            return (visitor.jar, Json(SubmitResponse::invalid()));
        }
    };

    let result = state.sessions.with_session(&visitor.session_id, |session| {
        state
            .gate
            .submit(session, form.question_id(), &form.answer, &visitor.events)
    });

    let response = match result {
        Ok(SubmitOutcome::Advanced(next)) => {
            SubmitResponse::next_question(question_path(next.question_id, next.token.as_str()))
        }
        Ok(SubmitOutcome::Completed) => SubmitResponse::completed(SUCCESS_PATH.to_string()),
        Ok(SubmitOutcome::Incorrect) => SubmitResponse::incorrect(),
        Err(e) => {
            debug!("Invalid submission from {}: {}", visitor.session_id, e);
            SubmitResponse::invalid()
        }
    };

    (visitor.jar, Json(response))
}

/// 记录用户反馈
pub async fn feedback(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> (StatusCode, CookieJar, Json<AckResponse>) {
    let tracker = tracker(&state, jar, connect);

    let Some(label) = parse_body::<FeedbackRequest>(&body).and_then(|req| req.label()) else {
        return bad_request(tracker.jar);
    };

    tracker.events.record(QuizEvent::FeedbackSubmitted {
        feedback: Feedback::from_label(&label),
    });

    (StatusCode::OK, tracker.jar, Json(AckResponse { success: true }))
}

/// 记录按钮点击
pub async fn log_click(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> (StatusCode, CookieJar, Json<AckResponse>) {
    let tracker = tracker(&state, jar, connect);

    let Some((button, page)) = parse_body::<ClickRequest>(&body).and_then(|req| req.labels()) else {
        return bad_request(tracker.jar);
    };

    tracker
        .events
        .record(QuizEvent::ButtonClicked { button, page });

    (StatusCode::OK, tracker.jar, Json(AckResponse { success: true }))
}

/// 解析 JSON 请求体，不要求 Content-Type
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Invalid JSON body: {}", e);
            None
        }
    }
}

fn bad_request(jar: CookieJar) -> (StatusCode, CookieJar, Json<AckResponse>) {
    (StatusCode::BAD_REQUEST, jar, Json(AckResponse { success: false }))
}

pub async fn success() -> Markup {
    pages::success()
}

pub async fn gift() -> Markup {
    pages::gift()
}

pub async fn letsgo() -> Markup {
    pages::letsgo()
}
