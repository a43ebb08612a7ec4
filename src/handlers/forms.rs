use actix_web::error::{Error, InternalError, UrlencodedError};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{debug, error};

use crate::models::Application;
use crate::render::render_page;
use crate::services::submission;
use crate::session::{self, FlashMessage, CSRF_FIELD};
use crate::state::AppState;
use crate::validation::{FieldErrors, RawForm, FORM_LEVEL};

/// Largest accepted form body. Well above any valid submission, so overlong
/// fields are reported by validation rather than by the extractor.
pub const FORM_LIMIT: usize = 256 * 1024;
pub const BODY_TOO_LARGE_MESSAGE: &str = "The submitted form is too large.";
pub const BODY_UNREADABLE_MESSAGE: &str = "The submitted form could not be read.";

/// Renders the form page. A browser without a CSRF nonce gets one set along
/// with the page; the embedded token is issued for that nonce.
fn page<A: Application>(
    req: &HttpRequest,
    state: &AppState,
    values: &RawForm,
    errors: &FieldErrors,
    flash: Option<&FlashMessage>,
) -> HttpResponse {
    let (nonce, fresh) = match session::csrf_nonce(req) {
        Some(nonce) => (nonce, false),
        None => (session::new_csrf_nonce(), true),
    };
    let token = match session::csrf_token(&state.session_secret, &nonce) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "failed to issue csrf token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut builder = HttpResponse::Ok();
    builder.content_type("text/html; charset=utf-8");
    if fresh {
        builder.cookie(session::csrf_cookie(&nonce, !state.development));
    }
    builder.body(render_page::<A>(values, errors, &token, flash))
}

/// Body limit and extractor errors for one form's POST route. Bodies that
/// cannot be decoded get the form back with a form-level error.
pub fn form_config<A: Application + 'static>() -> web::FormConfig {
    web::FormConfig::default()
        .limit(FORM_LIMIT)
        .error_handler(body_error::<A>)
}

fn body_error<A: Application + 'static>(err: UrlencodedError, req: &HttpRequest) -> Error {
    let (status, message) = match &err {
        UrlencodedError::Overflow { .. } => (StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE_MESSAGE),
        _ => (StatusCode::BAD_REQUEST, BODY_UNREADABLE_MESSAGE),
    };
    debug!(form = A::KIND, error = %err, "form body rejected");

    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return err.into();
    };
    let mut errors = FieldErrors::new();
    errors.push(FORM_LEVEL, message);
    let mut resp = page::<A>(req, state, &RawForm::new(), &errors, None);
    if resp.status() == StatusCode::OK {
        *resp.status_mut() = status;
    }
    InternalError::from_response(err, resp).into()
}

/// GET: empty form plus any pending flash message, which is consumed.
pub async fn show_form<A: Application>(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let flash = session::read_flash(&req, &state.session_secret);
    let mut resp = page::<A>(&req, &state, &RawForm::new(), &FieldErrors::new(), flash.as_ref());
    if req.cookie(session::FLASH_COOKIE).is_some() {
        if let Err(e) = resp.add_removal_cookie(&session::flash_removal_cookie()) {
            debug!(error = %e, "could not clear flash cookie");
        }
    }
    resp
}

/// POST: validate, then store or log. Invalid input re-renders the form;
/// every valid submission redirects back with the same success message.
pub async fn submit_form<A: Application>(
    req: HttpRequest,
    form: web::Form<RawForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let raw = form.into_inner();

    let token = raw.get(CSRF_FIELD).map(String::as_str);
    let nonce = session::csrf_nonce(&req);
    if let Err(e) = session::verify_csrf(token, nonce.as_deref(), &state.session_secret) {
        debug!(form = A::KIND, error = %e, "csrf check failed");
        let mut errors = FieldErrors::new();
        errors.push(CSRF_FIELD, session::csrf_error_message(&e));
        return page::<A>(&req, &state, &raw, &errors, None);
    }

    let application = match A::validate(&raw) {
        Ok(application) => application,
        Err(errors) => {
            let fields: Vec<&str> = errors.fields().collect();
            debug!(form = A::KIND, ?fields, "validation failed");
            return page::<A>(&req, &state, &raw, &errors, None);
        }
    };

    let outcome = submission::submit(&state.store, &application).await;
    debug!(form = A::KIND, ?outcome, "submission complete");
    redirect_with_flash::<A>(&state)
}

fn redirect_with_flash<A: Application>(state: &AppState) -> HttpResponse {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, A::PATH));

    let flash = FlashMessage::success(A::SUCCESS_MESSAGE);
    match session::flash_cookie(&flash, &state.session_secret, !state.development) {
        Ok(cookie) => {
            builder.cookie(cookie);
        }
        Err(e) => error!(error = %e, "failed to sign flash message"),
    }
    builder.finish()
}
