//! OTP, registration and profile calls against a local stub portal.

mod common;

use url::Url;

use common::{serve, StubResponse};
use pmsportal::portal::notice::{NoticeBoard, NoticeKind, NoticeStyle};
use pmsportal::portal::otp::{OtpRequest, RegisterOutcome, REGISTER_FALLBACK, SEND_FALLBACK};
use pmsportal::portal::profile::{ProfileError, UploadedFile, UploadedFiles};
use pmsportal::portal::{PortalClient, PortalError, Role};

fn client(base: &str) -> PortalClient {
    PortalClient::new(Url::parse(base).unwrap(), "csrftoken").unwrap()
}

fn json_body(req: &common::Captured) -> serde_json::Value {
    serde_json::from_slice(&req.body).unwrap()
}

#[tokio::test]
async fn send_otp_carries_csrf_and_body() {
    let server = serve(|_| StubResponse::json(200, r#"{"success":true,"message":"OTP sent to your email"}"#));
    let c = client(&server.base);
    c.add_cookie("csrftoken=tok%2B1; Path=/");

    let msg = c.send_otp(Role::Customer, &OtpRequest::login("a@b.c")).await.unwrap();
    assert_eq!(msg, "OTP sent to your email");

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].path, "/users/customer/send-otp/");
    assert_eq!(reqs[0].header("x-csrftoken"), Some("tok+1"));
    let body = json_body(&reqs[0]);
    assert_eq!(body["email"], "a@b.c");
    assert_eq!(body["purpose"], "LOGIN");
    assert!(body.get("phone").is_none());
}

#[tokio::test]
async fn primed_session_supplies_token_and_broker_sends_phone() {
    let server = serve(|req| {
        if req.method == "GET" {
            StubResponse::html(200, "<form></form>").with_cookie("csrftoken=fromserver; Path=/")
        } else {
            StubResponse::json(200, r#"{"success":true,"message":"ok"}"#)
        }
    });
    let c = client(&server.base);
    c.prime_session(Role::Broker).await.unwrap();
    assert_eq!(c.csrf_token().as_deref(), Some("fromserver"));

    c.send_otp(Role::Broker, &OtpRequest::signup("b@x.in", "+919876543210"))
        .await
        .unwrap();

    let reqs = server.requests();
    assert_eq!(reqs[0].path, "/users/broker/login/");
    assert_eq!(reqs[1].header("X-CSRFToken"), Some("fromserver"));
    let body = json_body(&reqs[1]);
    assert_eq!(body["phone"], "+919876543210");
    assert_eq!(body["purpose"], "SIGNUP");
}

#[tokio::test]
async fn rejection_message_comes_from_error_status_body() {
    let server = serve(|_| {
        StubResponse::json(400, r#"{"success":false,"message":"Email already registered"}"#)
    });
    let c = client(&server.base);
    let err = c
        .send_otp(Role::Customer, &OtpRequest::signup("a@b.c", "9876543210"))
        .await
        .unwrap_err();
    assert!(matches!(&err, PortalError::Rejected(m) if m == "Email already registered"));

    let mut toasts = NoticeBoard::new(Role::Customer, 5);
    let now = chrono::Utc::now();
    let shown = toasts.show_error(&err, now).clone();
    assert_eq!(shown.kind, NoticeKind::Error);
    assert_eq!(shown.style, NoticeStyle::Toast);
}

#[tokio::test]
async fn rejection_without_message_uses_fallback() {
    let server = serve(|_| StubResponse::json(401, r#"{"success":false}"#));
    let err = client(&server.base)
        .send_otp(Role::Employee, &OtpRequest::login("e@corp.in"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), SEND_FALLBACK);
}

#[tokio::test]
async fn invalid_input_sends_nothing() {
    let server = serve(|_| StubResponse::json(200, r#"{"success":true}"#));
    let c = client(&server.base);
    let err = c
        .send_otp(Role::Broker, &OtpRequest::signup("b@x.in", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    let err = c.send_otp(Role::Customer, &OtpRequest::login("")).await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn register_reports_redirect_target() {
    let server = serve(|req| {
        if req.path == "/users/customer/register/" {
            StubResponse::redirect("/users/customer/home/")
        } else {
            StubResponse::html(200, "<h1>Welcome</h1>")
        }
    });
    let c = client(&server.base);
    c.add_cookie("csrftoken=abc; Path=/");
    let fields = vec![
        ("first_name".to_string(), "Asha".to_string()),
        ("email".to_string(), "a@b.c".to_string()),
    ];
    let outcome = c.register(Role::Customer, &fields, " 123456 ").await.unwrap();
    match outcome {
        RegisterOutcome::Redirected(url) => assert_eq!(url.path(), "/users/customer/home/"),
        other => panic!("expected redirect, got {:?}", other),
    }

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].header("x-csrftoken"), Some("abc"));
    let form = reqs[0].body_text();
    assert!(form.contains("name=\"otp_code\""));
    assert!(form.contains("123456"));
    assert!(form.contains("Asha"));
}

#[tokio::test]
async fn register_redirect_back_to_form_is_success() {
    let server = serve(|_| StubResponse::redirect("/users/employee/register/"));
    let c = client(&server.base);
    let fields = vec![("email".to_string(), "e@corp.in".to_string())];
    let outcome = c.register(Role::Employee, &fields, "654321").await.unwrap();
    match outcome {
        RegisterOutcome::Redirected(url) => assert_eq!(url.path(), "/users/employee/register/"),
        other => panic!("expected redirect, got {:?}", other),
    }
    // the redirect target is reported, not fetched
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn register_error_page_yields_alert_or_fallback() {
    let server = serve(|req| {
        if req.path.starts_with("/users/broker/") {
            StubResponse::html(
                200,
                r#"<div class="messages"><div class="alert alert-danger">Invalid or expired OTP</div></div>"#,
            )
        } else {
            StubResponse::html(200, "<form>try again</form>")
        }
    });
    let c = client(&server.base);
    let fields = vec![("email".to_string(), "b@x.in".to_string())];

    let outcome = c.register(Role::Broker, &fields, "000000").await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Rejected("Invalid or expired OTP".into()));

    let outcome = c.register(Role::Customer, &fields, "000000").await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Rejected(REGISTER_FALLBACK.into()));

    let err = c.register(Role::Customer, &fields, "  ").await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(server.requests().len(), 2);
}

fn uploaded() -> UploadedFiles {
    UploadedFiles::new(vec![
        UploadedFile {
            field: "pan_card".into(),
            file_name: "pan.pdf".into(),
        },
        UploadedFile {
            field: "cancelled_cheque".into(),
            file_name: "cheque.jpg".into(),
        },
    ])
}

#[tokio::test]
async fn delete_file_removes_only_on_success() {
    let server = serve(|req| {
        if req.path.contains("field=pan_card") {
            StubResponse::json(200, r#"{"success":true}"#)
        } else {
            StubResponse::json(200, r#"{"success":false,"error":"File not found"}"#)
        }
    });
    let c = client(&server.base);
    let mut files = uploaded();

    c.delete_file(Role::Broker, &mut files, "pan_card", Some("formtok"))
        .await
        .unwrap();
    assert!(!files.contains("pan_card"));
    assert_eq!(files.files().len(), 1);

    let before = files.clone();
    let err = c
        .delete_file(Role::Broker, &mut files, "cancelled_cheque", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "File not found");
    assert_eq!(files, before);

    let err = c
        .delete_file(Role::Broker, &mut files, "aadhaar", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::UnknownField(_)));

    let reqs = server.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].path, "/users/broker/profile/?delete_file=1&field=pan_card");
    assert_eq!(reqs[0].header("x-csrftoken"), Some("formtok"));
}
