//! Requests a login or signup OTP for a portal role.
//!
//! Usage: portal_otp --role=customer|broker|employee --email=ADDR
//!                   [--phone=NUMBER] [--purpose=login|signup|reset] [--csrf=TOKEN]

use anyhow::{anyhow, Result};
use chrono::Utc;

use pmsportal::config::Config;
use pmsportal::logging::{json_log, obj, v_str};
use pmsportal::portal::notice::{otp_sent_message, NoticeBoard, NoticeKind, NoticeStyle};
use pmsportal::portal::otp::{OtpRequest, Purpose};
use pmsportal::portal::{PortalClient, Role};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut role = None;
    let mut email = String::new();
    let mut phone = None;
    let mut purpose = Purpose::Login;
    let mut csrf = None;
    for arg in &args {
        if let Some(v) = arg.strip_prefix("--role=") {
            role = Some(Role::parse(v).ok_or_else(|| anyhow!("unknown role: {}", v))?);
        } else if let Some(v) = arg.strip_prefix("--email=") {
            email = v.to_string();
        } else if let Some(v) = arg.strip_prefix("--phone=") {
            phone = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--purpose=") {
            purpose = match v.to_lowercase().as_str() {
                "login" => Purpose::Login,
                "signup" => Purpose::Signup,
                "reset" => Purpose::Reset,
                other => return Err(anyhow!("unknown purpose: {}", other)),
            };
        } else if let Some(v) = arg.strip_prefix("--csrf=") {
            csrf = Some(v.to_string());
        } else {
            return Err(anyhow!("unknown argument: {}", arg));
        }
    }
    let role = role.ok_or_else(|| anyhow!("--role is required"))?;

    let cfg = Config::from_env();
    let client = PortalClient::from_config(&cfg)?;
    match csrf {
        Some(token) => client.add_cookie(&format!("{}={}", cfg.csrf_cookie, token)),
        None => {
            if let Err(err) = client.prime_session(role).await {
                json_log("portal_otp", obj(&[("msg", v_str("login page unreachable")), ("error", v_str(&err.to_string()))]));
            }
        }
    }

    let request = match purpose {
        Purpose::Signup => OtpRequest::signup(&email, phone.as_deref().unwrap_or("")),
        Purpose::Login | Purpose::Reset => OtpRequest {
            purpose,
            ..OtpRequest::login(&email)
        },
    };

    let mut board = NoticeBoard::new(role, cfg.notice_secs);
    let now = Utc::now();
    let result = client.send_otp(role, &request).await;
    let notice = match &result {
        Ok(_) => board.show(otp_sent_message(role), NoticeKind::Success, now),
        Err(err) => board.show_error(err, now),
    };
    let prefix = match notice.style {
        NoticeStyle::Alert => "[alert]",
        NoticeStyle::Toast => "[toast]",
    };
    println!("{} {}: {}", prefix, notice.kind.as_str(), notice.message);

    result.map(|_| ()).map_err(|err| anyhow!(err))
}
