//! OTP request and OTP-verified registration.

use reqwest::header::LOCATION;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{csrf, PortalClient, PortalError, Role};
use crate::logging::log_portal_call;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Purpose {
    Login,
    Signup,
    Reset,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub purpose: Purpose,
}

impl OtpRequest {
    pub fn login(email: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            phone: None,
            purpose: Purpose::Login,
        }
    }

    pub fn signup(email: &str, phone: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            phone: Some(phone.trim().to_string()),
            purpose: Purpose::Signup,
        }
    }

    /// Client-side checks made before anything is sent.
    pub fn validate(&self) -> Result<(), PortalError> {
        if self.email.is_empty() {
            return Err(PortalError::Validation("Please enter your email address".into()));
        }
        if self.purpose == Purpose::Signup {
            match self.phone.as_deref() {
                None | Some("") => {
                    return Err(PortalError::Validation("Please enter your phone number".into()))
                }
                Some(p) if !is_valid_phone(p) => {
                    return Err(PortalError::Validation("Please enter a valid phone number".into()))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Only the broker flow forwards the phone number to the server.
    fn body_for(&self, role: Role) -> OtpRequest {
        let mut body = self.clone();
        if role != Role::Broker {
            body.phone = None;
        }
        body
    }
}

/// Optional `+`, then 10 to 15 ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (10..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The server answered with a redirect, even one back to the form URL.
    Redirected(Url),
    /// The form came back with an error.
    Rejected(String),
}

pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
pub const SEND_FALLBACK: &str = "Failed to send OTP";

/// Text of the first `.alert` element inside the `.messages` block of a
/// server-rendered page, whitespace-collapsed.
pub fn first_alert(html: &str) -> Option<String> {
    let messages_at = find_class(html, 0, "messages")?;
    let alert_at = find_class(html, messages_at, "alert")?;
    let tag_name: String = html[alert_at + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    let content_start = alert_at + html[alert_at..].find('>')? + 1;
    let content_end = content_start + html[content_start..].find(&format!("</{}", tag_name))?;
    let text = strip_tags(&html[content_start..content_end]);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Byte offset of the first opening tag at or after `from` whose class list
/// contains `class`.
fn find_class(html: &str, from: usize, class: &str) -> Option<usize> {
    let mut cursor = from;
    while let Some(rel) = html[cursor..].find('<') {
        let tag_start = cursor + rel;
        let tag_end = tag_start + html[tag_start..].find('>')?;
        let tag = &html[tag_start..tag_end];
        if let Some(classes) = attr_value(tag, "class") {
            if classes.split_whitespace().any(|c| c == class) {
                return Some(tag_start);
            }
        }
        cursor = tag_end;
    }
    None
}

/// Quoted value of attribute `name`. The name must start after whitespace,
/// so `data-class=` does not count as `class=`.
fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=", name);
    let at = tag
        .match_indices(&needle)
        .map(|(i, _)| i)
        .find(|&i| tag[..i].chars().next_back().map_or(false, char::is_whitespace))?
        + needle.len();
    let rest = &tag[at..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    Some(&rest[..rest.find(quote)?])
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

impl PortalClient {
    /// POSTs `{email, [phone,] purpose}` to the role's send-otp endpoint.
    /// Returns the server's message on success.
    pub async fn send_otp(&self, role: Role, request: &OtpRequest) -> Result<String, PortalError> {
        request.validate()?;
        let url = self.role_url(role, "send-otp/")?;
        let token = self.csrf_token().unwrap_or_default();

        let resp = self
            .http()
            .post(url.clone())
            .header(csrf::HEADER, token)
            .json(&request.body_for(role))
            .send()
            .await
            .map_err(Self::transport(&url))?;
        // 400/401 still carry a {success, message} body
        let data: OtpResponse = resp.json().await.map_err(Self::transport(&url))?;

        log_portal_call(role.slug(), url.as_str(), data.success, data.message.as_deref());
        if data.success {
            Ok(data.message.unwrap_or_else(|| "OTP sent successfully".to_string()))
        } else {
            Err(PortalError::Rejected(
                data.message.unwrap_or_else(|| SEND_FALLBACK.to_string()),
            ))
        }
    }

    /// Submits the registration form plus `otp_code` as multipart. Any 3xx
    /// answer is success; the target is resolved but not fetched.
    pub async fn register(
        &self,
        role: Role,
        fields: &[(String, String)],
        otp_code: &str,
    ) -> Result<RegisterOutcome, PortalError> {
        if otp_code.trim().is_empty() {
            return Err(PortalError::Validation("Please enter the OTP".into()));
        }
        let url = self.role_url(role, "register/")?;
        let token = self.csrf_token().unwrap_or_default();

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        form = form.text("otp_code", otp_code.trim().to_string());

        let resp = self
            .http_manual()
            .post(url.clone())
            .header(csrf::HEADER, token)
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport(&url))?;

        if resp.status().is_redirection() {
            let target = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| url.join(loc).ok())
                .unwrap_or_else(|| url.clone());
            log_portal_call(role.slug(), url.as_str(), true, Some(target.as_str()));
            return Ok(RegisterOutcome::Redirected(target));
        }

        let body = resp.text().await.map_err(Self::transport(&url))?;
        let message = first_alert(&body).unwrap_or_else(|| REGISTER_FALLBACK.to_string());
        log_portal_call(role.slug(), url.as_str(), false, Some(&message));
        Ok(RegisterOutcome::Rejected(message))
    }
}
