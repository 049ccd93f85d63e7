//! User-facing feedback for the OTP flows: a single transient toast that
//! replaces whatever was showing, or a blocking alert.

use chrono::{DateTime, Duration, Utc};

use super::{PortalError, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStyle {
    /// Dismisses itself after the configured delay.
    Toast,
    /// Stays until the user acknowledges it.
    Alert,
}

impl NoticeStyle {
    /// Employee pages use blocking alerts; the other roles use toasts.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Employee => NoticeStyle::Alert,
            Role::Customer | Role::Broker => NoticeStyle::Toast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub style: NoticeStyle,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notice {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Success text shown after an OTP was sent.
pub fn otp_sent_message(role: Role) -> &'static str {
    match role {
        Role::Broker => "OTP sent successfully!",
        Role::Customer | Role::Employee => "OTP sent successfully! Please check your email.",
    }
}

/// What the user sees for a failed OTP request.
pub fn otp_error_message(role: Role, err: &PortalError) -> String {
    match err {
        PortalError::Validation(msg) | PortalError::Rejected(msg) => msg.clone(),
        PortalError::Transport { .. } | PortalError::Url(_) => match role {
            Role::Broker => "Error sending OTP".to_string(),
            Role::Customer | Role::Employee => "An error occurred while sending OTP".to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct NoticeBoard {
    role: Role,
    toast_ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(role: Role, toast_secs: i64) -> Self {
        Self {
            role,
            toast_ttl: Duration::seconds(toast_secs),
            current: None,
        }
    }

    /// Replaces any notice already on screen.
    pub fn show(&mut self, message: &str, kind: NoticeKind, now: DateTime<Utc>) -> &Notice {
        let style = NoticeStyle::for_role(self.role);
        let expires_at = match style {
            NoticeStyle::Toast => Some(now + self.toast_ttl),
            NoticeStyle::Alert => None,
        };
        self.current.insert(Notice {
            message: message.to_string(),
            kind,
            style,
            expires_at,
        })
    }

    pub fn show_error(&mut self, err: &PortalError, now: DateTime<Utc>) -> &Notice {
        let message = otp_error_message(self.role, err);
        self.show(&message, NoticeKind::Error, now)
    }

    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current.as_ref().filter(|n| n.is_visible(now))
    }

    /// Acknowledges a blocking alert (or closes a toast early).
    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
