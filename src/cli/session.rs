//! td session command implementations: login, register, logout, whoami.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::App;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::notify::StderrSink;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::{Phase, RegisterOutcome};

pub struct LoginOptions {
    pub email: String,
    pub password: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RegisterOptions {
    pub email: String,
    pub username: String,
    pub password: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LogoutOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct WhoamiOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Compose the containers for one CLI invocation. Notifications go to
/// stderr unless the caller asked for machine output or quiet.
pub(crate) fn compose_app(config_path: Option<&Path>, notify_stderr: bool) -> Result<App> {
    let config = Config::load(config_path)?;
    let app = App::compose(&config)?;
    if notify_stderr {
        app.notifier.subscribe(Arc::new(StderrSink));
    }
    Ok(app)
}

fn require_password(password: Option<String>) -> Result<String> {
    password.ok_or_else(|| {
        Error::InvalidArgument(
            "password required; pass --password or set TASKDECK_PASSWORD".to_string(),
        )
    })
}

#[derive(serde::Serialize)]
struct SessionReport {
    authenticated: bool,
    username: Option<String>,
    theme: Option<String>,
}

pub async fn run_login(options: LoginOptions) -> Result<()> {
    let password = require_password(options.password)?;
    let app = compose_app(options.config.as_deref(), !options.json && !options.quiet)?;

    app.session.login(&options.email, &password).await?;

    let profile = app.session.profile();
    let report = SessionReport {
        authenticated: true,
        username: profile.as_ref().map(|p| p.username.clone()),
        theme: profile.as_ref().map(|p| p.theme.to_string()),
    };

    let mut human = HumanOutput::new("td login: session established");
    human.push_summary("email", options.email);
    if let Some(profile) = &profile {
        human.push_summary("username", profile.username.clone());
        human.push_summary("theme", profile.theme.to_string());
    }
    human.push_next_step("td task ls".to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "login",
        &report,
        Some(&human),
    )
}

pub async fn run_register(options: RegisterOptions) -> Result<()> {
    let password = require_password(options.password)?;
    let app = compose_app(options.config.as_deref(), !options.json && !options.quiet)?;

    let outcome = app
        .session
        .register(&options.email, &password, &options.username)
        .await?;

    #[derive(serde::Serialize)]
    struct RegisterReport {
        outcome: &'static str,
        authenticated: bool,
    }

    let (label, header) = match outcome {
        RegisterOutcome::SignedIn => ("signed_in", "td register: account created"),
        RegisterOutcome::VerificationPending => (
            "verification_pending",
            "td register: confirmation required",
        ),
    };

    let report = RegisterReport {
        outcome: label,
        authenticated: app.session.is_authenticated(),
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("email", options.email);
    human.push_summary("username", options.username);
    match outcome {
        RegisterOutcome::SignedIn => human.push_next_step("td task add <title>".to_string()),
        RegisterOutcome::VerificationPending => {
            human.push_detail("a confirmation email is on its way".to_string());
            human.push_next_step("td login <email> after confirming".to_string());
        }
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "register",
        &report,
        Some(&human),
    )
}

pub async fn run_logout(options: LogoutOptions) -> Result<()> {
    let app = compose_app(options.config.as_deref(), !options.json && !options.quiet)?;

    app.session.restore().await?;
    app.session.logout().await?;

    let report = SessionReport {
        authenticated: false,
        username: None,
        theme: None,
    };

    let human = HumanOutput::new("td logout: session cleared");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "logout",
        &report,
        Some(&human),
    )
}

pub async fn run_whoami(options: WhoamiOptions) -> Result<()> {
    let app = compose_app(options.config.as_deref(), false)?;

    app.session.restore().await?;

    let profile = app.session.profile();
    let authenticated = app.session.phase() == Phase::Authenticated;
    let report = SessionReport {
        authenticated,
        username: profile.as_ref().map(|p| p.username.clone()),
        theme: profile.as_ref().map(|p| p.theme.to_string()),
    };

    let header = if authenticated {
        "td whoami: authenticated"
    } else {
        "td whoami: not authenticated"
    };
    let mut human = HumanOutput::new(header);
    if let Some(profile) = &profile {
        human.push_summary("username", profile.username.clone());
        human.push_summary("theme", profile.theme.to_string());
        if let Some(avatar_url) = &profile.avatar_url {
            human.push_summary("avatar", avatar_url.clone());
        }
    } else {
        human.push_next_step("td login <email>".to_string());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "whoami",
        &report,
        Some(&human),
    )
}
