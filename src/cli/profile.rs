//! td profile command implementations.

use std::path::PathBuf;

use crate::cli::session::compose_app;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::profile::{Profile, ProfilePatch};

pub struct ShowOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SetOptions {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

fn profile_human(header: &str, profile: &Profile) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", profile.id.to_string());
    human.push_summary("username", profile.username.clone());
    human.push_summary(
        "avatar",
        profile.avatar_url.clone().unwrap_or_else(|| "-".to_string()),
    );
    human.push_summary("theme", profile.theme.to_string());
    human
}

pub async fn run_show(options: ShowOptions) -> Result<()> {
    let app = compose_app(options.config.as_deref(), false)?;

    app.session.restore().await?;
    let profile = app.session.profile().ok_or(Error::NotAuthenticated)?;

    let human = profile_human("td profile show", &profile);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "profile show",
        &profile,
        Some(&human),
    )
}

pub async fn run_set(options: SetOptions) -> Result<()> {
    let patch = ProfilePatch {
        username: options.username,
        avatar_url: options.avatar_url,
        theme: options.theme.as_deref().map(str::parse).transpose()?,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to update; pass --username, --avatar-url, or --theme".to_string(),
        ));
    }

    let app = compose_app(options.config.as_deref(), !options.json && !options.quiet)?;

    app.session.restore().await?;
    let profile = app.session.update_profile(&patch).await?;

    let human = profile_human("td profile set: profile updated", &profile);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "profile set",
        &profile,
        Some(&human),
    )
}
