use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(global_profile),
        ConfigCommands::Set {
            api_url,
            timeout,
            sync_interval,
            sync_on_resume,
            no_activate,
        } => run_config_set(
            global_profile,
            &ProfileUpdate {
                api_url,
                timeout,
                sync_interval,
                sync_on_resume,
            },
            no_activate,
        ),
        ConfigCommands::Use { name } => run_config_use(&name),
    }
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub api_url: Option<String>,
    pub timeout: Option<u64>,
    pub sync_interval: Option<u64>,
    pub sync_on_resume: Option<bool>,
}

impl ProfileUpdate {
    const fn is_empty(&self) -> bool {
        self.api_url.is_none()
            && self.timeout.is_none()
            && self.sync_interval.is_none()
            && self.sync_on_resume.is_none()
    }
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let client = config
        .client_config(&profile_name)
        .map_err(CliError::Config)?;

    let json = serde_json::json!({
        "profile": profile_name,
        "active": config.active_profile.as_deref() == Some(profile_name.as_str()),
        "configured": config.profile(&profile_name).is_some(),
        "apiBaseUrl": client.api_base_url(),
        "requestTimeoutSecs": client.request_timeout().as_secs(),
        "syncIntervalSecs": client.sync_interval().map(|interval| interval.as_secs()),
        "syncOnResume": client.sync_on_resume,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub fn apply_profile_update(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    update: &ProfileUpdate,
) -> Result<(), CliError> {
    let profile = config.profile_mut_or_default(profile_name);
    if let Some(url) = update.api_url.as_deref() {
        profile.set_api_base_url(url).map_err(CliError::Config)?;
    }
    if let Some(timeout) = update.timeout {
        if timeout == 0 {
            return Err(CliError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }
        profile.request_timeout_secs = Some(timeout);
    }
    if let Some(interval) = update.sync_interval {
        profile.sync_interval_secs = Some(interval);
    }
    if let Some(enabled) = update.sync_on_resume {
        profile.sync_on_resume = Some(enabled);
    }
    Ok(())
}

fn run_config_set(
    global_profile: Option<&str>,
    update: &ProfileUpdate,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    if update.is_empty() && config.profile(&profile_name).is_some() && no_activate {
        println!("Nothing to update for profile '{profile_name}'");
        return Ok(());
    }

    apply_profile_update(&mut config, &profile_name, update)?;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("Profile '{}' saved at {}", profile_name, path.display());
    Ok(())
}

fn run_config_use(name: &str) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(Some(name));
    if config.profile(&profile_name).is_none() {
        return Err(CliError::Config(format!(
            "Profile '{profile_name}' is not configured. Run `evident --profile {profile_name} config set` first."
        )));
    }

    config.active_profile = Some(profile_name.clone());
    config.save().map_err(CliError::Config)?;
    println!("Active profile is now '{profile_name}'");
    Ok(())
}
