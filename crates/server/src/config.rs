use std::fs;

use serde::Deserialize;

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
    pub slack_webhook_url: Option<String>,
    pub war_room_channel: String,
    pub team_channel: String,
    pub status_update_interval_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            slack_webhook_url: None,
            war_room_channel: "war-room-channel".into(),
            team_channel: "a-team".into(),
            status_update_interval_seconds: 30 * 60,
        }
    }
}

// absent keys keep their defaults
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    slack_webhook_url: Option<String>,
    war_room_channel: Option<String>,
    team_channel: Option<String>,
    status_update_interval_seconds: Option<u32>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("warroom.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            apply_file_settings(&mut settings, file_cfg);
        }
    }

    apply_env_overrides(&mut settings);

    settings
}

fn apply_file_settings(settings: &mut Settings, file: FileSettings) {
    if let Some(v) = file.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file.slack_webhook_url {
        settings.slack_webhook_url = Some(v);
    }
    if let Some(v) = file.war_room_channel {
        settings.war_room_channel = v;
    }
    if let Some(v) = file.team_channel {
        settings.team_channel = v;
    }
    if let Some(v) = file.status_update_interval_seconds {
        settings.status_update_interval_seconds = v;
    }
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("SLACK_WEBHOOK_URL") {
        settings.slack_webhook_url = Some(v);
    }
    if let Ok(v) = std::env::var("APP__SLACK_WEBHOOK_URL") {
        settings.slack_webhook_url = Some(v);
    }

    if let Ok(v) = std::env::var("WAR_ROOM_CHANNEL") {
        settings.war_room_channel = v;
    }
    if let Ok(v) = std::env::var("APP__WAR_ROOM_CHANNEL") {
        settings.war_room_channel = v;
    }

    if let Ok(v) = std::env::var("TEAM_CHANNEL") {
        settings.team_channel = v;
    }
    if let Ok(v) = std::env::var("APP__TEAM_CHANNEL") {
        settings.team_channel = v;
    }

    if let Ok(v) = std::env::var("STATUS_UPDATE_INTERVAL_SECONDS") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.status_update_interval_seconds = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__STATUS_UPDATE_INTERVAL_SECONDS") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.status_update_interval_seconds = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_bind_and_half_hour_interval() {
        let settings = Settings::default();
        assert_eq!(settings.server_bind, "127.0.0.1:8787");
        assert!(settings.slack_webhook_url.is_none());
        assert_eq!(settings.war_room_channel, "war-room-channel");
        assert_eq!(settings.team_channel, "a-team");
        assert_eq!(settings.status_update_interval_seconds, 1800);
    }

    #[test]
    fn file_overlay_is_partial() {
        let mut settings = Settings::default();
        let file_cfg: FileSettings = toml::from_str(
            "bind_addr = \"0.0.0.0:9000\"\nstatus_update_interval_seconds = 600\n",
        )
        .expect("parse");

        apply_file_settings(&mut settings, file_cfg);

        assert_eq!(settings.server_bind, "0.0.0.0:9000");
        assert_eq!(settings.status_update_interval_seconds, 600);
        assert_eq!(settings.war_room_channel, "war-room-channel");
        assert!(settings.slack_webhook_url.is_none());
    }

    #[test]
    fn file_overlay_can_set_the_webhook_and_channels() {
        let mut settings = Settings::default();
        let file_cfg: FileSettings = toml::from_str(
            "slack_webhook_url = \"https://hooks.example.com/services/T0/B0/X\"\n\
             war_room_channel = \"incidents\"\n\
             team_channel = \"eng-all\"\n",
        )
        .expect("parse");

        apply_file_settings(&mut settings, file_cfg);

        assert_eq!(
            settings.slack_webhook_url.as_deref(),
            Some("https://hooks.example.com/services/T0/B0/X")
        );
        assert_eq!(settings.war_room_channel, "incidents");
        assert_eq!(settings.team_channel, "eng-all");
    }

    #[test]
    fn mistyped_interval_fails_the_file_parse() {
        let parsed = toml::from_str::<FileSettings>("status_update_interval_seconds = \"soon\"\n");
        assert!(parsed.is_err());
    }
}
