use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{EventOrigin, LogEvent},
    error::{ApiError, ApiException},
    protocol::{
        ActionReceipt, AddLogEntryRequest, OpenWarRoomRequest, OpenWarRoomResponse,
        StatusBroadcastRequest, TimerStatus, ToggleItemResponse, WarRoomSnapshot,
    },
};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8787")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Open {
        title: String,
        description: String,
    },
    Snapshot,
    Toggle {
        item_id: String,
    },
    Close,
    Log {
        description: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    Remove {
        event_id: u64,
    },
    Events,
    Status {
        text: String,
    },
    Timer,
    Timeline,
    Retro,
}

struct Api {
    http: reqwest::Client,
    base: String,
}

impl Api {
    fn new(server: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: server.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        json_body(self.http.get(format!("{}{path}", self.base)).send().await?).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        json_body(self.http.post(format!("{}{path}", self.base)).send().await?).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        json_body(
            self.http
                .post(format!("{}{path}", self.base))
                .json(body)
                .send()
                .await?,
        )
        .await
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        json_body(
            self.http
                .delete(format!("{}{path}", self.base))
                .send()
                .await?,
        )
        .await
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.http.get(format!("{}{path}", self.base)).send().await?;
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }
        Ok(response.text().await?)
    }
}

async fn json_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(response_error(response).await);
    }
    Ok(response.json().await?)
}

async fn response_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(error) => anyhow::Error::new(ApiException::from(error)),
        Err(_) => anyhow!("request failed with status {status}"),
    }
}

fn print_notice(notice: Option<String>) {
    if let Some(notice) = notice {
        println!("notice: {notice}");
    }
}

fn print_event(event: &LogEvent) {
    let origin = match event.origin {
        EventOrigin::User => "user",
        EventOrigin::System => "system",
    };
    println!(
        "{:>4}  {}  {:6}  {}",
        event.id.0,
        event.at.format("%H:%M:%S"),
        origin,
        event.description
    );
}

fn print_snapshot(snapshot: &WarRoomSnapshot) {
    println!("title:       {}", snapshot.title);
    println!("description: {}", snapshot.description);
    println!("open:        {}", snapshot.is_open);
    println!("can close:   {}", snapshot.can_close);
    println!("checklist:");
    for item in &snapshot.checklist {
        let mark = if item.checked { "x" } else { " " };
        println!("  [{mark}] {}  {}", item.id, item.title);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = Api::new(&cli.server);

    match cli.command {
        Command::Open { title, description } => {
            let response: OpenWarRoomResponse = api
                .post_json("/warroom", &OpenWarRoomRequest { title, description })
                .await?;
            println!("opened war room: {}", response.snapshot.title);
            print_notice(response.notice);
        }
        Command::Snapshot => {
            let snapshot: WarRoomSnapshot = api.get_json("/warroom").await?;
            print_snapshot(&snapshot);
        }
        Command::Toggle { item_id } => {
            let response: ToggleItemResponse =
                api.post_empty(&format!("/checklist/{item_id}/toggle")).await?;
            println!("{}", response.event.description);
            if response.can_close {
                println!("checklist complete, the room can be closed");
            }
        }
        Command::Close => {
            let receipt: ActionReceipt = api.post_empty("/warroom/close").await?;
            println!("{}", receipt.event.description);
            print_notice(receipt.notice);
        }
        Command::Log { description, at } => {
            let event: LogEvent = api
                .post_json("/events", &AddLogEntryRequest { at, description })
                .await?;
            println!("logged event id={}", event.id.0);
        }
        Command::Remove { event_id } => {
            let removed: LogEvent = api.delete_json(&format!("/events/{event_id}")).await?;
            println!("removed event id={}: {}", removed.id.0, removed.description);
        }
        Command::Events => {
            let events: Vec<LogEvent> = api.get_json("/events").await?;
            if events.is_empty() {
                println!("no events logged");
            }
            for event in &events {
                print_event(event);
            }
        }
        Command::Status { text } => {
            let receipt: ActionReceipt = api
                .post_json("/status/broadcast", &StatusBroadcastRequest { text })
                .await?;
            println!("{}", receipt.event.description);
            print_notice(receipt.notice);
        }
        Command::Timer => {
            let status: TimerStatus = api.get_json("/status/timer").await?;
            println!(
                "next status reminder in {} ({} seconds)",
                status.formatted, status.seconds_left
            );
        }
        Command::Timeline => {
            println!("{}", api.get_text("/export/timeline").await?);
        }
        Command::Retro => {
            println!("{}", api.get_text("/export/retro").await?);
        }
    }

    Ok(())
}
