use shared::domain::LogEvent;

const RETRO_SECTIONS: [&str; 5] = [
    "What Went Well",
    "What Could Be Improved",
    "Action Items",
    "Key Learnings",
    "Follow-up Tasks",
];

pub fn render_timeline(events: &[LogEvent]) -> String {
    events
        .iter()
        .map(timeline_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn timeline_line(event: &LogEvent) -> String {
    format!("{} - {}", event.at.format("%H:%M:%S"), event.description)
}

pub fn render_retro(title: &str, events: &[LogEvent]) -> String {
    let mut retro = format!("# War Room Retro: {title}\n\n## Timeline of Events\n");
    let timeline = render_timeline(events);
    if !timeline.is_empty() {
        retro.push('\n');
        retro.push_str(&timeline);
        retro.push('\n');
    }
    for section in RETRO_SECTIONS {
        retro.push_str(&format!("\n## {section}\n"));
    }
    retro
}
