use shared::domain::{ChecklistItem, ItemDetail, ToolLink};

/// The response checklist seeded when a war room opens.
pub fn default_checklist() -> Vec<ChecklistItem> {
    vec![
        item(
            "1",
            "Determine if a war room is needed",
            ItemDetail {
                guidance: Some(
                    "A war room should be opened when there's a critical issue affecting \
                     multiple users or core functionality of the system."
                        .into(),
                ),
                links: Vec::new(),
            },
        ),
        item(
            "2",
            "Notify A manager",
            ItemDetail {
                guidance: None,
                links: vec![ToolLink {
                    name: "PagerDuty".into(),
                    url: "tel:1800132213311".into(),
                }],
            },
        ),
        item("3", "Start a Zoom", ItemDetail::default()),
        item(
            "4",
            "Fast deploy to Resolve issue - if needed",
            ItemDetail {
                guidance: Some(
                    "Only use for critical fixes that have been properly tested.".into(),
                ),
                links: vec![ToolLink {
                    name: "Emergency deploy pipeline".into(),
                    url: "https://jenkins.example.com/job/emergency-deploy/123".into(),
                }],
            },
        ),
        item("5", "Post Update messages to channels", ItemDetail::default()),
    ]
}

fn item(id: &str, title: &str, detail: ItemDetail) -> ChecklistItem {
    ChecklistItem {
        id: id.into(),
        title: title.into(),
        checked: false,
        detail,
    }
}
