//! Built-in items used when no usable collection is stored.

use chrono::{TimeZone, Utc};

use crate::item::{ResourceItem, ResourceStatus};

struct SeedRow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    owner: Option<&'static str>,
    status: ResourceStatus,
    // (month, day, hour, minute) in June 2024, UTC
    updated: (u32, u32, u32, u32),
}

const SEED_ROWS: [SeedRow; 5] = [
    SeedRow {
        id: "workspace-01",
        name: "露营炉具套装",
        description: "含炉具、燃料、折叠锅具",
        owner: Some("阿强"),
        status: ResourceStatus::Claimed,
        updated: (6, 1, 9, 0),
    },
    SeedRow {
        id: "workspace-02",
        name: "折叠桌椅（2 套）",
        description: "适用于外展活动",
        owner: None,
        status: ResourceStatus::Available,
        updated: (6, 2, 12, 30),
    },
    SeedRow {
        id: "workspace-03",
        name: "帐篷（4 人）",
        description: "雨棚+防潮垫齐全",
        owner: Some("小林"),
        status: ResourceStatus::Reserved,
        updated: (6, 3, 7, 15),
    },
    SeedRow {
        id: "workspace-04",
        name: "投影仪",
        description: "带 HDMI 与 Type-C 转接头",
        owner: None,
        status: ResourceStatus::Available,
        updated: (6, 4, 14, 40),
    },
    SeedRow {
        id: "workspace-05",
        name: "活动音响",
        description: "含无线麦克风两支",
        owner: Some("阿美"),
        status: ResourceStatus::Claimed,
        updated: (6, 5, 10, 5),
    },
];

/// The default collection.
#[must_use]
pub fn default_items() -> Vec<ResourceItem> {
    SEED_ROWS
        .iter()
        .map(|row| {
            let (month, day, hour, minute) = row.updated;
            ResourceItem {
                id: row.id.to_string(),
                name: row.name.to_string(),
                description: Some(row.description.to_string()),
                owner: row.owner.map(str::to_string),
                status: row.status,
                updated_at: Utc
                    .with_ymd_and_hms(2024, month, day, hour, minute, 0)
                    .single()
                    .unwrap_or_default(),
            }
        })
        .collect()
}
