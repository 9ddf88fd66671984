use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Customer record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A customer record as returned by the record store.
///
/// Missing fields default to documented placeholders: name "N/A", plan
/// and last-order status "Unknown", open-ticket count 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default = "d_na")]
    pub name: String,
    #[serde(default = "d_unknown")]
    pub plan: String,
    #[serde(default = "d_unknown")]
    pub last_order_status: String,
    #[serde(default)]
    pub open_ticket_count: u32,
}

impl Default for CustomerRecord {
    fn default() -> Self {
        Self {
            name: d_na(),
            plan: d_unknown(),
            last_order_status: d_unknown(),
            open_ticket_count: 0,
        }
    }
}

impl CustomerRecord {
    /// Render the formatted summary block shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "Name: {}\nPlan: {}\nLast Order: {}\nOpen Tickets: {}",
            self.name, self.plan, self.last_order_status, self.open_ticket_count
        )
    }
}

fn d_na() -> String {
    "N/A".into()
}
fn d_unknown() -> String {
    "Unknown".into()
}
