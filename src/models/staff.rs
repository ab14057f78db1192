use serde::{Deserialize, Serialize};
use time::Date;

labelled_enum!(
    /// Whether a staff member can take work right now.
    Availability {
        Available => "Available",
        Busy => "Busy",
        OnCall => "On Call",
        OffDuty => "Off Duty",
    }
);

/// Represents a member of the hospital staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(rename = "Id", default)]
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// Free-form job title, e.g. "Doctor", "Head Nurse".
    pub role: String,
    pub department: String,
    #[serde(default)]
    pub specialization: String,
    pub phone: String,
    pub email: String,
    pub availability_status: Availability,
    #[serde(default)]
    pub working_hours: String,
    #[serde(with = "super::iso_date")]
    pub join_date: Date,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

record_kind!(StaffMember, "staff");

update_struct!(
    StaffUpdate for StaffMember {
        first_name: String,
        last_name: String,
        role: String,
        department: String,
        specialization: String,
        phone: String,
        email: String,
        availability_status: Availability,
        working_hours: String,
    }
);
