use serde::{Deserialize, Serialize};

/// How full a department's beds are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyLevel {
    /// Below 70 %.
    Normal,
    /// 70 % and above.
    High,
    /// 90 % and above.
    Critical,
}

/// A hospital department and its bed capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(rename = "Id", default)]
    pub id: u64,
    pub name: String,
    pub floor: String,
    pub head_of_department: String,
    pub phone: String,
    pub total_beds: u32,
    pub occupied_beds: u32,
}

impl Department {
    /// Rounded share of occupied beds; 0 for a department without beds.
    pub fn occupancy_percent(&self) -> u32 {
        percent(self.occupied_beds, self.total_beds)
    }

    pub fn available_beds(&self) -> u32 {
        self.total_beds.saturating_sub(self.occupied_beds)
    }

    pub fn occupancy_level(&self) -> OccupancyLevel {
        match self.occupancy_percent() {
            p if p >= 90 => OccupancyLevel::Critical,
            p if p >= 70 => OccupancyLevel::High,
            _ => OccupancyLevel::Normal,
        }
    }
}

/// `part / whole` as a rounded percentage, 0 when `whole` is 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) * 100.0 / f64::from(whole)).round() as u32
}

record_kind!(Department, "departments");

update_struct!(
    DepartmentUpdate for Department {
        name: String,
        floor: String,
        head_of_department: String,
        phone: String,
        total_beds: u32,
        occupied_beds: u32,
    }
);
