use serde::{Deserialize, Serialize};
use time::Date;

labelled_enum!(
    /// Lifecycle stage of a hospital stay.
    AdmissionStatus {
        Active => "Active",
        Critical => "Critical",
        Stable => "Stable",
        Discharged => "Discharged",
    }
);

/// An inpatient stay in a department bed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    #[serde(rename = "Id", default)]
    pub id: u64,
    #[serde(deserialize_with = "super::reference::deserialize")]
    pub patient_id: u64,
    #[serde(deserialize_with = "super::reference::deserialize")]
    pub department_id: u64,
    #[serde(deserialize_with = "super::reference::deserialize")]
    pub attending_doctor_id: u64,
    pub bed_number: String,
    pub diagnosis: String,
    /// e.g. "Emergency", "Planned", "Transfer".
    #[serde(default)]
    pub admission_type: String,
    #[serde(with = "super::iso_date")]
    pub admission_date: Date,
    #[serde(with = "super::iso_date::option", default)]
    pub estimated_discharge: Option<Date>,
    #[serde(with = "super::iso_date::option", default)]
    pub actual_discharge: Option<Date>,
    pub status: AdmissionStatus,
    #[serde(default)]
    pub discharge_notes: String,
}

impl Admission {
    /// The patient still occupies the bed.
    pub fn is_active(&self) -> bool {
        self.status != AdmissionStatus::Discharged
    }
}

record_kind!(Admission, "admissions");

update_struct!(
    AdmissionUpdate for Admission {
        department_id: u64,
        attending_doctor_id: u64,
        bed_number: String,
        diagnosis: String,
        admission_type: String,
        estimated_discharge: Option<Date>,
        status: AdmissionStatus,
        discharge_notes: String,
    }
);

/// Extra details merged onto an admission when the patient is discharged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DischargeDetails {
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
}
