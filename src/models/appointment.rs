use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, Time};

labelled_enum!(
    /// Lifecycle of a booked appointment.
    AppointmentStatus {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
        InProgress => "In Progress",
        NoShow => "No Show",
    }
);

/// A booked consultation between a patient and a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "Id", default)]
    pub id: u64,
    #[serde(deserialize_with = "super::reference::deserialize")]
    pub patient_id: u64,
    /// Staff id of the consulting doctor.
    #[serde(deserialize_with = "super::reference::deserialize")]
    pub doctor_id: u64,
    #[serde(with = "super::iso_date")]
    pub date: Date,
    #[serde(with = "super::clock_time")]
    pub time: Time,
    /// Length in minutes.
    #[serde(default = "default_duration")]
    pub duration: u32,
    pub department: String,
    pub reason: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    #[serde(with = "super::iso_date")]
    pub created_at: Date,
}

fn default_duration() -> u32 {
    30
}

impl Appointment {
    pub fn starts_at(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.time)
    }

    /// Still expected to happen or happening now.
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Scheduled | AppointmentStatus::InProgress
        )
    }
}

record_kind!(Appointment, "appointments");

update_struct!(
    AppointmentUpdate for Appointment {
        patient_id: u64,
        doctor_id: u64,
        date: Date,
        time: Time,
        duration: u32,
        department: String,
        reason: String,
        notes: String,
        status: AppointmentStatus,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn parses_time_of_day_and_default_duration() {
        let json = r#"{
            "Id": 12,
            "patientId": 4,
            "doctorId": {"Id": 2, "Name": "Dr. Okafor"},
            "date": "2024-06-03",
            "time": "09:30",
            "department": "Cardiology",
            "reason": "Follow-up",
            "status": "In Progress",
            "createdAt": "2024-05-20"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.doctor_id, 2);
        assert_eq!(appointment.duration, 30);
        assert_eq!(appointment.starts_at().date(), date!(2024 - 06 - 03));
        assert_eq!(appointment.starts_at().time(), time!(9:30));
        assert!(appointment.is_open());
    }

    #[test]
    fn serializes_back_to_wire_form() {
        let json = r#"{"Id":1,"patientId":1,"doctorId":1,"date":"2024-06-03","time":"14:05","duration":45,"department":"ENT","reason":"Check","notes":"","status":"No Show","createdAt":"2024-06-01"}"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert!(!appointment.is_open());
        assert_eq!(serde_json::to_string(&appointment).unwrap(), json);
    }
}
