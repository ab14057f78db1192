use serde::{Deserialize, Serialize};
use time::Date;

labelled_enum!(
    /// The patient's gender.
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
);

labelled_enum!(
    /// ABO/Rh blood group.
    BloodGroup {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        AbPositive => "AB+",
        AbNegative => "AB-",
        OPositive => "O+",
        ONegative => "O-",
    }
);

labelled_enum!(
    /// Where the patient currently sits in the hospital's care pathway.
    PatientStatus {
        Outpatient => "Outpatient",
        Admitted => "Admitted",
        Emergency => "Emergency",
        Discharged => "Discharged",
    }
);

/// Represents a patient in the hospital management system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// The patient's unique ID, assigned by the record store.
    #[serde(rename = "Id", default)]
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "super::iso_date")]
    pub date_of_birth: Date,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    /// Free-text clinical notes.
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub medical_history: String,
    pub admission_status: PatientStatus,
    /// Stamped by the patient service on creation.
    #[serde(with = "super::iso_date")]
    pub registration_date: Date,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

record_kind!(Patient, "patients");

update_struct!(
    /// Partial update for a [`Patient`]; `Keep` fields are left as stored.
    PatientUpdate for Patient {
        first_name: String,
        last_name: String,
        date_of_birth: Date,
        gender: Gender,
        blood_group: BloodGroup,
        phone: String,
        email: String,
        address: String,
        emergency_contact: String,
        emergency_phone: String,
        allergies: String,
        medications: String,
        medical_history: String,
        admission_status: PatientStatus,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Change, Patch};
    use time::macros::date;

    const SAMPLE: &str = r#"{
        "Id": 3,
        "firstName": "Maria",
        "lastName": "Rodriguez",
        "dateOfBirth": "1978-11-02",
        "gender": "Female",
        "bloodGroup": "O-",
        "phone": "+1 (555) 010-2233",
        "email": "maria.r@example.com",
        "emergencyContact": "Luis Rodriguez",
        "emergencyPhone": "+1 555 010 9988",
        "admissionStatus": "Admitted",
        "registrationDate": "2024-03-14"
    }"#;

    #[test]
    fn parses_camel_case_record() {
        let patient: Patient = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(patient.id, 3);
        assert_eq!(patient.date_of_birth, date!(1978 - 11 - 02));
        assert_eq!(patient.blood_group, BloodGroup::ONegative);
        assert_eq!(patient.admission_status, PatientStatus::Admitted);
        assert!(patient.allergies.is_empty());
        assert_eq!(patient.full_name(), "Maria Rodriguez");
    }

    #[test]
    fn update_merges_only_set_fields() {
        let mut patient: Patient = serde_json::from_str(SAMPLE).unwrap();
        PatientUpdate {
            phone: Change::Set("555-0000".into()),
            admission_status: Change::Set(PatientStatus::Discharged),
            ..Default::default()
        }
        .apply(&mut patient);

        assert_eq!(patient.phone, "555-0000");
        assert_eq!(patient.admission_status, PatientStatus::Discharged);
        assert_eq!(patient.first_name, "Maria");
        assert_eq!(patient.email, "maria.r@example.com");
    }
}
