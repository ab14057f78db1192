//! Form validation.
//!
//! Forms hold exactly what the user typed. Validating one either yields the
//! record to submit or every problem found, keyed by field, so the view can
//! show them all at once.

use crate::models::{
    BloodGroup, CheckIn, Department, Gender, Patient, PatientStatus,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use time::macros::format_description;
use time::Date;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").unwrap());

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Records `message` for `field` unless the field already has one.
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    }
}

/// Loose `x@y.z` check; anything stricter rejects real addresses.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Digits with optional `+`, spaces, dashes and brackets.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

/// Parses a `YYYY-MM-DD` form value.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub gender: Option<Gender>,
    pub blood_group: Option<BloodGroup>,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub allergies: String,
    pub medications: String,
    pub medical_history: String,
    pub admission_status: PatientStatus,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: String::new(),
            gender: None,
            blood_group: None,
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            emergency_contact: String::new(),
            emergency_phone: String::new(),
            allergies: String::new(),
            medications: String::new(),
            medical_history: String::new(),
            admission_status: PatientStatus::Outpatient,
        }
    }
}

impl PatientForm {
    /// Checks the form as of `today` and builds the patient to register.
    pub fn validate(&self, today: Date) -> Result<Patient, FieldErrors> {
        let mut errors = FieldErrors::default();

        required(&mut errors, "first_name", &self.first_name, "First name");
        required(&mut errors, "last_name", &self.last_name, "Last name");
        required(&mut errors, "date_of_birth", &self.date_of_birth, "Date of birth");
        if self.gender.is_none() {
            errors.add("gender", "Gender is required");
        }
        if self.blood_group.is_none() {
            errors.add("blood_group", "Blood group is required");
        }
        required(&mut errors, "phone", &self.phone, "Phone number");
        required(
            &mut errors,
            "emergency_contact",
            &self.emergency_contact,
            "Emergency contact",
        );
        required(
            &mut errors,
            "emergency_phone",
            &self.emergency_phone,
            "Emergency phone",
        );

        let email = self.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            errors.add("email", "Invalid email format");
        }
        let phone = self.phone.trim();
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.add("phone", "Invalid phone format");
        }
        let emergency_phone = self.emergency_phone.trim();
        if !emergency_phone.is_empty() && !is_valid_phone(emergency_phone) {
            errors.add("emergency_phone", "Invalid emergency phone format");
        }

        let date_of_birth = if self.date_of_birth.trim().is_empty() {
            None
        } else {
            match parse_date(&self.date_of_birth) {
                Some(date) if date > today => {
                    errors.add("date_of_birth", "Date of birth cannot be in the future");
                    None
                }
                Some(date) => Some(date),
                None => {
                    errors.add("date_of_birth", "Date of birth must be YYYY-MM-DD");
                    None
                }
            }
        };

        match (date_of_birth, self.gender, self.blood_group) {
            (Some(date_of_birth), Some(gender), Some(blood_group)) if errors.is_empty() => {
                Ok(Patient {
                    id: 0,
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    date_of_birth,
                    gender,
                    blood_group,
                    phone: phone.to_string(),
                    email: email.to_string(),
                    address: self.address.trim().to_string(),
                    emergency_contact: self.emergency_contact.trim().to_string(),
                    emergency_phone: emergency_phone.to_string(),
                    allergies: self.allergies.trim().to_string(),
                    medications: self.medications.trim().to_string(),
                    medical_history: self.medical_history.trim().to_string(),
                    admission_status: self.admission_status,
                    registration_date: today,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Parses a required positive integer id.
fn positive_id(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> u64 {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
        return 0;
    }
    match value.parse::<u64>() {
        Ok(id) if id > 0 => id,
        _ => {
            errors.add(field, format!("{label} must be a positive number"));
            0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInForm {
    pub patient_id: String,
    pub department_id: String,
    pub notes: String,
}

impl CheckInForm {
    pub fn validate(&self) -> Result<CheckIn, FieldErrors> {
        let mut errors = FieldErrors::default();
        let patient_id = positive_id(&mut errors, "patient_id", &self.patient_id, "Patient ID");
        let department_id =
            positive_id(&mut errors, "department_id", &self.department_id, "Department ID");
        errors.into_result(|| CheckIn {
            patient_id,
            department_id,
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentForm {
    pub name: String,
    pub floor: String,
    pub head_of_department: String,
    pub phone: String,
    pub total_beds: String,
    pub occupied_beds: String,
}

fn bed_count(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> u32 {
    let value = value.trim();
    if value.is_empty() {
        return 0;
    }
    value.parse().unwrap_or_else(|_| {
        errors.add(field, format!("{label} must be a whole number"));
        0
    })
}

impl DepartmentForm {
    pub fn validate(&self) -> Result<Department, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "name", &self.name, "Department name");
        let phone = self.phone.trim();
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.add("phone", "Invalid phone format");
        }
        let total_beds = bed_count(&mut errors, "total_beds", &self.total_beds, "Total beds");
        let occupied_beds =
            bed_count(&mut errors, "occupied_beds", &self.occupied_beds, "Occupied beds");
        if occupied_beds > total_beds {
            errors.add("occupied_beds", "Occupied beds cannot exceed total beds");
        }

        errors.into_result(|| Department {
            id: 0,
            name: self.name.trim().to_string(),
            floor: self.floor.trim().to_string(),
            head_of_department: self.head_of_department.trim().to_string(),
            phone: phone.to_string(),
            total_beds,
            occupied_beds,
        })
    }
}
