//! Data models for wardboard.
//!
//! Every record is a flat struct with snake_case fields. The serialized form is
//! camelCase with a capitalised `Id`, which is what the seed files and the record
//! stores exchange. Relationships between records are plain numeric ids; nothing
//! here checks that a referenced patient or doctor actually exists.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Declares a closed set of labels with a fixed wire/display string per variant.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Declares a partial-update struct whose fields are all `Change<T>`.
macro_rules! update_struct {
    ($(#[$meta:meta])* $name:ident for $record:ty { $($field:ident: $ty:ty),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(pub $field: crate::models::Change<$ty>),+
        }

        impl crate::models::Patch<$record> for $name {
            fn apply(self, record: &mut $record) {
                $(self.$field.apply_to(&mut record.$field);)+
            }
        }
    };
}

/// Implements `Record` for a struct with an `id: u64` field.
macro_rules! record_kind {
    ($record:ty, $kind:literal) => {
        impl crate::models::Record for $record {
            const KIND: &'static str = $kind;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}

mod admission;
mod appointment;
mod change;
mod department;
mod patient;
mod queue;
pub mod reference;
mod staff;

pub use admission::{Admission, AdmissionStatus, AdmissionUpdate, DischargeDetails};
pub use appointment::{Appointment, AppointmentStatus, AppointmentUpdate};
pub use change::{Change, Patch};
pub use department::{percent, Department, DepartmentUpdate, OccupancyLevel};
pub use patient::{BloodGroup, Gender, Patient, PatientStatus, PatientUpdate};
pub use queue::{CheckIn, QueueEntry, QueueStatus};
pub use staff::{Availability, StaffMember, StaffUpdate};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

/// A record kind that can live in a `RecordStore`.
pub trait Record: Clone + Serialize + DeserializeOwned + 'static {
    /// Collection name; doubles as the SQLite table name.
    const KIND: &'static str;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);
}

/// A label that is not one of an enum's known variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in QueueStatus::ALL {
            assert_eq!(QueueStatus::from_str(status.as_str()).unwrap(), *status);
        }
        assert_eq!(
            AppointmentStatus::from_str("No Show").unwrap(),
            AppointmentStatus::NoShow
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = Availability::from_str("Asleep").unwrap_err();
        assert_eq!(err.kind, "Availability");
        assert_eq!(err.value, "Asleep");
    }

    #[test]
    fn labels_are_the_wire_form() {
        let json = serde_json::to_string(&BloodGroup::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
        let parsed: Availability = serde_json::from_str("\"On Call\"").unwrap();
        assert_eq!(parsed, Availability::OnCall);
    }
}
