//! Demo dataset loading.
//!
//! The embedded JSON files describe one hospital day, 2024-06-03. Dated fields
//! are shifted by whole days so that day becomes "today" when the data is
//! loaded; times of day are kept.

use super::{Query, RecordStore, Stores};
use crate::models::{Admission, Appointment, QueueEntry, Record};
use anyhow::{Context, Result};
use std::collections::HashMap;
use time::macros::date;
use time::Date;

const PATIENTS: &str = include_str!("../../data/patients.json");
const APPOINTMENTS: &str = include_str!("../../data/appointments.json");
const STAFF: &str = include_str!("../../data/staff.json");
const DEPARTMENTS: &str = include_str!("../../data/departments.json");
const ADMISSIONS: &str = include_str!("../../data/admissions.json");
const QUEUE: &str = include_str!("../../data/queue.json");

/// The day the demo files were written for.
const DEMO_DAY: Date = date!(2024 - 06 - 03);

/// Parses a JSON array of records.
pub fn load<R: Record>(json: &str) -> Result<Vec<R>> {
    serde_json::from_str(json).with_context(|| format!("Invalid {} seed data", R::KIND))
}

/// Seed-file id to the id the store assigned.
type IdMap = HashMap<u64, u64>;

fn is_empty<R: Record>(store: &dyn RecordStore<R>) -> Result<bool> {
    Ok(store.query(&Query::all())?.is_empty())
}

/// Inserts `records` and maps each one's seed-file id to its stored id.
/// Rejected records are logged and left out of the map.
pub fn seed_records<R: Record>(store: &mut dyn RecordStore<R>, records: Vec<R>) -> Result<IdMap> {
    let seed_ids: Vec<u64> = records.iter().map(Record::id).collect();
    let mut ids = IdMap::with_capacity(seed_ids.len());
    for (seed_id, outcome) in seed_ids.into_iter().zip(store.create_batch(records)?) {
        match outcome {
            Ok(stored) => {
                ids.insert(seed_id, stored.id());
            }
            Err(failure) => tracing::warn!(kind = R::KIND, seed_id, %failure, "Seed record rejected"),
        }
    }
    tracing::info!(kind = R::KIND, stored = ids.len(), "Seeded demo records");
    Ok(ids)
}

/// The stored id for a seed-file reference. Unknown references are kept as-is.
fn remap(ids: &IdMap, id: u64) -> u64 {
    ids.get(&id).copied().unwrap_or(id)
}

/// Loads the embedded demo dataset, moved to `today`, when every store is
/// empty. The records reference each other by id, so a partly populated
/// database is left alone, and references are rewritten to whatever ids the
/// stores hand out.
pub fn seed_demo_data(stores: &mut Stores, today: Date) -> Result<()> {
    let empty = is_empty(stores.patients.as_ref())?
        && is_empty(stores.appointments.as_ref())?
        && is_empty(stores.staff.as_ref())?
        && is_empty(stores.departments.as_ref())?
        && is_empty(stores.admissions.as_ref())?
        && is_empty(stores.queue.as_ref())?;
    if !empty {
        tracing::debug!("Stores already populated, skipping demo data");
        return Ok(());
    }
    let shift = today - DEMO_DAY;

    let departments = seed_records(stores.departments.as_mut(), load(DEPARTMENTS)?)?;
    let staff = seed_records(stores.staff.as_mut(), load(STAFF)?)?;
    let patients = seed_records(stores.patients.as_mut(), load(PATIENTS)?)?;

    let mut appointments: Vec<Appointment> = load(APPOINTMENTS)?;
    for appointment in &mut appointments {
        appointment.patient_id = remap(&patients, appointment.patient_id);
        appointment.doctor_id = remap(&staff, appointment.doctor_id);
        appointment.date += shift;
        appointment.created_at += shift;
    }
    seed_records(stores.appointments.as_mut(), appointments)?;

    let mut admissions: Vec<Admission> = load(ADMISSIONS)?;
    for admission in &mut admissions {
        admission.patient_id = remap(&patients, admission.patient_id);
        admission.department_id = remap(&departments, admission.department_id);
        admission.attending_doctor_id = remap(&staff, admission.attending_doctor_id);
        admission.admission_date += shift;
        admission.estimated_discharge = admission.estimated_discharge.map(|d| d + shift);
        admission.actual_discharge = admission.actual_discharge.map(|d| d + shift);
    }
    seed_records(stores.admissions.as_mut(), admissions)?;

    let mut queue: Vec<QueueEntry> = load(QUEUE)?;
    for entry in &mut queue {
        entry.patient_id = remap(&patients, entry.patient_id);
        entry.department_id = remap(&departments, entry.department_id);
        entry.check_in_time += shift;
        entry.completed_at = entry.completed_at.map(|t| t + shift);
        entry.updated_at = entry.updated_at.map(|t| t + shift);
    }
    seed_records(stores.queue.as_mut(), queue)?;

    Ok(())
}
