//! Patient and prescription records kept alongside the documents.
//!
//! Patients are keyed by phone number. Issuing a prescription looks the
//! patient up (creating them on first visit) and appends the prescription to
//! a log against their record.

use crate::model::PrescriptionRequest;
use crate::DocError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: u64,
    pub name: String,
    pub age: String,
    pub sex: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// A patient not yet in the directory
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub age: String,
    pub sex: String,
    pub phone_number: String,
}

impl From<&PrescriptionRequest> for NewPatient {
    fn from(request: &PrescriptionRequest) -> NewPatient {
        NewPatient {
            name: request.patient_name.clone(),
            age: request.age.clone(),
            sex: request.sex.clone(),
            phone_number: request.phone_number.clone(),
        }
    }
}

pub trait PatientDirectory {
    fn find_by_phone(&self, phone_number: &str) -> Result<Option<PatientRecord>, DocError>;

    fn create(&mut self, patient: NewPatient) -> Result<PatientRecord, DocError>;

    /// The patient with this phone number, created if unknown
    fn get_or_create(&mut self, patient: NewPatient) -> Result<PatientRecord, DocError> {
        match self.find_by_phone(&patient.phone_number)? {
            Some(existing) => {
                debug!("found patient {} by phone number", existing.id);
                Ok(existing)
            }
            None => self.create(patient),
        }
    }
}

/// One issued prescription, as logged
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionEntry {
    pub patient_id: u64,
    pub prescription: PrescriptionRequest,
    pub issued_at: DateTime<Utc>,
}

pub trait RecordLog {
    fn append(&mut self, entry: PrescriptionEntry) -> Result<(), DocError>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    patients: Vec<PatientRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> InMemoryDirectory {
        InMemoryDirectory::default()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Most recently created first
    pub fn patients(&self) -> impl Iterator<Item = &PatientRecord> {
        self.patients.iter().rev()
    }
}

impl PatientDirectory for InMemoryDirectory {
    fn find_by_phone(&self, phone_number: &str) -> Result<Option<PatientRecord>, DocError> {
        Ok(self
            .patients
            .iter()
            .find(|p| p.phone_number == phone_number)
            .cloned())
    }

    fn create(&mut self, patient: NewPatient) -> Result<PatientRecord, DocError> {
        let record = PatientRecord {
            id: self.patients.len() as u64 + 1,
            name: patient.name,
            age: patient.age,
            sex: patient.sex,
            phone_number: patient.phone_number,
            created_at: Utc::now(),
        };
        info!("created patient {} ({})", record.id, record.name);
        self.patients.push(record.clone());
        Ok(record)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryLog {
    entries: Vec<PrescriptionEntry>,
}

impl InMemoryLog {
    pub fn new() -> InMemoryLog {
        InMemoryLog::default()
    }

    pub fn entries(&self) -> &[PrescriptionEntry] {
        &self.entries
    }

    pub fn for_patient(&self, patient_id: u64) -> impl Iterator<Item = &PrescriptionEntry> {
        self.entries.iter().filter(move |e| e.patient_id == patient_id)
    }
}

impl RecordLog for InMemoryLog {
    fn append(&mut self, entry: PrescriptionEntry) -> Result<(), DocError> {
        self.entries.push(entry);
        Ok(())
    }
}

/// File a prescription against its patient, registering the patient on their
/// first visit
pub fn record_prescription<D, L>(
    request: &PrescriptionRequest,
    directory: &mut D,
    log: &mut L,
) -> Result<PatientRecord, DocError>
where
    D: PatientDirectory + ?Sized,
    L: RecordLog + ?Sized,
{
    let patient = directory.get_or_create(NewPatient::from(request))?;
    log.append(PrescriptionEntry {
        patient_id: patient.id,
        prescription: request.clone(),
        issued_at: Utc::now(),
    })?;
    Ok(patient)
}
