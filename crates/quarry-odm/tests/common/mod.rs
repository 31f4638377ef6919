#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bson::Document as Attributes;
use quarry_collection::{
    Collection, CollectionError, Database, StoreError, WriteAck, WriteOptions,
};
use quarry_odm::validation::{length_of, presence_of};
use quarry_odm::{Model, ValidationErrors};

// ── Models ──────────────────────────────────────────────────────

pub struct Patient;

impl Model for Patient {
    const NAME: &'static str = "Patient";
    const COLLECTION: &'static str = "patients";

    fn validate(attributes: &Attributes, errors: &mut ValidationErrors) {
        presence_of(attributes, "title", errors);
    }
}

pub struct Person;

impl Model for Person {
    const NAME: &'static str = "Person";
    const COLLECTION: &'static str = "people";

    fn validate(attributes: &Attributes, errors: &mut ValidationErrors) {
        length_of(attributes, "ssn", 11..=11, errors);
    }
}

pub struct Address;

impl Model for Address {
    const NAME: &'static str = "Address";
    const COLLECTION: &'static str = "addresses";

    fn validate(attributes: &Attributes, errors: &mut ValidationErrors) {
        presence_of(attributes, "street", errors);
    }
}

// ── Recording collection ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert {
        collection: String,
        attributes: Attributes,
        options: WriteOptions,
    },
    Update {
        collection: String,
        selector: Attributes,
        modifier: Attributes,
        options: WriteOptions,
    },
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    fail_with: Mutex<Option<String>>,
}

/// Database double that records every wire call and acknowledges it, or
/// fails it with a store error when told to.
#[derive(Clone, Default)]
pub struct RecordingDatabase {
    recorder: Arc<Recorder>,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorder.calls.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, message: &str) {
        *self.recorder.fail_with.lock().unwrap() = Some(message.to_string());
    }
}

impl Database for RecordingDatabase {
    type Collection = RecordingCollection;

    fn collection(&self, name: &str) -> RecordingCollection {
        RecordingCollection {
            name: name.to_string(),
            recorder: Arc::clone(&self.recorder),
        }
    }
}

pub struct RecordingCollection {
    name: String,
    recorder: Arc<Recorder>,
}

impl RecordingCollection {
    fn record(&self, call: Call) -> Result<WriteAck, CollectionError> {
        self.recorder.calls.lock().unwrap().push(call);
        match self.recorder.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(CollectionError::Store(StoreError::Backend(message.clone()))),
            None => Ok(WriteAck::Acknowledged { n: 1 }),
        }
    }
}

impl Collection for RecordingCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(
        &self,
        attributes: &Attributes,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError> {
        self.record(Call::Insert {
            collection: self.name.clone(),
            attributes: attributes.clone(),
            options: *options,
        })
    }

    fn update(
        &self,
        selector: &Attributes,
        modifier: &Attributes,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError> {
        self.record(Call::Update {
            collection: self.name.clone(),
            selector: selector.clone(),
            modifier: modifier.clone(),
            options: *options,
        })
    }
}
