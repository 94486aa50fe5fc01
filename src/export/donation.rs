// src/export/donation.rs
//! JSON payloads handed to the donation sink on consent or decline.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};
use tracing::info;

use crate::pipeline::DatasetOutput;

/// Session-scoped identifier every payload of one attempt is stored under.
pub fn donation_key(session_id: &str, donation_key: &str) -> String {
    format!("{}-{}", session_id, donation_key)
}

#[derive(Debug, Serialize)]
pub struct DonatedTable {
    pub name: &'static str,
    pub title: &'static str,
    pub data: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct DonationPayload {
    pub key: String,
    pub tables: Vec<DonatedTable>,
}

#[derive(Debug, Serialize)]
pub struct DeclinePayload {
    pub key: String,
    pub status: &'static str,
}

/// What the user consented to share: every table, markers included, titled in `locale`.
pub fn donation_payload(key: &str, outputs: &[DatasetOutput], locale: &str) -> DonationPayload {
    DonationPayload {
        key: key.to_string(),
        tables: outputs
            .iter()
            .map(|out| DonatedTable {
                name: out.name,
                title: out.title.get(locale),
                data: out.table.to_records(),
            })
            .collect(),
    }
}

pub fn decline_payload(key: &str) -> DeclinePayload {
    DeclinePayload {
        key: key.to_string(),
        status: "donation declined",
    }
}

/// Serialize `payload` to `<dir>/<key>.json`.
pub fn write_payload<T: Serialize>(payload: &T, key: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    let path = dir.join(format!("{}.json", key));
    let file = File::create(&path).with_context(|| format!("creating {:?}", &path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), payload)
        .with_context(|| format!("writing {:?}", &path))?;
    info!(path = %path.display(), "wrote donation payload");
    Ok(())
}
