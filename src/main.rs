use anyhow::{Context, Result};
use glob::glob;
use instaddp::{
    annotations::{FeatureDetector, NoDetector, PrecomputedDetector},
    archive::ArchiveStatus,
    config::Config,
    export::{self, donation_key},
    extract::NameList,
    pipeline::{open_validated, run},
};
use std::{env, fs::File, path::Path, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_ZIP_GLOB: &str = "zips/*.zip";

/// What the user is asked to do when a package is rejected.
fn retry_prompt(status: ArchiveStatus) -> &'static str {
    match status {
        ArchiveStatus::InvalidWrongFormat => {
            "export was made as HTML; request a new download in JSON format"
        }
        ArchiveStatus::InvalidNotRecognized => {
            "file is not an Instagram data download; select the zip you received"
        }
        ArchiveStatus::InvalidUnreadable => {
            "file could not be read as a zip archive; try downloading it again"
        }
        ArchiveStatus::Valid => "no action needed",
    }
}

fn main() -> Result<()> {
    // ─── 1) config + logging ─────────────────────────────────────────
    let config = Config::from_env()?;
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!(session = %config.session_id, locale = %config.locale, "startup");

    // ─── 2) reference data ───────────────────────────────────────────
    // a missing name list is a setup problem, not something a retry fixes
    let names = NameList::load(&config.names_path)
        .with_context(|| format!("first-name list {:?}", config.names_path))?;
    let detector: Box<dyn FeatureDetector> = match &config.annotations_path {
        Some(path) => Box::new(PrecomputedDetector::load(path)?),
        None => Box::new(NoDetector),
    };

    // ─── 3) discover archives ────────────────────────────────────────
    // `instaddp [--decline] [<zip glob>]`
    let mut declined = false;
    let mut pattern = DEFAULT_ZIP_GLOB.to_string();
    for arg in env::args().skip(1) {
        if arg == "--decline" {
            declined = true;
        } else {
            pattern = arg;
        }
    }
    let zips: Vec<_> = glob(&pattern)
        .with_context(|| format!("bad glob {:?}", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("skipping unreadable path: {}", e);
                None
            }
        })
        .collect();
    if zips.is_empty() {
        info!(pattern = %pattern, "no archives; exit");
        return Ok(());
    }
    info!("{} archive(s) to process", zips.len());

    // ─── 4) extract each archive ─────────────────────────────────────
    let mut failures = 0;
    for zip_path in &zips {
        if let Err(e) = process_archive(zip_path, &config, &names, detector.as_ref(), declined) {
            error!(archive = %zip_path.display(), "failed: {:#}", e);
            failures += 1;
        }
    }

    info!(processed = zips.len() - failures, failures, "all done");
    Ok(())
}

fn process_archive(
    zip_path: &Path,
    config: &Config,
    names: &NameList,
    detector: &dyn FeatureDetector,
    declined: bool,
) -> Result<()> {
    let t0 = Instant::now();
    let stem = zip_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("archive has no usable file name")?;
    let key = donation_key(&config.session_id, &config.donation_key);

    let file = File::open(zip_path).with_context(|| format!("opening {:?}", zip_path))?;
    let archive = match open_validated(file) {
        Ok(a) => a,
        Err(status) => {
            error!(
                archive = %zip_path.display(),
                status = status.as_str(),
                "rejected: {}",
                retry_prompt(status)
            );
            return Ok(());
        }
    };

    let outputs = run(archive, names, detector);

    let extracted = outputs.iter().filter(|o| !o.is_marker()).count();
    if extracted == 0 {
        warn!(archive = %zip_path.display(), "no dataset could be extracted");
    }

    export::write_outputs(&outputs, &config.output_dir.join(stem))?;
    let payload_name = format!("{}-{}", key, stem);
    if declined {
        info!(archive = %zip_path.display(), "donation declined");
        export::write_payload(&export::decline_payload(&key), &payload_name, &config.output_dir)?;
    } else {
        let payload = export::donation_payload(&key, &outputs, &config.locale);
        export::write_payload(&payload, &payload_name, &config.output_dir)?;
    }

    info!(
        archive = %zip_path.display(),
        extracted,
        elapsed = ?t0.elapsed(),
        "archive done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_rejection_has_its_own_prompt() {
        let prompts = [
            retry_prompt(ArchiveStatus::InvalidWrongFormat),
            retry_prompt(ArchiveStatus::InvalidNotRecognized),
            retry_prompt(ArchiveStatus::InvalidUnreadable),
            retry_prompt(ArchiveStatus::Valid),
        ];
        for (i, a) in prompts.iter().enumerate() {
            for b in &prompts[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(!retry_prompt(ArchiveStatus::Valid).contains("could not be read"));
    }
}
