//! Trust anchor selection
//!
//! Given a parsed trusted root and an input-derived signing time, pick the
//! entries whose validity windows bracket that time. During key rotation two
//! windows may overlap; the entry with the newest start wins, and a residual
//! tie is an error rather than a guess.

use crate::error::{Error, Result};
use crate::trusted_root::{CertificateAuthority, TimestampAuthority, TransparencyLog, TrustedRoot};
use zkattest_crypto::sha256;

/// A Fulcio deployment
///
/// The GitHub instance issues certificates for private-repo attestations;
/// the public-good instance serves everything else. Selection restricts CA
/// candidates to the requested deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulcioInstance {
    /// fulcio.sigstore.dev
    PublicGood,
    /// fulcio.githubapp.com
    Github,
}

impl FulcioInstance {
    /// True when the CA entry belongs to this deployment
    fn matches(&self, ca: &CertificateAuthority) -> bool {
        match self {
            FulcioInstance::PublicGood => ca.uri.contains("sigstore.dev"),
            FulcioInstance::Github => ca.uri.contains("githubapp.com"),
        }
    }
}

/// Select the certificate authority active at `signing_time`.
///
/// `instance` restricts the candidates to one Fulcio deployment; `None`
/// considers every CA in the root.
pub fn select_certificate_authority<'a>(
    root: &'a TrustedRoot,
    instance: Option<FulcioInstance>,
    signing_time: i64,
) -> Result<&'a CertificateAuthority> {
    let candidates = root
        .certificate_authorities
        .iter()
        .filter(|ca| instance.map_or(true, |i| i.matches(ca)));

    select_active(candidates, |ca| ca.valid_for.as_ref(), signing_time)
}

/// Select the timestamp authority active at `signing_time`.
pub fn select_timestamp_authority(
    root: &TrustedRoot,
    signing_time: i64,
) -> Result<&TimestampAuthority> {
    select_active(
        root.timestamp_authorities.iter(),
        |tsa| tsa.valid_for.as_ref(),
        signing_time,
    )
}

/// Select the transparency log whose `log_id` is the SHA-256 of its public
/// key, and check the entry's integration time against the key validity.
///
/// Returns the log entry together with its 32-byte log ID.
pub fn select_transparency_log<'a>(
    root: &'a TrustedRoot,
    log_id: &[u8],
    integrated_time: i64,
) -> Result<(&'a TransparencyLog, [u8; 32])> {
    for tlog in &root.tlogs {
        let computed = sha256(tlog.public_key.raw_bytes.as_bytes());
        if computed.as_slice() == log_id {
            if let Some(valid_for) = &tlog.public_key.valid_for {
                if !valid_for.contains(integrated_time)? {
                    return Err(Error::NoActiveEntry(integrated_time));
                }
            }
            return Ok((tlog, computed));
        }
    }
    Err(Error::LogNotFound(hex::encode(log_id)))
}

/// Pick the unique entry whose window brackets `time`, preferring the newest
/// start during rotation overlap.
fn select_active<'a, T, I, F>(entries: I, valid_for: F, time: i64) -> Result<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&'a T) -> Option<&'a crate::trusted_root::ValidityPeriod>,
{
    let mut best: Option<(&'a T, i64)> = None;
    let mut tied = false;

    for entry in entries {
        let period = valid_for(entry);
        let contains = match period {
            Some(p) => p.contains(time)?,
            // an entry without a window is always active
            None => true,
        };
        if !contains {
            continue;
        }

        let start = match period {
            Some(p) => p.start_unix()?.unwrap_or(i64::MIN),
            None => i64::MIN,
        };

        match &best {
            None => best = Some((entry, start)),
            Some((_, best_start)) => {
                if start > *best_start {
                    best = Some((entry, start));
                    tied = false;
                } else if start == *best_start {
                    tied = true;
                }
            }
        }
    }

    match best {
        None => Err(Error::NoActiveEntry(time)),
        Some(_) if tied => Err(Error::AmbiguousEntry(time)),
        Some((entry, _)) => Ok(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trusted_root::{CertChain, ValidityPeriod};

    fn ca(uri: &str, start: Option<&str>, end: Option<&str>) -> CertificateAuthority {
        CertificateAuthority {
            uri: uri.to_string(),
            cert_chain: CertChain {
                certificates: vec![],
            },
            valid_for: Some(ValidityPeriod {
                start: start.map(String::from),
                end: end.map(String::from),
            }),
        }
    }

    fn root_with(cas: Vec<CertificateAuthority>) -> TrustedRoot {
        TrustedRoot {
            certificate_authorities: cas,
            ..Default::default()
        }
    }

    // 2022-01-01T00:00:00Z
    const T0: &str = "2022-01-01T00:00:00Z";
    // 2023-01-01T00:00:00Z
    const T1: &str = "2023-01-01T00:00:00Z";
    const MID_2022: i64 = 1_656_633_600; // 2022-07-01
    const MID_2023: i64 = 1_688_169_600; // 2023-07-01

    #[test]
    fn test_select_active_window() {
        let root = root_with(vec![ca("https://fulcio.sigstore.dev", Some(T0), Some(T1))]);
        assert!(select_certificate_authority(&root, None, MID_2022).is_ok());
        assert!(matches!(
            select_certificate_authority(&root, None, MID_2023),
            Err(Error::NoActiveEntry(_))
        ));
    }

    #[test]
    fn test_rotation_prefers_newest_start() {
        // overlapping windows: the newer CA wins inside the grace period
        let old = ca("https://fulcio.sigstore.dev", Some("2021-01-01T00:00:00Z"), None);
        let new = ca("https://fulcio.sigstore.dev", Some(T0), None);
        let root = root_with(vec![old, new]);

        let selected = select_certificate_authority(&root, None, MID_2022).unwrap();
        assert_eq!(
            selected.valid_for.as_ref().unwrap().start.as_deref(),
            Some(T0)
        );
    }

    #[test]
    fn test_identical_starts_are_ambiguous() {
        let a = ca("https://fulcio.sigstore.dev", Some(T0), None);
        let b = ca("https://fulcio.sigstore.dev", Some(T0), None);
        let root = root_with(vec![a, b]);

        assert!(matches!(
            select_certificate_authority(&root, None, MID_2022),
            Err(Error::AmbiguousEntry(_))
        ));
    }

    #[test]
    fn test_instance_restriction() {
        let public = ca("https://fulcio.sigstore.dev", Some(T0), None);
        let github = ca("https://fulcio.githubapp.com", Some(T0), None);
        let root = root_with(vec![public, github]);

        let selected =
            select_certificate_authority(&root, Some(FulcioInstance::Github), MID_2022).unwrap();
        assert!(selected.uri.contains("githubapp.com"));

        let selected =
            select_certificate_authority(&root, Some(FulcioInstance::PublicGood), MID_2022)
                .unwrap();
        assert!(selected.uri.contains("sigstore.dev"));
    }

    #[test]
    fn test_no_window_means_always_active() {
        let mut entry = ca("https://fulcio.sigstore.dev", None, None);
        entry.valid_for = None;
        let root = root_with(vec![entry]);
        assert!(select_certificate_authority(&root, None, 0).is_ok());
    }

    #[test]
    fn test_select_transparency_log_by_key_hash() {
        let root = TrustedRoot::from_json(crate::trusted_root::tests::SAMPLE_TRUSTED_ROOT).unwrap();
        let key = root.tlogs[0].public_key.raw_bytes.as_bytes();
        let log_id = sha256(key);

        let (tlog, id) = select_transparency_log(&root, &log_id, 1_700_000_000).unwrap();
        assert_eq!(id, log_id);
        assert_eq!(tlog.base_url, "https://rekor.sigstore.dev");

        assert!(matches!(
            select_transparency_log(&root, &[0u8; 32], 1_700_000_000),
            Err(Error::LogNotFound(_))
        ));
    }

    #[test]
    fn test_transparency_log_key_validity() {
        let root = TrustedRoot::from_json(crate::trusted_root::tests::SAMPLE_TRUSTED_ROOT).unwrap();
        let log_id = sha256(root.tlogs[0].public_key.raw_bytes.as_bytes());

        // key validFor starts 2021-01-12; an integration time before that is
        // rejected
        assert!(matches!(
            select_transparency_log(&root, &log_id, 1_000_000_000),
            Err(Error::NoActiveEntry(_))
        ));
    }
}
