//! Trusted root parsing tests against realistic documents

use zkattest_trust_root::{
    select_certificate_authority, select_timestamp_authority, FulcioInstance, TrustedRoot,
};

const FULL_ROOT: &str = r#"{
    "mediaType": "application/vnd.dev.sigstore.trustedroot+json;version=0.1",
    "tlogs": [{
        "baseUrl": "https://rekor.sigstore.dev",
        "hashAlgorithm": "SHA2_256",
        "publicKey": {
            "rawBytes": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEYI4heOTrNrZO27elFE8ynfrdPMikttRkbe+vJKQ50G6bfwQ3WyhLpRwwwohelDAm8xRzJ56nYsIa3VHivVvpmA==",
            "keyDetails": "PKIX_ECDSA_P256_SHA_256",
            "validFor": {"start": "2021-01-12T11:53:27.000Z"}
        },
        "logId": {"keyId": "wNI9atQGlz+VWfO6LRygH4QUfY/8W4RFwiT5i5WRgB0="}
    }],
    "certificateAuthorities": [
        {
            "uri": "https://fulcio.sigstore.dev",
            "certChain": {"certificates": [{"rawBytes": "aW50ZXJtZWRpYXRl"}, {"rawBytes": "cm9vdA=="}]},
            "validFor": {"start": "2022-04-13T20:06:15.000Z"}
        },
        {
            "uri": "https://fulcio.githubapp.com",
            "certChain": {"certificates": [{"rawBytes": "Z2gtcm9vdA=="}]},
            "validFor": {"start": "2023-05-01T00:00:00.000Z"}
        }
    ],
    "timestampAuthorities": [{
        "uri": "https://timestamp.githubapp.com",
        "certChain": {"certificates": [{"rawBytes": "dHNhLWxlYWY="}, {"rawBytes": "dHNhLXJvb3Q="}]},
        "validFor": {"start": "2023-05-01T00:00:00.000Z", "end": "2033-05-01T00:00:00.000Z"}
    }]
}"#;

#[test]
fn parses_all_sections() {
    let root = TrustedRoot::from_json(FULL_ROOT).unwrap();
    assert_eq!(root.tlogs.len(), 1);
    assert_eq!(root.certificate_authorities.len(), 2);
    assert_eq!(root.timestamp_authorities.len(), 1);
}

#[test]
fn ca_chain_preserves_order() {
    let root = TrustedRoot::from_json(FULL_ROOT).unwrap();
    let chain = root.certificate_authorities[0].cert_chain.der_certificates();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0], b"intermediate");
    assert_eq!(chain[1], b"root");
}

#[test]
fn instance_selection_separates_deployments() {
    let root = TrustedRoot::from_json(FULL_ROOT).unwrap();
    // 2024-01-01, inside both windows
    let time = 1_704_067_200;

    let github = select_certificate_authority(&root, Some(FulcioInstance::Github), time).unwrap();
    assert_eq!(github.uri, "https://fulcio.githubapp.com");

    let public =
        select_certificate_authority(&root, Some(FulcioInstance::PublicGood), time).unwrap();
    assert_eq!(public.uri, "https://fulcio.sigstore.dev");
}

#[test]
fn tsa_selection_honors_window() {
    let root = TrustedRoot::from_json(FULL_ROOT).unwrap();
    assert!(select_timestamp_authority(&root, 1_704_067_200).is_ok());
    // before the TSA window opens
    assert!(select_timestamp_authority(&root, 1_600_000_000).is_err());
}

#[test]
fn jsonl_stream_merges_records() {
    let lines: Vec<String> = FULL_ROOT
        .split('\n')
        .map(|l| l.trim().to_string())
        .collect();
    let single_line = lines.join("");
    let jsonl = format!("{}\n{}", single_line, single_line);

    let merged = TrustedRoot::from_jsonl(&jsonl).unwrap();
    assert_eq!(merged.certificate_authorities.len(), 4);
    assert_eq!(merged.tlogs.len(), 2);
}
