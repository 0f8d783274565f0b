//! Example: verify an attestation bundle and print its journal
//!
//! # Usage
//!
//! ```sh
//! cargo run -p zkattest-verify --example verify_bundle -- \
//!     attestation.sigstore.json trusted_root.jsonl
//! ```
//!
//! With identity requirements and an instance restriction:
//! ```sh
//! cargo run -p zkattest-verify --example verify_bundle -- \
//!     --expected-subject "repo:owner/repo:ref:refs/heads/main" \
//!     --expected-issuer "https://token.actions.githubusercontent.com" \
//!     --instance github \
//!     attestation.sigstore.json trusted_root.jsonl
//! ```
//!
//! Bundles can be downloaded with the GitHub CLI:
//! ```sh
//! gh attestation download <artifact-url> -o attestation.sigstore.json
//! ```

use zkattest_trust_root::TrustedRoot;
use zkattest_verify::{verify, FulcioInstance, VerificationOptions};

use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut options = VerificationOptions::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--expected-subject" => {
                i += 1;
                options.expected_subject = Some(require_value(&args, i, "--expected-subject"));
            }
            "--expected-issuer" => {
                i += 1;
                options.expected_issuer = Some(require_value(&args, i, "--expected-issuer"));
            }
            "--expected-digest" => {
                i += 1;
                let hex_digest = require_value(&args, i, "--expected-digest");
                match hex::decode(&hex_digest) {
                    Ok(digest) => options.expected_digest = Some(digest),
                    Err(e) => {
                        eprintln!("Error: invalid --expected-digest: {}", e);
                        process::exit(1);
                    }
                }
            }
            "--instance" => {
                i += 1;
                options.fulcio_instance = match require_value(&args, i, "--instance").as_str() {
                    "github" => Some(FulcioInstance::Github),
                    "public-good" => Some(FulcioInstance::PublicGood),
                    other => {
                        eprintln!("Error: unknown instance '{}' (github | public-good)", other);
                        process::exit(1);
                    }
                };
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                positional.push(arg.to_string());
            }
            unknown => {
                eprintln!("Error: unknown option: {}", unknown);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if positional.len() != 2 {
        eprintln!("Error: expected exactly 2 positional arguments (bundle and trusted root)");
        print_usage(&args[0]);
        process::exit(1);
    }

    let bundle_json = match fs::read(&positional[0]) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading bundle '{}': {}", positional[0], e);
            process::exit(1);
        }
    };

    let trusted_root = match fs::read_to_string(&positional[1])
        .map_err(|e| e.to_string())
        .and_then(|text| TrustedRoot::from_jsonl(&text).map_err(|e| e.to_string()))
    {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error loading trusted root '{}': {}", positional[1], e);
            process::exit(1);
        }
    };

    match verify(&bundle_json, &trusted_root, &options) {
        Ok(result) => {
            println!("Verification: SUCCESS");
            println!("  Signed at:      {}", result.timestamp);
            println!("  Proof type:     {:?}", result.timestamp_proof_type);
            println!("  Subject digest: {}", hex::encode(&result.subject_digest));
            if !result.oidc.subject.is_empty() {
                println!("  Subject:        {}", result.oidc.subject);
            }
            if !result.oidc.issuer.is_empty() {
                println!("  Issuer:         {}", result.oidc.issuer);
            }
            for (i, hash) in result.certificate_hashes.iter().enumerate() {
                println!("  Cert[{}]:        {}", i, hex::encode(hash));
            }
            println!("\nJournal: {}", hex::encode(result.to_journal()));
        }
        Err(e) => {
            eprintln!("Verification: FAILED (code {})", e.code());
            eprintln!("  {}", e);
            process::exit(1);
        }
    }
}

fn require_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires a value", flag);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS] <BUNDLE> <TRUSTED_ROOT>", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <BUNDLE>        Path to the attestation bundle (.sigstore.json)");
    eprintln!("  <TRUSTED_ROOT>  Path to the trusted root (JSON or JSONL)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --expected-subject <SUBJECT>  Required OIDC subject (exact match)");
    eprintln!("  --expected-issuer <ISSUER>    Required OIDC issuer (exact match)");
    eprintln!("  --expected-digest <HEX>       Required subject digest");
    eprintln!("  --instance <NAME>             Fulcio instance: github | public-good");
    eprintln!("  -h, --help                    Print this help message");
}
