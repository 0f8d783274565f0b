//! Canonical journal encoding
//!
//! The journal is the public output of the guest program. It opens with a
//! 9-byte prelude (big-endian timestamp and proof-type byte) so downstream
//! callers can route without a full decode, followed by a 32-byte reserved
//! word and an Ethereum-ABI tuple that on-chain code can `abi.decode`
//! directly.
//!
//! Tuple layout, in order:
//!
//! ```text
//! bytes32[] certificate_hashes
//! bytes     subject_digest
//! uint8     subject_digest_algorithm
//! string    oidc_issuer
//! string    oidc_subject
//! string    oidc_workflow_ref
//! string    oidc_repository
//! string    oidc_event_name
//! bytes32[] tsa_chain_hashes
//! uint8     message_imprint_algorithm
//! bytes     message_imprint
//! bytes32   rekor_log_id
//! uint64    rekor_log_index
//! uint64    rekor_entry_index
//! ```
//!
//! Unused blocks encode as zero-length arrays and zero integers, never
//! omitted, so equal results always produce byte-identical journals.

use crate::error::{Error, Result};
use crate::result::{DigestAlgorithm, OidcIdentity, TimestampProofType, VerificationResult};

/// Prelude length: 8-byte timestamp + 1-byte proof type
const PRELUDE_LEN: usize = 9;
/// Reserved word between the prelude and the ABI tuple
const RESERVED_LEN: usize = 32;
/// ABI word size
const WORD: usize = 32;
/// Number of head slots in the tuple
const HEAD_SLOTS: usize = 14;

impl VerificationResult {
    /// Encode the result into canonical journal bytes
    pub fn to_journal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PRELUDE_LEN + RESERVED_LEN + HEAD_SLOTS * WORD + 512);

        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.push(self.timestamp_proof_type as u8);
        out.extend_from_slice(&[0u8; RESERVED_LEN]);

        out.extend_from_slice(&encode_tuple(self));
        out
    }

    /// Decode a journal produced by [`VerificationResult::to_journal`]
    pub fn from_journal(journal: &[u8]) -> Result<Self> {
        if journal.len() < PRELUDE_LEN + RESERVED_LEN + HEAD_SLOTS * WORD {
            return Err(Error::MalformedEncoding("journal too short".to_string()));
        }

        let mut ts_bytes = [0u8; 8];
        ts_bytes.copy_from_slice(&journal[..8]);
        let timestamp = u64::from_be_bytes(ts_bytes);

        let timestamp_proof_type = TimestampProofType::from_u8(journal[8]).ok_or_else(|| {
            Error::MalformedEncoding(format!("invalid proof type byte {}", journal[8]))
        })?;

        let tuple = &journal[PRELUDE_LEN + RESERVED_LEN..];
        let mut result = decode_tuple(tuple)?;
        result.timestamp = timestamp;
        result.timestamp_proof_type = timestamp_proof_type;
        Ok(result)
    }
}

fn word_u64(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_u8(value: u8) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[31] = value;
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Append a `bytes`/`string` tail: length word plus zero-padded data
fn push_bytes_tail(tail: &mut Vec<u8>, data: &[u8]) {
    tail.extend_from_slice(&word_u64(data.len() as u64));
    tail.extend_from_slice(data);
    tail.resize(tail.len() + padded_len(data.len()) - data.len(), 0);
}

/// Append a `bytes32[]` tail: length word plus one word per element
fn push_hashes_tail(tail: &mut Vec<u8>, hashes: &[[u8; 32]]) {
    tail.extend_from_slice(&word_u64(hashes.len() as u64));
    for hash in hashes {
        tail.extend_from_slice(hash);
    }
}

fn encode_tuple(result: &VerificationResult) -> Vec<u8> {
    let head_len = HEAD_SLOTS * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    // dynamic slots carry the offset from the tuple start to their tail
    let offset_slot = |tail: &Vec<u8>| word_u64((head_len + tail.len()) as u64);

    head.extend_from_slice(&offset_slot(&tail));
    push_hashes_tail(&mut tail, &result.certificate_hashes);

    head.extend_from_slice(&offset_slot(&tail));
    push_bytes_tail(&mut tail, &result.subject_digest);

    head.extend_from_slice(&word_u8(result.subject_digest_algorithm as u8));

    for field in [
        &result.oidc.issuer,
        &result.oidc.subject,
        &result.oidc.workflow_ref,
        &result.oidc.repository,
        &result.oidc.event_name,
    ] {
        head.extend_from_slice(&offset_slot(&tail));
        push_bytes_tail(&mut tail, field.as_bytes());
    }

    head.extend_from_slice(&offset_slot(&tail));
    push_hashes_tail(&mut tail, &result.tsa_chain_hashes);

    head.extend_from_slice(&word_u8(result.message_imprint_algorithm as u8));

    head.extend_from_slice(&offset_slot(&tail));
    push_bytes_tail(&mut tail, &result.message_imprint);

    head.extend_from_slice(&result.rekor_log_id);
    head.extend_from_slice(&word_u64(result.rekor_log_index));
    head.extend_from_slice(&word_u64(result.rekor_entry_index));

    debug_assert_eq!(head.len(), head_len);

    head.extend_from_slice(&tail);
    head
}

struct TupleReader<'a> {
    data: &'a [u8],
    slot: usize,
}

impl<'a> TupleReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, slot: 0 }
    }

    fn next_word(&mut self) -> Result<&'a [u8]> {
        let start = self.slot * WORD;
        self.slot += 1;
        self.data
            .get(start..start + WORD)
            .ok_or_else(|| Error::MalformedEncoding("journal tuple truncated".to_string()))
    }

    fn next_u64(&mut self) -> Result<u64> {
        let word = self.next_word()?;
        if word[..24].iter().any(|&b| b != 0) {
            return Err(Error::MalformedEncoding(
                "integer word exceeds 64 bits".to_string(),
            ));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&word[24..]);
        Ok(u64::from_be_bytes(bytes))
    }

    fn next_u8(&mut self) -> Result<u8> {
        let value = self.next_u64()?;
        u8::try_from(value)
            .map_err(|_| Error::MalformedEncoding("uint8 word out of range".to_string()))
    }

    fn next_bytes32(&mut self) -> Result<[u8; 32]> {
        let word = self.next_word()?;
        let mut out = [0u8; 32];
        out.copy_from_slice(word);
        Ok(out)
    }

    fn read_len_at(&self, offset: usize) -> Result<(usize, usize)> {
        let word = self
            .data
            .get(offset..offset + WORD)
            .ok_or_else(|| Error::MalformedEncoding("tail offset out of bounds".to_string()))?;
        if word[..24].iter().any(|&b| b != 0) {
            return Err(Error::MalformedEncoding("tail length too large".to_string()));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&word[24..]);
        let len = u64::from_be_bytes(bytes) as usize;
        Ok((offset + WORD, len))
    }

    fn bytes_at(&self, offset: usize) -> Result<Vec<u8>> {
        let (data_start, len) = self.read_len_at(offset)?;
        self.data
            .get(data_start..data_start + len)
            .map(|s| s.to_vec())
            .ok_or_else(|| Error::MalformedEncoding("tail data out of bounds".to_string()))
    }

    fn string_at(&self, offset: usize) -> Result<String> {
        String::from_utf8(self.bytes_at(offset)?)
            .map_err(|_| Error::MalformedEncoding("journal string is not UTF-8".to_string()))
    }

    fn hashes_at(&self, offset: usize) -> Result<Vec<[u8; 32]>> {
        let (data_start, count) = self.read_len_at(offset)?;
        let end = data_start
            .checked_add(count.checked_mul(WORD).ok_or_else(|| {
                Error::MalformedEncoding("hash array length overflow".to_string())
            })?)
            .ok_or_else(|| Error::MalformedEncoding("hash array length overflow".to_string()))?;
        let data = self
            .data
            .get(data_start..end)
            .ok_or_else(|| Error::MalformedEncoding("hash array out of bounds".to_string()))?;

        Ok(data
            .chunks_exact(WORD)
            .map(|chunk| {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect())
    }
}

fn decode_tuple(tuple: &[u8]) -> Result<VerificationResult> {
    let mut reader = TupleReader::new(tuple);

    let certificate_hashes_off = reader.next_u64()? as usize;
    let subject_digest_off = reader.next_u64()? as usize;
    let subject_digest_algorithm = reader.next_u8()?;
    let issuer_off = reader.next_u64()? as usize;
    let subject_off = reader.next_u64()? as usize;
    let workflow_ref_off = reader.next_u64()? as usize;
    let repository_off = reader.next_u64()? as usize;
    let event_name_off = reader.next_u64()? as usize;
    let tsa_chain_hashes_off = reader.next_u64()? as usize;
    let message_imprint_algorithm = reader.next_u8()?;
    let message_imprint_off = reader.next_u64()? as usize;
    let rekor_log_id = reader.next_bytes32()?;
    let rekor_log_index = reader.next_u64()?;
    let rekor_entry_index = reader.next_u64()?;

    Ok(VerificationResult {
        // prelude fields are filled by the caller
        timestamp: 0,
        timestamp_proof_type: TimestampProofType::None,
        certificate_hashes: reader.hashes_at(certificate_hashes_off)?,
        subject_digest: reader.bytes_at(subject_digest_off)?,
        subject_digest_algorithm: DigestAlgorithm::from_u8(subject_digest_algorithm)
            .ok_or_else(|| Error::MalformedEncoding("invalid digest algorithm".to_string()))?,
        oidc: OidcIdentity {
            issuer: reader.string_at(issuer_off)?,
            subject: reader.string_at(subject_off)?,
            workflow_ref: reader.string_at(workflow_ref_off)?,
            repository: reader.string_at(repository_off)?,
            event_name: reader.string_at(event_name_off)?,
        },
        tsa_chain_hashes: reader.hashes_at(tsa_chain_hashes_off)?,
        message_imprint_algorithm: DigestAlgorithm::from_u8(message_imprint_algorithm)
            .ok_or_else(|| Error::MalformedEncoding("invalid imprint algorithm".to_string()))?,
        message_imprint: reader.bytes_at(message_imprint_off)?,
        rekor_log_id,
        rekor_log_index,
        rekor_entry_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rekor_result() -> VerificationResult {
        VerificationResult {
            timestamp: 1763454699,
            timestamp_proof_type: TimestampProofType::Rekor,
            certificate_hashes: vec![[1u8; 32], [2u8; 32], [3u8; 32]],
            subject_digest: vec![0xAB; 32],
            subject_digest_algorithm: DigestAlgorithm::Sha256,
            oidc: OidcIdentity {
                issuer: "https://token.actions.githubusercontent.com".to_string(),
                subject: "repo:octo/repo:ref:refs/heads/main".to_string(),
                workflow_ref: ".github/workflows/release.yml@refs/heads/main".to_string(),
                repository: "https://github.com/octo/repo".to_string(),
                event_name: "push".to_string(),
            },
            tsa_chain_hashes: Vec::new(),
            message_imprint_algorithm: DigestAlgorithm::Unknown,
            message_imprint: Vec::new(),
            rekor_log_id: [7u8; 32],
            rekor_log_index: 585383802,
            rekor_entry_index: 707288064,
        }
    }

    fn rfc3161_result() -> VerificationResult {
        VerificationResult {
            timestamp: 1763454000,
            timestamp_proof_type: TimestampProofType::Rfc3161,
            certificate_hashes: vec![[4u8; 32], [5u8; 32]],
            subject_digest: vec![0xCD; 48],
            subject_digest_algorithm: DigestAlgorithm::Sha384,
            oidc: OidcIdentity::default(),
            tsa_chain_hashes: vec![[8u8; 32], [9u8; 32]],
            message_imprint_algorithm: DigestAlgorithm::Sha256,
            message_imprint: vec![0xEF; 32],
            rekor_log_id: [0u8; 32],
            rekor_log_index: 0,
            rekor_entry_index: 0,
        }
    }

    #[test]
    fn test_prelude_layout() {
        let journal = rekor_result().to_journal();
        assert_eq!(&journal[..8], &1763454699u64.to_be_bytes());
        assert_eq!(journal[8], 2);
        assert!(journal[9..41].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_roundtrip_rekor() {
        let result = rekor_result();
        let decoded = VerificationResult::from_journal(&result.to_journal()).unwrap();
        assert_eq!(result, decoded);
    }

    #[test]
    fn test_roundtrip_rfc3161() {
        let result = rfc3161_result();
        let decoded = VerificationResult::from_journal(&result.to_journal()).unwrap();
        assert_eq!(result, decoded);
    }

    #[test]
    fn test_determinism() {
        assert_eq!(rekor_result().to_journal(), rekor_result().to_journal());
    }

    #[test]
    fn test_word_alignment() {
        // everything after the prelude is word-sized
        let journal = rekor_result().to_journal();
        assert_eq!((journal.len() - PRELUDE_LEN) % WORD, 0);
    }

    #[test]
    fn test_truncated_rejected() {
        let journal = rekor_result().to_journal();
        assert!(VerificationResult::from_journal(&journal[..journal.len() - 1]).is_err());
        assert!(VerificationResult::from_journal(&journal[..40]).is_err());
    }

    #[test]
    fn test_bad_proof_type_rejected() {
        let mut journal = rekor_result().to_journal();
        journal[8] = 9;
        assert!(VerificationResult::from_journal(&journal).is_err());
    }

    #[test]
    fn test_empty_dynamic_fields_encode_as_zero_length() {
        let result = rfc3161_result();
        let decoded = VerificationResult::from_journal(&result.to_journal()).unwrap();
        assert!(decoded.oidc.issuer.is_empty());
        assert_eq!(decoded.rekor_log_index, 0);
        assert_eq!(decoded.rekor_log_id, [0u8; 32]);
    }
}
