use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::generate::MarshalOutput;
use crate::typevar::TypeVar;

pub const REPORT_SCHEMA_VERSION: &str = "busgen.report/v1";

/// Machine-readable result of one generation, for tooling that assembles
/// the surrounding function elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct MarshalReport<'a> {
    pub schema_version: &'static str,
    pub signature: &'a str,
    pub code: &'a str,
    pub inputs: &'a [TypeVar],
    pub locals: &'a [TypeVar],
    pub code_sha256: String,
}

impl<'a> MarshalReport<'a> {
    pub fn new(signature: &'a str, out: &'a MarshalOutput) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            signature,
            code: &out.code,
            inputs: &out.inputs,
            locals: &out.locals,
            code_sha256: sha256_hex(&out.code),
        }
    }
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    let out = h.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::MarshalReport;
    use crate::generate::{generate_marshal, MarshalRequest};

    #[test]
    fn report_serializes_with_schema_and_fingerprint() {
        let out = generate_marshal(&MarshalRequest::new("ai")).expect("generate");
        let report = MarshalReport::new("ai", &out);
        let json = serde_json::to_value(&report).expect("serialize");

        assert_eq!(json["schema_version"], "busgen.report/v1");
        assert_eq!(json["signature"], "ai");
        assert_eq!(json["inputs"][0]["name"], "value");
        assert_eq!(json["inputs"][1]["name"], "value_len");
        assert_eq!(json["inputs"][1]["suffix"], "_len");
        let digest = json["code_sha256"].as_str().expect("digest");
        assert_eq!(digest.len(), 64);
        assert!(digest.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
