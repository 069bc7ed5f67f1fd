use sha2::{Digest, Sha256, Sha512};

use scriptdist_core::{application::ports::Digester, domain::ChecksumAlgorithm};

/// SHA-2 digests via the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShaDigester {
    algorithm: ChecksumAlgorithm,
}

impl ShaDigester {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl Digester for ShaDigester {
    fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    fn digest(&self, contents: &[u8]) -> String {
        match self.algorithm {
            ChecksumAlgorithm::Sha256 => format!("{:x}", Sha256::digest(contents)),
            ChecksumAlgorithm::Sha512 => format!("{:x}", Sha512::digest(contents)),
        }
    }
}
