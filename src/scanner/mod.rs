//! File scanning, pairing and fingerprinting

pub mod file_scanner;
pub mod fingerprint;

pub use file_scanner::{collect_pdf_files, pair_documents, DocumentPair, DocumentPairing};
pub use fingerprint::compute_file_hash;
