pub mod import;
pub mod roundtrip;
