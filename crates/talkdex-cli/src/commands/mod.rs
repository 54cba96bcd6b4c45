pub mod ingest;
pub mod optimize;
pub mod verify;
