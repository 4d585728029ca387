pub mod buckets;
pub mod decompose;
pub mod init_config;
pub mod run;
