pub mod genotypes;
pub mod init;
pub mod run;
