pub mod appversion;
pub mod delete;
pub mod extract;
pub mod files;
pub mod hash;
pub mod inspect;
pub mod publish;
pub mod urls;
