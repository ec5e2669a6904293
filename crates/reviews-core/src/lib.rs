//! Account discovery and decoding for the project-listing program.
//!
//! - [`discriminator`]: the 8-byte type tag Anchor puts in front of every account
//! - [`idl`]: the program's interface description (account and type layouts)
//! - [`layout`]: Borsh payload decoding and encoding against an [`Idl`]
//! - [`records`]: typed [`Project`] / [`Review`] records
//! - [`assembler`]: scans both kinds and groups reviews under projects
//! - [`error`]: failure taxonomy shared by all of the above
//!
//! # Example
//!
//! ```ignore
//! use reviews_core::{assemble, Idl};
//! use reviews_transport::RpcClient;
//!
//! let idl = Idl::from_file("idl/project_listing.json")?;
//! let assembly = assemble(&RpcClient::devnet(), &program_id, &idl).await?;
//! for project in &assembly.projects {
//!     println!("{}: {} reviews", project.name, assembly.reviews_for(&project.address).len());
//! }
//! ```

pub mod assembler;
pub mod discriminator;
pub mod error;
pub mod idl;
pub mod layout;
pub mod records;

pub use assembler::{assemble, Assembly, CategoryFailure, ReviewIndex, SkippedRecord};
pub use discriminator::{Discriminator, DISCRIMINATOR_LEN};
pub use error::{AssemblyError, CategoryError, DecodeError, FailureKind};
pub use idl::{AccountDef, Idl, IdlError, IdlType};
pub use layout::{decode_account, encode_account, DecodedAccount, FieldValue};
pub use records::{decode_record, Project, Record, RecordKind, Review};
